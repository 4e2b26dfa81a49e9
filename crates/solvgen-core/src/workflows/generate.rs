use crate::core::models::recipe::SystemRecipe;
use crate::engine::config::GenerateConfig;
use crate::engine::error::EngineError;
use crate::engine::job::{JobOutcome, JobRunner};
use crate::engine::library::StructureLibrary;
use crate::engine::packing::PackingTool;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument};

/// Builds a single solvated system from an explicit solute list.
///
/// No charge balancing is applied; solutes are packed in the counts given. Running
/// again with the same inputs returns [`JobOutcome::AlreadyExists`] without invoking
/// the packer.
#[instrument(skip_all, name = "generate_workflow")]
pub fn run(
    config: &GenerateConfig,
    tool: &dyn PackingTool,
    reporter: &ProgressReporter,
) -> Result<JobOutcome, EngineError> {
    let recipe = SystemRecipe::new(
        config.solutes.clone(),
        config.solvent.clone(),
        config.output.atom_budget,
    );
    info!("Generating {}.", recipe);

    reporter.report(Progress::PhaseStart { name: "Packing" });
    let library = StructureLibrary::new(&config.output.structure_root)?;
    let runner = JobRunner::new(
        &library,
        tool,
        &config.output.packing,
        &config.output.output_dir,
    )?;
    let outcome = runner.run(&recipe);
    reporter.report(Progress::PhaseFinish);

    let outcome = outcome?;
    let message = match &outcome {
        JobOutcome::Created { path, atoms, edge } => {
            format!("Wrote {} ({} atoms, L = {:.4} Å)", path.display(), atoms, edge)
        }
        JobOutcome::AlreadyExists(path) => format!("{} already exists", path.display()),
        JobOutcome::Claimed { path, holder } => {
            format!("{} is being generated by {}", path.display(), holder)
        }
    };
    reporter.report(Progress::Message(message));
    Ok(outcome)
}
