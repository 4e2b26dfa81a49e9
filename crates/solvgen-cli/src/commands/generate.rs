use super::packer;
use crate::cli::GenerateArgs;
use crate::config::build_generate_config;
use crate::error::{CliError, Result};
use crate::ui::{CliProgressHandler, UiEvent};
use solvgen::engine::job::JobOutcome;
use solvgen::engine::progress::ProgressReporter;
use solvgen::workflows;
use tokio::sync::mpsc;
use tracing::info;

pub async fn run(args: GenerateArgs, ui_sender: mpsc::Sender<UiEvent>) -> Result<()> {
    let config = build_generate_config(&args)?;
    let tool = packer(&config.output.packing);

    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Invoking the generate workflow...");
    let outcome =
        tokio::task::block_in_place(|| workflows::generate::run(&config, &tool, &reporter))?;

    match outcome {
        JobOutcome::Created { path, atoms, edge } => println!(
            "✓ Packed {} atoms into a {:.3} Å box: {}",
            atoms,
            edge,
            path.display()
        ),
        JobOutcome::AlreadyExists(path) => {
            println!("Output already exists, nothing to do: {}", path.display())
        }
        JobOutcome::Claimed { path, holder } => {
            return Err(CliError::OutputClaimed { path, holder });
        }
    }
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::commands::testing::{fake_packmol, structure_root};
    use clap::Parser;
    use solvgen::engine::error::EngineError;
    use tempfile::tempdir;

    fn args(dir: &std::path::Path, packmol: &std::path::Path, solute: &str) -> GenerateArgs {
        let root = structure_root(dir);
        let output = dir.join("solvated");
        let argv = vec![
            "solvgen".to_string(),
            "generate".to_string(),
            "--solute".to_string(),
            solute.to_string(),
            "--solvent".to_string(),
            "water:1.0".to_string(),
            "-n".to_string(),
            "10".to_string(),
            "-r".to_string(),
            root.display().to_string(),
            "-o".to_string(),
            output.display().to_string(),
            "--packmol".to_string(),
            packmol.display().to_string(),
        ];
        match Cli::parse_from(argv).command {
            Commands::Generate(args) => args,
            _ => panic!("expected generate"),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn generate_writes_canonical_output() {
        let dir = tempdir().unwrap();
        let packmol = fake_packmol(dir.path());
        let (sender, _receiver) = mpsc::channel(1024);

        run(args(dir.path(), &packmol, "Li:1"), sender).await.unwrap();

        let output = dir.path().join("solvated").join("1Li_water.xyz");
        let text = std::fs::read_to_string(output).unwrap();
        assert!(text.starts_with("1\nLattice=\""));
        assert!(text.contains("pbc=\"T T T\""));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn foreign_claim_is_an_error() {
        let dir = tempdir().unwrap();
        let packmol = fake_packmol(dir.path());
        let (sender, _receiver) = mpsc::channel(1024);
        let output = dir.path().join("solvated");
        std::fs::create_dir_all(&output).unwrap();
        std::fs::write(output.join(".1Li_water.lock"), "9@solvgen-test-host.invalid\n").unwrap();

        let result = run(args(dir.path(), &packmol, "Li:1"), sender).await;

        match result {
            Err(e @ CliError::OutputClaimed { .. }) => assert_eq!(e.exit_code(), 2),
            other => panic!("expected a claimed output, got {:?}", other),
        }
        assert!(!output.join("1Li_water.xyz").exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn generate_reports_missing_structure() {
        let dir = tempdir().unwrap();
        let packmol = fake_packmol(dir.path());
        let (sender, _receiver) = mpsc::channel(1024);

        let result = run(args(dir.path(), &packmol, "Na:1"), sender).await;
        assert!(matches!(
            result,
            Err(CliError::Engine(EngineError::MissingStructureFile { .. }))
        ));
    }
}
