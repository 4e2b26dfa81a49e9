use super::packer;
use crate::cli::SweepArgs;
use crate::config::build_sweep_config;
use crate::error::{CliError, Result};
use crate::ui::{CliProgressHandler, UiEvent};
use solvgen::engine::progress::ProgressReporter;
use solvgen::workflows;
use solvgen::workflows::sweep::CombinationOutcome;
use tokio::sync::mpsc;
use tracing::info;

pub async fn run(args: SweepArgs, ui_sender: mpsc::Sender<UiEvent>) -> Result<()> {
    let config = build_sweep_config(&args)?;
    let tool = packer(&config.output.packing);
    info!(
        "Sweeping {} × {} × {} into {}",
        config.tables.cations.display(),
        config.tables.anions.display(),
        config.tables.solvents.display(),
        config.output.output_dir.display()
    );

    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let summary =
        tokio::task::block_in_place(|| workflows::sweep::run(&config, &tool, &reporter))?;

    for (report, error) in summary.failures() {
        eprintln!("  ✗ {}: {}", report, error);
    }
    for report in &summary.reports {
        if let CombinationOutcome::Claimed { holder, .. } = &report.outcome {
            eprintln!("  ⧗ {}: claimed by {}", report, holder);
        }
    }
    println!("Sweep finished: {}.", summary);

    if summary.is_clean() {
        Ok(())
    } else {
        Err(CliError::SweepIncomplete {
            failed: summary.failed(),
            claimed: summary.claimed(),
            total: summary.reports.len(),
        })
    }
}
