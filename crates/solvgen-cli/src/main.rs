mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod ui;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use crate::ui::UiManager;
use clap::Parser;
use solvgen::engine::claim;
use tokio::task;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

/// Exit status of a run stopped by Ctrl-C, as shells report SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// On Ctrl-C, removes the output claims of in-flight jobs before exiting, since their
/// destructors never run.
fn release_claims_on_interrupt() {
    task::spawn(async {
        if tokio::signal::ctrl_c().await.is_err() {
            warn!("Could not listen for Ctrl-C; interrupted jobs may leave lock files.");
            return;
        }
        let released = claim::release_all();
        eprintln!("\nInterrupted, released {} output claim(s).", released);
        std::process::exit(INTERRUPTED_EXIT_CODE);
    });
}

async fn run_app() -> Result<()> {
    let (ui_manager, ui_sender, shutdown_sender) = UiManager::new();
    let ui_handle = task::spawn(ui_manager.run());

    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, &cli.log_file, ui_sender.clone())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    release_claims_on_interrupt();

    let command_result = async {
        info!("🚀 solvgen v{} starting up.", env!("CARGO_PKG_VERSION"));
        debug!("Full CLI arguments parsed: {:?}", &cli);

        if let Some(num_threads) = cli.threads {
            info!(
                "Setting Rayon global thread pool to {} threads.",
                num_threads
            );
            rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .map_err(|e| {
                    CliError::Other(anyhow::anyhow!("Failed to build global thread pool: {}", e))
                })?;
        }

        match cli.command {
            Commands::Generate(args) => {
                info!("Dispatching to 'generate' command.");
                commands::generate::run(args, ui_sender).await
            }
            Commands::Sweep(args) => {
                info!("Dispatching to 'sweep' command.");
                commands::sweep::run(args, ui_sender).await
            }
            Commands::Template(args) => {
                info!("Dispatching to 'template' command.");
                commands::template::run(args).await
            }
        }
    }
    .await;

    match &command_result {
        Ok(_) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }

    if shutdown_sender.send(true).is_err() {
        warn!("UI manager may have already exited before shutdown signal.");
    }

    ui_handle
        .await
        .map_err(|e| CliError::Other(anyhow::anyhow!("UI manager task failed: {}", e)))?;

    command_result
}
