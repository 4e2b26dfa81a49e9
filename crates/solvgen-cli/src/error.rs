use solvgen::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(
        "{unfinished} of {total} combinations were not produced ({failed} failed, {claimed} claimed elsewhere)",
        unfinished = .failed + .claimed
    )]
    SweepIncomplete {
        failed: usize,
        claimed: usize,
        total: usize,
    },

    #[error("{path} is being produced by {holder}; run again once it finishes", path = path.display())]
    OutputClaimed { path: PathBuf, holder: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Process exit status: 2 when the run finished but left outputs unproduced, 1
    /// otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SweepIncomplete { .. } | Self::OutputClaimed { .. } => 2,
            _ => 1,
        }
    }
}

impl From<solvgen::engine::config::ConfigError> for CliError {
    fn from(e: solvgen::engine::config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
