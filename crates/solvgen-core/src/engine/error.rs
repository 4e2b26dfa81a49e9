use crate::core::io::table::TableError;
use crate::core::io::xyz::XyzError;
use crate::engine::packing::PackingConfigError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Charges {cation:+} and {anion:+} cannot be balanced by positive integer counts")]
    InvalidChargeCombination { cation: i32, anion: i32 },

    #[error("Solutes need {solute_atoms} atoms but the atom budget is {budget}")]
    InsufficientBudget { budget: usize, solute_atoms: usize },

    #[error("Derived box edge {edge} Å is not a finite positive length")]
    InvalidGeometry { edge: f64 },

    #[error("Packing tool failed: {reason} (working files kept in {work_dir:?})")]
    ExternalToolFailure { reason: String, work_dir: PathBuf },

    #[error("Packed output {path:?} is not a single structure: {source}")]
    MalformedPackedOutput {
        path: PathBuf,
        #[source]
        source: XyzError,
    },

    #[error("Structure file for species '{species}' not found at {path:?}")]
    MissingStructureFile { species: String, path: PathBuf },

    #[error("Structure file {path:?} is malformed: {source}")]
    MalformedStructure {
        path: PathBuf,
        #[source]
        source: XyzError,
    },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Cannot write packer input: {0}")]
    PackingConfig(#[from] PackingConfigError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Short, stable name of the failure class, used in sweep summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidChargeCombination { .. } => "InvalidChargeCombination",
            Self::InsufficientBudget { .. } => "InsufficientBudget",
            Self::InvalidGeometry { .. } => "InvalidGeometry",
            Self::ExternalToolFailure { .. } => "ExternalToolFailure",
            Self::MalformedPackedOutput { .. } => "MalformedPackedOutput",
            Self::MissingStructureFile { .. } => "MissingStructureFile",
            Self::MalformedStructure { .. } | Self::Io { .. } => "IOError",
            Self::Table(_) => "Table",
            Self::PackingConfig(_) => "InvalidPackingConfig",
            Self::Config(_) => "Config",
        }
    }
}
