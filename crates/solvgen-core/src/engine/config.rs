use crate::core::models::recipe::{SoluteEntry, SolventEntry};
use crate::engine::normalize::NormalizeOptions;
use crate::engine::packing::DEFAULT_TOLERANCE;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_EXECUTABLE: &str = "packmol";
pub const DEFAULT_ATOM_BUDGET: usize = 200;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// How each packing job is run.
#[derive(Debug, Clone, PartialEq)]
pub struct PackingSettings {
    pub executable: PathBuf,
    /// Minimum inter-atomic distance in Å.
    pub tolerance: f64,
    /// `None` lets the packer run for as long as it needs.
    pub timeout: Option<Duration>,
    /// Keep `<output-dir>/.work/<stem>/` after a successful job.
    pub keep_work_files: bool,
    pub normalize: NormalizeOptions,
}

impl Default for PackingSettings {
    fn default() -> Self {
        Self {
            executable: PathBuf::from(DEFAULT_EXECUTABLE),
            tolerance: DEFAULT_TOLERANCE,
            timeout: None,
            keep_work_files: false,
            normalize: NormalizeOptions::default(),
        }
    }
}

impl PackingSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "tolerance",
                reason: format!("{} is not a positive length", self.tolerance),
            });
        }
        if !(self.normalize.cell_padding.is_finite() && self.normalize.cell_padding >= 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "cell_padding",
                reason: format!("{} is not a non-negative length", self.normalize.cell_padding),
            });
        }
        Ok(())
    }
}

/// Locations and limits shared by every job of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub structure_root: PathBuf,
    pub output_dir: PathBuf,
    pub atom_budget: usize,
    pub packing: PackingSettings,
}

/// The three species tables of a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct TablePaths {
    pub cations: PathBuf,
    pub anions: PathBuf,
    pub solvents: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    pub output: OutputConfig,
    pub tables: TablePaths,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateConfig {
    pub output: OutputConfig,
    pub solutes: Vec<SoluteEntry>,
    pub solvent: SolventEntry,
}

#[derive(Default)]
pub struct OutputConfigBuilder {
    structure_root: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    atom_budget: Option<usize>,
    packing: Option<PackingSettings>,
}

impl OutputConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn structure_root(mut self, path: PathBuf) -> Self {
        self.structure_root = Some(path);
        self
    }
    pub fn output_dir(mut self, path: PathBuf) -> Self {
        self.output_dir = Some(path);
        self
    }
    pub fn atom_budget(mut self, budget: usize) -> Self {
        self.atom_budget = Some(budget);
        self
    }
    pub fn packing(mut self, settings: PackingSettings) -> Self {
        self.packing = Some(settings);
        self
    }

    pub fn build(self) -> Result<OutputConfig, ConfigError> {
        let atom_budget = self
            .atom_budget
            .ok_or(ConfigError::MissingParameter("atom_budget"))?;
        if atom_budget == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "atom_budget",
                reason: "must be greater than zero".into(),
            });
        }
        let packing = self.packing.unwrap_or_default();
        packing.validate()?;

        Ok(OutputConfig {
            structure_root: self
                .structure_root
                .ok_or(ConfigError::MissingParameter("structure_root"))?,
            output_dir: self
                .output_dir
                .ok_or(ConfigError::MissingParameter("output_dir"))?,
            atom_budget,
            packing,
        })
    }
}

#[derive(Default)]
pub struct SweepConfigBuilder {
    output: Option<OutputConfig>,
    cations: Option<PathBuf>,
    anions: Option<PathBuf>,
    solvents: Option<PathBuf>,
}

impl SweepConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(mut self, output: OutputConfig) -> Self {
        self.output = Some(output);
        self
    }
    pub fn cation_table(mut self, path: PathBuf) -> Self {
        self.cations = Some(path);
        self
    }
    pub fn anion_table(mut self, path: PathBuf) -> Self {
        self.anions = Some(path);
        self
    }
    pub fn solvent_table(mut self, path: PathBuf) -> Self {
        self.solvents = Some(path);
        self
    }

    pub fn build(self) -> Result<SweepConfig, ConfigError> {
        Ok(SweepConfig {
            output: self.output.ok_or(ConfigError::MissingParameter("output"))?,
            tables: TablePaths {
                cations: self
                    .cations
                    .ok_or(ConfigError::MissingParameter("cation_table"))?,
                anions: self
                    .anions
                    .ok_or(ConfigError::MissingParameter("anion_table"))?,
                solvents: self
                    .solvents
                    .ok_or(ConfigError::MissingParameter("solvent_table"))?,
            },
        })
    }
}

#[derive(Default)]
pub struct GenerateConfigBuilder {
    output: Option<OutputConfig>,
    solutes: Vec<SoluteEntry>,
    solvent: Option<SolventEntry>,
}

impl GenerateConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(mut self, output: OutputConfig) -> Self {
        self.output = Some(output);
        self
    }
    pub fn solute(mut self, solute: SoluteEntry) -> Self {
        self.solutes.push(solute);
        self
    }
    pub fn solutes(mut self, solutes: impl IntoIterator<Item = SoluteEntry>) -> Self {
        self.solutes.extend(solutes);
        self
    }
    pub fn solvent(mut self, solvent: SolventEntry) -> Self {
        self.solvent = Some(solvent);
        self
    }

    pub fn build(self) -> Result<GenerateConfig, ConfigError> {
        if self.solutes.is_empty() {
            return Err(ConfigError::MissingParameter("solutes"));
        }
        if let Some(zero) = self.solutes.iter().find(|s| s.count == 0) {
            return Err(ConfigError::InvalidParameter {
                name: "solutes",
                reason: format!("count of '{}' must be at least 1", zero.name),
            });
        }
        Ok(GenerateConfig {
            output: self.output.ok_or(ConfigError::MissingParameter("output"))?,
            solutes: self.solutes,
            solvent: self
                .solvent
                .ok_or(ConfigError::MissingParameter("solvent"))?,
        })
    }
}
