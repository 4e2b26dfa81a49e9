use solvgen::engine::config::{DEFAULT_ATOM_BUDGET, DEFAULT_EXECUTABLE};
use solvgen::engine::packing::DEFAULT_TOLERANCE;
use std::path::PathBuf;

pub struct DefaultsConfig {
    pub atom_budget: usize,
    pub structure_root: PathBuf,
    pub output_dir: PathBuf,
    pub cation_table: PathBuf,
    pub anion_table: PathBuf,
    pub solvent_table: PathBuf,
    pub executable: PathBuf,
    pub tolerance: f64,
    pub keep_work_files: bool,
    pub cell_padding: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            atom_budget: DEFAULT_ATOM_BUDGET,
            structure_root: PathBuf::from("structures"),
            output_dir: PathBuf::from("solvated"),
            cation_table: PathBuf::from("cations.csv"),
            anion_table: PathBuf::from("anions.csv"),
            solvent_table: PathBuf::from("solvents.csv"),
            executable: PathBuf::from(DEFAULT_EXECUTABLE),
            tolerance: DEFAULT_TOLERANCE,
            keep_work_files: false,
            cell_padding: 0.0,
        }
    }
}
