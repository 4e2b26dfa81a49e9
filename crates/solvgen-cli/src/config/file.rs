use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileTablesConfig {
    pub cations: Option<PathBuf>,
    pub anions: Option<PathBuf>,
    pub solvents: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FilePackingConfig {
    pub executable: Option<PathBuf>,
    pub tolerance: Option<f64>,
    pub timeout_secs: Option<u64>,
    pub keep_work_files: Option<bool>,
    pub cell_padding: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub atom_budget: Option<usize>,
    pub structure_root: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub tables: Option<FileTablesConfig>,
    pub packing: Option<FilePackingConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reads_all_sections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("solvgen.toml");
        fs::write(
            &path,
            r#"
            atom-budget = 300
            structure-root = "geometries"

            [tables]
            cations = "data/cations.csv"

            [packing]
            tolerance = 2.5
            timeout-secs = 60
            keep-work-files = true
            "#,
        )
        .unwrap();

        let config = FileConfig::from_file(&path).unwrap();
        assert_eq!(config.atom_budget, Some(300));
        assert_eq!(config.structure_root, Some(PathBuf::from("geometries")));
        assert_eq!(config.output_dir, None);
        let tables = config.tables.unwrap();
        assert_eq!(tables.cations, Some(PathBuf::from("data/cations.csv")));
        let packing = config.packing.unwrap();
        assert_eq!(packing.tolerance, Some(2.5));
        assert_eq!(packing.timeout_secs, Some(60));
        assert_eq!(packing.keep_work_files, Some(true));
    }

    #[test]
    fn rejects_unknown_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("solvgen.toml");
        fs::write(&path, "atom-limit = 100\n").unwrap();

        let result = FileConfig::from_file(&path);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let result = FileConfig::from_file(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
