use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// A row of a cation or anion table.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct IonRecord {
    pub name: String,
    pub charge: i32,
}

/// A row of a solvent table; density in g/cm³.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SolventRecord {
    pub name: String,
    pub density: f64,
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Duplicate species '{name}' in table '{path}'")]
    DuplicateName { path: String, name: String },
    #[error("Table '{path}' has no rows")]
    Empty { path: String },
}

trait Named {
    fn name(&self) -> &str;
}

impl Named for IonRecord {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for SolventRecord {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Loads a `name,charge` table of ions.
pub fn load_ions(path: &Path) -> Result<Vec<IonRecord>, TableError> {
    load(path)
}

/// Loads a `name,density` table of solvents.
pub fn load_solvents(path: &Path) -> Result<Vec<SolventRecord>, TableError> {
    load(path)
}

fn load<T>(path: &Path) -> Result<Vec<T>, TableError>
where
    T: for<'de> Deserialize<'de> + Named,
{
    let display = path.to_string_lossy().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_path(path)
        .map_err(|e| TableError::Csv {
            path: display.clone(),
            source: e,
        })?;

    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    for result in reader.deserialize::<T>() {
        let record = result.map_err(|e| TableError::Csv {
            path: display.clone(),
            source: e,
        })?;
        if !seen.insert(record.name().to_string()) {
            return Err(TableError::DuplicateName {
                path: display,
                name: record.name().to_string(),
            });
        }
        rows.push(record);
    }

    if rows.is_empty() {
        return Err(TableError::Empty { path: display });
    }
    Ok(rows)
}
