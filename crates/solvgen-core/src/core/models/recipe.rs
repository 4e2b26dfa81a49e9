use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseEntryError {
    #[error("Expected NAME:{expected}, found '{input}'")]
    Format {
        input: String,
        expected: &'static str,
    },
    #[error("Invalid {field} '{value}' in '{input}'")]
    Value {
        input: String,
        field: &'static str,
        value: String,
    },
}

/// A solute named by its structure-file stem and its stoichiometric count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoluteEntry {
    pub name: String,
    pub count: u32,
    /// Formal charge, when the solute came from an ion table.
    pub charge: Option<i32>,
}

impl SoluteEntry {
    pub fn new(name: impl Into<String>, count: u32) -> Self {
        Self {
            name: name.into(),
            count,
            charge: None,
        }
    }

    pub fn with_charge(mut self, charge: i32) -> Self {
        self.charge = Some(charge);
        self
    }
}

/// Parses `NAME:COUNT`, e.g. `Li:2`. The count must be at least 1.
impl FromStr for SoluteEntry {
    type Err = ParseEntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, count) = split_entry(s, "COUNT")?;
        let count = count
            .parse::<u32>()
            .ok()
            .filter(|&c| c >= 1)
            .ok_or_else(|| ParseEntryError::Value {
                input: s.to_string(),
                field: "count",
                value: count.to_string(),
            })?;
        Ok(Self::new(name, count))
    }
}

/// A solvent named by its structure-file stem and its target density in g/cm³.
#[derive(Debug, Clone, PartialEq)]
pub struct SolventEntry {
    pub name: String,
    pub density: f64,
}

impl SolventEntry {
    pub fn new(name: impl Into<String>, density: f64) -> Self {
        Self {
            name: name.into(),
            density,
        }
    }
}

/// Parses `NAME:DENSITY`, e.g. `water:1.0`.
impl FromStr for SolventEntry {
    type Err = ParseEntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, density) = split_entry(s, "DENSITY")?;
        let density = density
            .parse::<f64>()
            .map_err(|_| ParseEntryError::Value {
                input: s.to_string(),
                field: "density",
                value: density.to_string(),
            })?;
        Ok(Self::new(name, density))
    }
}

fn split_entry<'a>(s: &'a str, expected: &'static str) -> Result<(&'a str, &'a str), ParseEntryError> {
    match s.rsplit_once(':') {
        Some((name, value)) if !name.trim().is_empty() && !value.trim().is_empty() => {
            Ok((name.trim(), value.trim()))
        }
        _ => Err(ParseEntryError::Format {
            input: s.to_string(),
            expected,
        }),
    }
}

/// A system described only by species names, counts and the solvent density.
///
/// This is enough to name the canonical output, so an existing output can be
/// recognized before any structure file is read.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemRecipe {
    pub solutes: Vec<SoluteEntry>,
    pub solvent: SolventEntry,
    pub atom_budget: usize,
}

impl SystemRecipe {
    pub fn new(solutes: Vec<SoluteEntry>, solvent: SolventEntry, atom_budget: usize) -> Self {
        Self {
            solutes,
            solvent,
            atom_budget,
        }
    }

    pub fn canonical_stem(&self) -> String {
        canonical_stem(
            self.solutes.iter().map(|s| (s.name.as_str(), s.count)),
            &self.solvent.name,
        )
    }

    pub fn canonical_file_name(&self) -> String {
        format!("{}.xyz", self.canonical_stem())
    }
}

impl fmt::Display for SystemRecipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let solutes: Vec<String> = self
            .solutes
            .iter()
            .map(|s| format!("{}×{}", s.count, s.name))
            .collect();
        write!(f, "[{}] in {}", solutes.join(", "), self.solvent.name)
    }
}

/// `<count><name>_` per solute in order, followed by the solvent name.
pub fn canonical_stem<'a>(solutes: impl IntoIterator<Item = (&'a str, u32)>, solvent: &str) -> String {
    let mut stem = String::new();
    for (name, count) in solutes {
        stem.push_str(&format!("{}{}_", count, name));
    }
    stem.push_str(solvent);
    stem
}
