use crate::core::models::recipe::canonical_stem;
use std::fmt;
use std::path::PathBuf;

/// A molecular species resolved against the structure-file root.
///
/// The atom count and molar mass come from the species' geometry file; the formal
/// charge comes from the input tables and is only meaningful for ions.
#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    /// Identifier, also the stem of the geometry file (`<root>/<name>.xyz`).
    pub name: String,
    /// Absolute or root-relative path to the species' geometry file.
    pub structure_path: PathBuf,
    /// Number of atoms in one molecule of this species.
    pub atom_count: usize,
    /// Sum of the standard atomic masses of one molecule, in g/mol.
    pub molar_mass: f64,
    /// Formal charge in elementary charge units; `None` for solvents.
    pub charge: Option<i32>,
}

impl Species {
    /// Returns a copy of this species carrying the given formal charge.
    pub fn with_charge(mut self, charge: i32) -> Self {
        self.charge = Some(charge);
        self
    }
}

/// A solute species and its stoichiometric count in the packed system.
#[derive(Debug, Clone, PartialEq)]
pub struct SoluteSpec {
    pub species: Species,
    pub count: u32,
}

impl SoluteSpec {
    pub fn new(species: Species, count: u32) -> Self {
        Self { species, count }
    }

    /// Atoms contributed by all copies of this solute.
    pub fn atom_count(&self) -> usize {
        self.species.atom_count * self.count as usize
    }
}

/// The solvent species and its target mass density in g/cm³.
#[derive(Debug, Clone, PartialEq)]
pub struct SolventSpec {
    pub species: Species,
    pub density: f64,
}

impl SolventSpec {
    pub fn new(species: Species, density: f64) -> Self {
        Self { species, density }
    }
}

/// Everything needed to build one solvated system.
///
/// Built fresh for each combination and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemRequest {
    pub solutes: Vec<SoluteSpec>,
    pub solvent: SolventSpec,
    pub atom_budget: usize,
}

impl SystemRequest {
    pub fn new(solutes: Vec<SoluteSpec>, solvent: SolventSpec, atom_budget: usize) -> Self {
        Self {
            solutes,
            solvent,
            atom_budget,
        }
    }

    /// The deterministic file stem of this system's canonical output.
    ///
    /// Each solute contributes `<count><name>_` in input order, followed by the solvent
    /// name, e.g. `2Li_1sulfate_water`.
    pub fn canonical_stem(&self) -> String {
        canonical_stem(
            self.solutes
                .iter()
                .map(|s| (s.species.name.as_str(), s.count)),
            &self.solvent.species.name,
        )
    }

    /// Net charge of all solutes, or `None` if any solute has no formal charge.
    pub fn net_charge(&self) -> Option<i64> {
        self.solutes
            .iter()
            .map(|s| s.species.charge.map(|c| i64::from(c) * i64::from(s.count)))
            .sum()
    }

    /// The canonical output file name (`<stem>.xyz`).
    pub fn canonical_file_name(&self) -> String {
        format!("{}.xyz", self.canonical_stem())
    }
}

impl fmt::Display for SystemRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let solutes: Vec<String> = self
            .solutes
            .iter()
            .map(|s| format!("{}×{}", s.count, s.species.name))
            .collect();
        write!(
            f,
            "[{}] in {} ({} g/cm³, budget {})",
            solutes.join(", "),
            self.solvent.species.name,
            self.solvent.density,
            self.atom_budget
        )
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn species(name: &str, atom_count: usize, molar_mass: f64) -> Species {
        Species {
            name: name.to_string(),
            structure_path: PathBuf::from(format!("{}.xyz", name)),
            atom_count,
            molar_mass,
            charge: None,
        }
    }

    pub fn water() -> Species {
        species("water", 3, 18.015)
    }

    pub fn lithium() -> Species {
        species("Li", 1, 6.94).with_charge(1)
    }

    pub fn perchlorate() -> Species {
        species("perchlorate", 5, 99.445).with_charge(-1)
    }
}
