use crate::core::models::geometry::BoxGeometry;
use crate::core::models::species::{SoluteSpec, SolventSpec};
use crate::engine::error::EngineError;
use tracing::debug;

/// Avogadro's number at the precision the reference boxes were generated with.
pub const AVOGADRO: f64 = 6.022e23;

const CM_TO_ANGSTROM: f64 = 1e8;

/// Result of sizing a box for one system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizedBox {
    /// Number of solvent molecules that fit in the remaining atom budget.
    pub solvent_count: usize,
    /// Atoms contributed by all solutes.
    pub solute_atoms: usize,
    /// Mass used to size the cube, in grams.
    pub total_mass: f64,
    pub geometry: BoxGeometry,
}

/// Derives the solvent count and a cubic box edge for the given solutes and solvent.
///
/// The solvent count is `floor((atom_budget - solute_atoms) / solvent_atoms)`. The
/// cube holds the mass of `solvent_count + Σ solute counts` solvent molecules at the
/// target density: each solute ion is counted as one solvent molecule's worth of mass.
/// That ion term is an approximation kept for compatibility with previously generated
/// systems, not a partial-volume model.
///
/// # Errors
///
/// - [`EngineError::InsufficientBudget`] if the solutes alone exceed the atom budget.
/// - [`EngineError::InvalidGeometry`] if the edge is not finite and positive, which is
///   what a zero or negative density produces.
pub fn size(
    solutes: &[SoluteSpec],
    solvent: &SolventSpec,
    atom_budget: usize,
) -> Result<SizedBox, EngineError> {
    let solute_atoms: usize = solutes.iter().map(SoluteSpec::atom_count).sum();
    let ion_count: u64 = solutes.iter().map(|s| u64::from(s.count)).sum();

    let solvent_atoms = solvent.species.atom_count;
    if solvent_atoms == 0 {
        return Err(EngineError::Config(format!(
            "solvent '{}' has no atoms",
            solvent.species.name
        )));
    }

    let remaining = atom_budget
        .checked_sub(solute_atoms)
        .ok_or(EngineError::InsufficientBudget {
            budget: atom_budget,
            solute_atoms,
        })?;
    let solvent_count = remaining / solvent_atoms;

    let molecules = (solvent_count as u64 + ion_count) as f64;
    let total_mass = solvent.species.molar_mass * molecules / AVOGADRO;
    let volume = total_mass / solvent.density;
    let edge = volume.cbrt() * CM_TO_ANGSTROM;

    let geometry = BoxGeometry::new(edge).ok_or(EngineError::InvalidGeometry { edge })?;
    debug!(
        solvent_count,
        solute_atoms,
        total_mass,
        edge,
        "Sized box for {}.",
        solvent.species.name
    );

    Ok(SizedBox {
        solvent_count,
        solute_atoms,
        total_mass,
        geometry,
    })
}
