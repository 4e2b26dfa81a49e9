use super::geometry::BoxGeometry;
use crate::core::chemistry::Element;
use nalgebra::Point3;
use std::collections::BTreeMap;

/// A single atom: its element and Cartesian position in Ångström.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: Element,
    pub position: Point3<f64>,
}

impl Atom {
    pub fn new(element: Element, position: Point3<f64>) -> Self {
        Self { element, position }
    }
}

/// An in-memory atomic structure: one frame of atoms, an optional periodic cell and
/// free-form per-frame annotations.
///
/// Annotations hold whatever a producer wrote next to the coordinates (the comment
/// line of a plain XYZ file, extra key/value pairs of an extended XYZ header). They are
/// transient and are stripped before a structure becomes canonical output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    atoms: Vec<Atom>,
    cell: Option<BoxGeometry>,
    pbc: bool,
    info: BTreeMap<String, String>,
}

impl Structure {
    pub fn from_atoms(atoms: Vec<Atom>) -> Self {
        Self {
            atoms,
            ..Default::default()
        }
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn cell(&self) -> Option<BoxGeometry> {
        self.cell
    }

    pub fn set_cell(&mut self, cell: Option<BoxGeometry>) {
        self.cell = cell;
    }

    pub fn pbc(&self) -> bool {
        self.pbc
    }

    pub fn set_pbc(&mut self, pbc: bool) {
        self.pbc = pbc;
    }

    pub fn info(&self) -> &BTreeMap<String, String> {
        &self.info
    }

    pub fn insert_info(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.info.insert(key.into(), value.into());
    }

    /// Drops every per-frame annotation.
    pub fn clear_info(&mut self) {
        self.info.clear();
    }

    /// Sum of the standard atomic masses of all atoms, in g/mol.
    pub fn molar_mass(&self) -> f64 {
        self.atoms.iter().map(|a| a.element.atomic_mass()).sum()
    }
}
