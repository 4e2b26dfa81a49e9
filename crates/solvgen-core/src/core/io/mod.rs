//! Provides input/output functionality for structure files and species tables.
//!
//! Packmol reads and writes plain XYZ; the canonical output of a packing job is
//! extended XYZ, which additionally records the periodic cell and boundary flags.
//! Both share the [`traits::StructureFile`] interface. Species tables are CSV.

pub mod extxyz;
pub mod table;
pub mod traits;
pub(crate) mod util;
pub mod xyz;
