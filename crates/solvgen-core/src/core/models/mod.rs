//! # Core Models Module
//!
//! Data structures describing what goes into a solvated system and what comes out.
//!
//! ## Key Components
//!
//! - [`species`] - Resolved species plus the solute, solvent and request records built from them
//! - [`recipe`] - Name-level system descriptions and canonical output naming
//! - [`geometry`] - The cubic periodic box
//! - [`structure`] - Atoms, cell, periodic flag and transient annotations of one frame

pub mod geometry;
pub mod recipe;
pub mod species;
pub mod structure;
