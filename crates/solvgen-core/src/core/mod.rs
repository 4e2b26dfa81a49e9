//! # Core Module
//!
//! The stateless foundation of solvgen: the records that describe species and boxes,
//! the in-memory atomic structure, the element table, and the file codecs.
//!
//! ## Architecture
//!
//! - **Domain Records** ([`models`]) - Species, solute/solvent specifications, box geometry and structures
//! - **Chemistry** ([`chemistry`]) - Element symbols and standard atomic masses
//! - **File I/O** ([`io`]) - Plain XYZ (Packmol's format), extended XYZ (the canonical output) and CSV species tables
//!
//! Nothing in this module performs external process calls or writes outside the
//! paths it is handed.

pub mod chemistry;
pub mod io;
pub mod models;
