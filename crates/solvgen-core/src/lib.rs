//! # solvgen Core Library
//!
//! Builds solvated ionic systems ready for molecular simulation: a charge-balanced salt,
//! a cubic periodic box sized to a target solvent density under a fixed atom budget, and a
//! Packmol run that places everything inside it.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Species`, `BoxGeometry`,
//!   `Structure`), the element table with standard atomic masses, and file codecs for
//!   plain XYZ, extended XYZ and species tables.
//!
//! - **[`engine`]: The Pipeline.** Each stage of a single packing job: charge balancing,
//!   box sizing, Packmol configuration, the external tool adapter and result
//!   normalization, plus exclusive output claims and the shared error taxonomy.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures built on the engine:
//!   generating one system, sweeping cation × anion × solvent tables, and filling
//!   downstream driver templates.

pub mod core;
pub mod engine;
pub mod workflows;
