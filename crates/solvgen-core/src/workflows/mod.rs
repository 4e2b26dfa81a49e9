//! # Workflows Module
//!
//! Top-level entry points. Each workflow loads what it needs, drives the engine and
//! reports progress; callers only supply a configuration, a packing tool and a
//! [`ProgressReporter`](crate::engine::progress::ProgressReporter).
//!
//! - [`generate`] - One solvated system from an explicit solute list
//! - [`sweep`] - Every cation × anion × solvent combination of three tables
//! - [`template`] - Placeholder substitution for downstream driver inputs

pub mod generate;
pub mod sweep;
pub mod template;
