//! # Engine Module
//!
//! The per-system pipeline that turns a named recipe into a canonical periodic structure.
//!
//! ## Overview
//!
//! A job moves through charge balancing ([`composition`]), box sizing ([`sizing`]),
//! packer input generation and invocation ([`packing`]), and output normalization
//! ([`normalize`]). [`job`] strings these together for one system and owns the
//! per-job working directory; [`claim`] guarantees that at most one caller works on a
//! given output path at a time.
//!
//! ## Architecture
//!
//! - **Species resolution** ([`library`]) - Structure-file root and cached species lookups
//! - **Configuration** ([`config`]) - Packing settings and run configuration builders
//! - **Progress Monitoring** ([`progress`]) - Progress events for front ends
//! - **Error Handling** ([`error`]) - The failure taxonomy shared by every stage
//!
//! The external packer is only reached through [`packing::PackingTool`], so the whole
//! pipeline runs in tests without the real binary.

pub mod claim;
pub mod composition;
pub mod config;
pub mod error;
pub mod job;
pub mod library;
pub mod normalize;
pub mod packing;
pub mod progress;
pub mod sizing;
