//! Input generation for, and invocation of, the external packing tool.
//!
//! [`config`] owns the text grammar the packer consumes; [`runner`] owns the process
//! boundary. Only [`runner::PackingTool`] is seen by the rest of the engine, so tests can
//! substitute an in-process packer.

pub mod config;
pub mod runner;

pub use config::{DEFAULT_TOLERANCE, PackingConfig, PackingConfigError, StructureBlock};
pub use runner::{PackingInvocation, PackingTool, PackmolRunner};
