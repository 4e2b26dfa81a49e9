mod builder;
mod defaults;
mod file;

pub use builder::{build_generate_config, build_sweep_config};
