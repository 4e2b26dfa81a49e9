#![allow(dead_code)]

use solvgen::engine::config::{OutputConfig, OutputConfigBuilder, PackingSettings};
use solvgen::engine::error::EngineError;
use solvgen::engine::packing::{PackingConfig, PackingInvocation, PackingTool};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

pub const LITHIUM: &str = "1\nlithium\nLi 0.0 0.0 0.0\n";
pub const PERCHLORATE: &str = "5\nperchlorate\nCl 0.000 0.000 0.000\nO 0.835 0.835 0.835\nO -0.835 -0.835 0.835\nO -0.835 0.835 -0.835\nO 0.835 -0.835 -0.835\n";
pub const CHLORIDE: &str = "1\nchloride\nCl 0.0 0.0 0.0\n";
pub const MAGNESIUM: &str = "1\nmagnesium\nMg 0.0 0.0 0.0\n";
pub const WATER: &str = "3\nwater\nO 0.000 0.000 0.000\nH 0.757 0.586 0.000\nH -0.757 0.586 0.000\n";

/// Writes `<root>/structures/<name>.xyz` for every species.
pub fn structure_root(dir: &Path, species: &[(&str, &str)]) -> PathBuf {
    let root = dir.join("structures");
    fs::create_dir_all(&root).unwrap();
    for (name, body) in species {
        fs::write(root.join(format!("{}.xyz", name)), body).unwrap();
    }
    root
}

pub fn write_text(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

pub fn output_config(dir: &TempDir, root: PathBuf, atom_budget: usize) -> OutputConfig {
    OutputConfigBuilder::new()
        .structure_root(root)
        .output_dir(dir.path().join("solvated"))
        .atom_budget(atom_budget)
        .packing(PackingSettings::default())
        .build()
        .unwrap()
}

/// Packs molecules on a diagonal of the box, copying the atoms of each block's
/// structure file, and records every configuration it was given.
#[derive(Default)]
pub struct RecordingPacker {
    calls: AtomicUsize,
    configs: Mutex<Vec<PackingConfig>>,
    fail_for: Option<String>,
}

impl RecordingPacker {
    pub fn failing_for(stem: &str) -> Self {
        Self {
            fail_for: Some(stem.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn configs(&self) -> Vec<PackingConfig> {
        self.configs.lock().unwrap().clone()
    }
}

impl PackingTool for RecordingPacker {
    fn run(&self, invocation: &PackingInvocation) -> Result<PathBuf, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failure = |reason: String| EngineError::ExternalToolFailure {
            reason,
            work_dir: invocation.work_dir.clone(),
        };
        if self.fail_for.as_deref() == Some(invocation.log_stem.as_str()) {
            fs::write(invocation.stderr_path(), "ERROR: could not pack\n").unwrap();
            return Err(failure("exit status: 171".into()));
        }

        let text = fs::read_to_string(&invocation.config_path).map_err(|e| failure(e.to_string()))?;
        let config = PackingConfig::parse(&text).map_err(|e| failure(e.to_string()))?;

        let mut lines = Vec::new();
        let total_molecules = config.molecule_count().max(1) as f64;
        let mut placed = 0.0;
        for block in &config.structures {
            let body = fs::read_to_string(invocation.work_dir.join(&block.path))
                .map_err(|e| failure(e.to_string()))?;
            let atoms: Vec<&str> = body.lines().skip(2).filter(|l| !l.trim().is_empty()).collect();
            for _ in 0..block.number {
                let shift = config.pbc[0] * (placed + 0.5) / total_molecules;
                placed += 1.0;
                for atom in &atoms {
                    let fields: Vec<&str> = atom.split_whitespace().collect();
                    let coord = |i: usize| fields[i].parse::<f64>().unwrap() + shift;
                    lines.push(format!(
                        "{:<2} {:>14.6} {:>14.6} {:>14.6}",
                        fields[0],
                        coord(1),
                        coord(2),
                        coord(3)
                    ));
                }
            }
        }

        let xyz = format!(" {}\n Built with Packmol\n{}\n", lines.len(), lines.join("\n"));
        fs::write(invocation.work_dir.join(&config.output), xyz)
            .map_err(|e| failure(e.to_string()))?;
        self.configs.lock().unwrap().push(config);
        Ok(invocation.output_path.clone())
    }
}
