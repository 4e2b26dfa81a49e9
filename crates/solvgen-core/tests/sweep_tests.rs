use std::fs;
use std::sync::Arc;
use std::thread;

mod common;
use common::{
    CHLORIDE, LITHIUM, MAGNESIUM, PERCHLORATE, RecordingPacker, WATER, output_config,
    structure_root, write_text,
};
use solvgen::engine::config::{SweepConfig, SweepConfigBuilder};
use solvgen::engine::progress::ProgressReporter;
use solvgen::workflows::sweep::{self, CombinationOutcome};
use tempfile::{TempDir, tempdir};

fn sweep_config(dir: &TempDir, cations: &str, anions: &str, solvents: &str) -> SweepConfig {
    let root = structure_root(
        dir.path(),
        &[
            ("Li", LITHIUM),
            ("Mg", MAGNESIUM),
            ("chloride", CHLORIDE),
            ("perchlorate", PERCHLORATE),
            ("water", WATER),
        ],
    );
    SweepConfigBuilder::new()
        .output(output_config(dir, root, 120))
        .cation_table(write_text(dir.path(), "cations.csv", cations))
        .anion_table(write_text(dir.path(), "anions.csv", anions))
        .solvent_table(write_text(dir.path(), "solvents.csv", solvents))
        .build()
        .unwrap()
}

#[test]
fn sweep_is_resumable_after_partial_completion() {
    let dir = tempdir().unwrap();
    let config = sweep_config(
        &dir,
        "name,charge\nLi,1\nMg,2\n",
        "name,charge\nchloride,-1\nperchlorate,-1\n",
        "name,density\nwater,1.0\n",
    );

    let first = RecordingPacker::failing_for("1Mg_2perchlorate_water");
    let summary = sweep::run(&config, &first, &ProgressReporter::new()).unwrap();
    assert_eq!(summary.succeeded(), 3);
    assert_eq!(summary.failed(), 1);
    let (report, error) = summary.failures().next().unwrap();
    assert_eq!(report.to_string(), "Mg + perchlorate in water");
    assert_eq!(error.kind(), "ExternalToolFailure");

    let second = RecordingPacker::default();
    let summary = sweep::run(&config, &second, &ProgressReporter::new()).unwrap();
    assert_eq!(summary.succeeded(), 1);
    assert_eq!(summary.skipped(), 3);
    assert_eq!(second.calls(), 1);
    assert!(summary.is_clean());
    assert!(
        dir.path()
            .join("solvated/1Mg_2perchlorate_water.xyz")
            .is_file()
    );
}

#[test]
fn concurrent_sweeps_pack_each_combination_once() {
    let dir = tempdir().unwrap();
    let config = Arc::new(sweep_config(
        &dir,
        "name,charge\nLi,1\nMg,2\n",
        "name,charge\nchloride,-1\nperchlorate,-1\n",
        "name,density\nwater,1.0\nwater_dense,1.2\n",
    ));
    fs::copy(
        config.output.structure_root.join("water.xyz"),
        config.output.structure_root.join("water_dense.xyz"),
    )
    .unwrap();
    let packer = Arc::new(RecordingPacker::default());

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let config = Arc::clone(&config);
            let packer = Arc::clone(&packer);
            thread::spawn(move || {
                sweep::run(&config, packer.as_ref(), &ProgressReporter::new()).unwrap()
            })
        })
        .collect();
    let summaries: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(packer.calls(), 8);
    assert_eq!(summaries.iter().map(|s| s.succeeded()).sum::<usize>(), 8);
    for summary in &summaries {
        assert!(summary.is_clean());
        assert_eq!(summary.reports.len(), 8);
        for report in &summary.reports {
            assert!(matches!(
                report.outcome,
                CombinationOutcome::Succeeded(_) | CombinationOutcome::Skipped(_)
            ));
        }
    }

    let outputs = fs::read_dir(dir.path().join("solvated"))
        .unwrap()
        .filter(|e| {
            e.as_ref()
                .unwrap()
                .file_name()
                .to_string_lossy()
                .ends_with(".xyz")
        })
        .count();
    assert_eq!(outputs, 8);
}
