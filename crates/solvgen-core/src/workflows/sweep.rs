use crate::core::io::table::{self, IonRecord, SolventRecord};
use crate::core::models::recipe::{SoluteEntry, SolventEntry, SystemRecipe};
use crate::engine::composition::balance;
use crate::engine::config::SweepConfig;
use crate::engine::error::EngineError;
use crate::engine::job::{JobOutcome, JobRunner};
use crate::engine::library::StructureLibrary;
use crate::engine::packing::PackingTool;
use crate::engine::progress::{Progress, ProgressReporter, SweepTally};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tracing::{error, info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Terminal state of one (cation, anion, solvent) combination.
#[derive(Debug)]
pub enum CombinationOutcome {
    Succeeded(PathBuf),
    /// The canonical output was already on disk.
    Skipped(PathBuf),
    /// A process on another host holds the output claim; the output does not exist
    /// yet, so the sweep is not complete.
    Claimed { path: PathBuf, holder: String },
    Failed(EngineError),
}

#[derive(Debug)]
pub struct CombinationReport {
    pub cation: String,
    pub anion: String,
    pub solvent: String,
    pub outcome: CombinationOutcome,
}

impl fmt::Display for CombinationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {} in {}", self.cation, self.anion, self.solvent)
    }
}

/// Per-combination results of a sweep, in sweep order.
#[derive(Debug, Default)]
pub struct SweepSummary {
    pub reports: Vec<CombinationReport>,
}

impl SweepSummary {
    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, CombinationOutcome::Succeeded(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, CombinationOutcome::Skipped(_)))
    }

    pub fn claimed(&self) -> usize {
        self.count(|o| matches!(o, CombinationOutcome::Claimed { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, CombinationOutcome::Failed(_)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&CombinationReport, &EngineError)> {
        self.reports.iter().filter_map(|r| match &r.outcome {
            CombinationOutcome::Failed(e) => Some((r, e)),
            _ => None,
        })
    }

    /// Combinations that may be retried: failed or claimed elsewhere.
    pub fn unfinished(&self) -> usize {
        self.failed() + self.claimed()
    }

    /// True when every combination has its canonical output on disk.
    pub fn is_clean(&self) -> bool {
        self.unfinished() == 0
    }


    fn count(&self, predicate: impl Fn(&CombinationOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| predicate(&r.outcome)).count()
    }
}

impl fmt::Display for SweepSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} succeeded, {} skipped", self.succeeded(), self.skipped())?;
        if self.claimed() > 0 {
            write!(f, ", {} claimed elsewhere", self.claimed())?;
        }
        write!(f, ", {} failed", self.failed())
    }
}

/// Adds `outcome` to the running counts and returns a snapshot.
fn record(tally: &Mutex<SweepTally>, outcome: &CombinationOutcome) -> SweepTally {
    let mut tally = tally.lock().unwrap_or_else(PoisonError::into_inner);
    match outcome {
        CombinationOutcome::Succeeded(_) => tally.succeeded += 1,
        CombinationOutcome::Skipped(_) => tally.skipped += 1,
        CombinationOutcome::Claimed { .. } => tally.claimed += 1,
        CombinationOutcome::Failed(_) => tally.failed += 1,
    }
    *tally
}

/// Generates every cation × anion × solvent combination from the configured tables.
///
/// Only unreadable tables or an unusable output directory abort the sweep. Every
/// per-combination error is logged, recorded in the summary and the sweep moves on.
/// Combinations run on the rayon pool when the `parallel` feature is enabled.
#[instrument(skip_all, name = "sweep_workflow")]
pub fn run(
    config: &SweepConfig,
    tool: &dyn PackingTool,
    reporter: &ProgressReporter,
) -> Result<SweepSummary, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Loading Tables",
    });
    let cations = table::load_ions(&config.tables.cations)?;
    let anions = table::load_ions(&config.tables.anions)?;
    let solvents = table::load_solvents(&config.tables.solvents)?;
    let library = StructureLibrary::new(&config.output.structure_root)?;
    let runner = JobRunner::new(
        &library,
        tool,
        &config.output.packing,
        &config.output.output_dir,
    )?;
    reporter.report(Progress::PhaseFinish);

    let combinations: Vec<(&IonRecord, &IonRecord, &SolventRecord)> = cations
        .iter()
        .flat_map(|c| anions.iter().map(move |a| (c, a)))
        .flat_map(|(c, a)| solvents.iter().map(move |s| (c, a, s)))
        .collect();
    info!(
        cations = cations.len(),
        anions = anions.len(),
        solvents = solvents.len(),
        "Sweeping {} combinations into {}.",
        combinations.len(),
        runner.output_dir().display()
    );

    reporter.report(Progress::PhaseStart { name: "Sweep" });
    reporter.report(Progress::TaskStart {
        total: combinations.len() as u64,
    });

    let tally = Mutex::new(SweepTally::default());

    #[cfg(not(feature = "parallel"))]
    let iterator = combinations.iter();

    #[cfg(feature = "parallel")]
    let iterator = combinations.par_iter();

    let reports: Vec<CombinationReport> = iterator
        .map(|&(cation, anion, solvent)| {
            let report = CombinationReport {
                cation: cation.name.clone(),
                anion: anion.name.clone(),
                solvent: solvent.name.clone(),
                outcome: process(&runner, cation, anion, solvent, config.output.atom_budget),
            };
            match &report.outcome {
                CombinationOutcome::Failed(e) => {
                    error!(combination = %report, kind = e.kind(), "Combination failed: {}", e);
                }
                CombinationOutcome::Claimed { holder, .. } => {
                    warn!(combination = %report, "Left to {}, which holds its claim.", holder);
                }
                _ => {}
            }
            let snapshot = record(&tally, &report.outcome);
            reporter.report(Progress::TaskIncrement { amount: 1 });
            reporter.report(Progress::Tally(snapshot));
            report
        })
        .collect();

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    let summary = SweepSummary { reports };
    info!("Sweep finished: {}.", summary);
    reporter.report(Progress::Message(format!("Sweep finished: {}", summary)));
    Ok(summary)
}

fn process(
    runner: &JobRunner,
    cation: &IonRecord,
    anion: &IonRecord,
    solvent: &SolventRecord,
    atom_budget: usize,
) -> CombinationOutcome {
    let (m, n) = match balance(cation.charge, anion.charge) {
        Ok(counts) => counts,
        Err(e) => return CombinationOutcome::Failed(e),
    };
    let recipe = SystemRecipe::new(
        vec![
            SoluteEntry::new(&cation.name, m).with_charge(cation.charge),
            SoluteEntry::new(&anion.name, n).with_charge(anion.charge),
        ],
        SolventEntry::new(&solvent.name, solvent.density),
        atom_budget,
    );

    match runner.run(&recipe) {
        Ok(JobOutcome::Created { path, .. }) => CombinationOutcome::Succeeded(path),
        Ok(JobOutcome::AlreadyExists(path)) => CombinationOutcome::Skipped(path),
        Ok(JobOutcome::Claimed { path, holder }) => CombinationOutcome::Claimed { path, holder },
        Err(e) => CombinationOutcome::Failed(e),
    }
}
