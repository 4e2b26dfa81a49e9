use crate::core::models::geometry::BoxGeometry;
use crate::core::models::recipe::SystemRecipe;
use crate::core::models::species::{SoluteSpec, SolventSpec, Species, SystemRequest};
use crate::engine::claim::{ClaimAttempt, OutputClaim};
use crate::engine::config::PackingSettings;
use crate::engine::error::EngineError;
use crate::engine::library::StructureLibrary;
use crate::engine::normalize::normalize;
use crate::engine::packing::{PackingConfig, PackingInvocation, PackingTool};
use crate::engine::sizing::size;
use std::fs;
use std::iter;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

const WORK_DIR_NAME: &str = ".work";
const CONFIG_FILE_NAME: &str = "packmol.inp";
const RAW_OUTPUT_FILE_NAME: &str = "packed.xyz";
const STAGED_DIR_NAME: &str = "species";
const CLAIM_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Where the packer reads `species` from, relative to the work directory.
fn staged_path(species: &Species) -> PathBuf {
    Path::new(STAGED_DIR_NAME).join(format!("{}.xyz", species.name))
}

/// One fully resolved packing run: the request, its box, and every file it touches.
#[derive(Debug, Clone)]
pub struct PackingJob {
    pub request: SystemRequest,
    pub geometry: BoxGeometry,
    pub solvent_count: usize,
    pub tolerance: f64,
    pub work_dir: PathBuf,
    pub config_path: PathBuf,
    pub raw_output: PathBuf,
    pub destination: PathBuf,
}

impl PackingJob {
    /// Sizes the box for `request` and lays out the job's files under `output_dir`.
    pub fn plan(
        request: SystemRequest,
        output_dir: &Path,
        tolerance: f64,
    ) -> Result<Self, EngineError> {
        let sized = size(&request.solutes, &request.solvent, request.atom_budget)?;
        let stem = request.canonical_stem();
        let work_dir = output_dir.join(WORK_DIR_NAME).join(&stem);
        Ok(Self {
            geometry: sized.geometry,
            solvent_count: sized.solvent_count,
            tolerance,
            config_path: work_dir.join(CONFIG_FILE_NAME),
            raw_output: work_dir.join(RAW_OUTPUT_FILE_NAME),
            destination: output_dir.join(request.canonical_file_name()),
            work_dir,
            request,
        })
    }

    /// Packer input with every path relative to the work directory, where the packer
    /// runs.
    pub fn config(&self) -> PackingConfig {
        PackingConfig::build(
            &self.geometry,
            &self.request.solutes,
            &self.request.solvent,
            self.solvent_count,
            Path::new(RAW_OUTPUT_FILE_NAME),
            self.tolerance,
            staged_path,
        )
    }

    /// Copies each species' structure file into the work directory.
    fn stage_species(&self) -> Result<(), EngineError> {
        let staged_dir = self.work_dir.join(STAGED_DIR_NAME);
        fs::create_dir_all(&staged_dir).map_err(|e| EngineError::io(&staged_dir, e))?;
        let species = self
            .request
            .solutes
            .iter()
            .map(|s| &s.species)
            .chain(iter::once(&self.request.solvent.species));
        for species in species {
            fs::copy(&species.structure_path, self.work_dir.join(staged_path(species)))
                .map_err(|e| EngineError::io(&species.structure_path, e))?;
        }
        Ok(())
    }

    fn invocation(&self) -> PackingInvocation {
        PackingInvocation {
            config_path: self.config_path.clone(),
            output_path: self.raw_output.clone(),
            work_dir: self.work_dir.clone(),
            log_stem: self.request.canonical_stem(),
        }
    }
}

/// How a single system request ended, short of an error.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// The canonical output was written by this call.
    Created {
        path: PathBuf,
        atoms: usize,
        edge: f64,
    },
    /// The canonical output already existed; nothing was done.
    AlreadyExists(PathBuf),
    /// A process on another host holds the claim on this output, so nothing was
    /// produced here.
    Claimed { path: PathBuf, holder: String },
}

/// Runs system recipes through the full pipeline against one output directory.
pub struct JobRunner<'a> {
    library: &'a StructureLibrary,
    tool: &'a dyn PackingTool,
    settings: &'a PackingSettings,
    output_dir: PathBuf,
}

impl<'a> JobRunner<'a> {
    /// Creates the output directory if needed and resolves it against the current
    /// directory, which the packer does not share.
    pub fn new(
        library: &'a StructureLibrary,
        tool: &'a dyn PackingTool,
        settings: &'a PackingSettings,
        output_dir: &Path,
    ) -> Result<Self, EngineError> {
        fs::create_dir_all(output_dir).map_err(|e| EngineError::io(output_dir, e))?;
        let output_dir = std::path::absolute(output_dir).map_err(|e| EngineError::io(output_dir, e))?;
        Ok(Self {
            library,
            tool,
            settings,
            output_dir,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn destination_for(&self, recipe: &SystemRecipe) -> PathBuf {
        self.output_dir.join(recipe.canonical_file_name())
    }

    /// Produces the canonical output for `recipe` unless it already exists.
    ///
    /// The existence check happens before any structure file is read. A claim on the
    /// output path is then taken so that concurrent callers never run the packer twice
    /// for the same system. While a live process on this host holds the claim, the
    /// call waits for it to finish; a claim held from another host is reported as
    /// [`JobOutcome::Claimed`].
    #[instrument(skip_all, name = "job", fields(system = %recipe.canonical_stem()))]
    pub fn run(&self, recipe: &SystemRecipe) -> Result<JobOutcome, EngineError> {
        let destination = self.destination_for(recipe);
        let mut waiting = false;
        let _claim = loop {
            if destination.exists() {
                info!("Output {} already exists, skipping.", destination.display());
                return Ok(JobOutcome::AlreadyExists(destination));
            }
            match OutputClaim::acquire(&destination)? {
                ClaimAttempt::Acquired(claim) => break claim,
                ClaimAttempt::Held(Some(owner)) if !owner.is_local() => {
                    warn!(
                        "Output {} is claimed by {}, not packing it here.",
                        destination.display(),
                        owner
                    );
                    return Ok(JobOutcome::Claimed {
                        path: destination,
                        holder: owner.to_string(),
                    });
                }
                ClaimAttempt::Held(owner) => {
                    if !waiting {
                        waiting = true;
                        info!(
                            "Waiting for {} to finish {}.",
                            owner.map_or_else(|| "another worker".to_string(), |o| o.to_string()),
                            destination.display()
                        );
                    }
                    thread::sleep(CLAIM_POLL_INTERVAL);
                }
            }
        };
        if destination.exists() {
            return Ok(JobOutcome::AlreadyExists(destination));
        }

        let request = self.resolve(recipe)?;
        let job = PackingJob::plan(request, &self.output_dir, self.settings.tolerance)?;
        job.config().validate()?;
        debug!(
            edge = job.geometry.edge(),
            solvent_count = job.solvent_count,
            net_charge = ?job.request.net_charge(),
            "Planned job for {}.",
            job.request
        );
        if let Some(charge) = job.request.net_charge().filter(|&c| c != 0) {
            warn!("System {} carries a net charge of {:+}.", job.request, charge);
        }

        match self.execute(&job) {
            Ok(atoms) => {
                self.clean_up(&job);
                info!("Wrote {} ({} atoms).", job.destination.display(), atoms);
                Ok(JobOutcome::Created {
                    path: job.destination,
                    atoms,
                    edge: job.geometry.edge(),
                })
            }
            Err(e) => {
                error!(
                    "Job failed, working files kept in {}: {}",
                    job.work_dir.display(),
                    e
                );
                Err(e)
            }
        }
    }

    fn resolve(&self, recipe: &SystemRecipe) -> Result<SystemRequest, EngineError> {
        let solutes = recipe
            .solutes
            .iter()
            .map(|entry| {
                let species = self.library.resolve(&entry.name)?;
                let species = match entry.charge {
                    Some(charge) => species.with_charge(charge),
                    None => species,
                };
                Ok(SoluteSpec::new(species, entry.count))
            })
            .collect::<Result<Vec<_>, EngineError>>()?;
        let solvent = SolventSpec::new(
            self.library.resolve(&recipe.solvent.name)?,
            recipe.solvent.density,
        );
        Ok(SystemRequest::new(solutes, solvent, recipe.atom_budget))
    }

    fn execute(&self, job: &PackingJob) -> Result<usize, EngineError> {
        if job.work_dir.exists() {
            debug!("Clearing stale working directory {}.", job.work_dir.display());
            fs::remove_dir_all(&job.work_dir).map_err(|e| EngineError::io(&job.work_dir, e))?;
        }
        fs::create_dir_all(&job.work_dir).map_err(|e| EngineError::io(&job.work_dir, e))?;
        job.stage_species()?;
        fs::write(&job.config_path, job.config().render())
            .map_err(|e| EngineError::io(&job.config_path, e))?;

        let raw = self.tool.run(&job.invocation())?;
        let structure = normalize(
            &raw,
            &job.geometry,
            &job.destination,
            &self.settings.normalize,
        )?;
        Ok(structure.len())
    }

    fn clean_up(&self, job: &PackingJob) {
        if self.settings.keep_work_files {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&job.work_dir) {
            warn!(
                "Failed to remove working directory {}: {}",
                job.work_dir.display(),
                e
            );
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakePacker;
    use super::*;
    use crate::core::models::recipe::{SoluteEntry, SolventEntry};
    use tempfile::{TempDir, tempdir};

    fn library() -> (TempDir, StructureLibrary) {
        let dir = tempdir().unwrap();
        let library = library_in(dir.path());
        (dir, library)
    }

    fn library_in(root: &Path) -> StructureLibrary {
        fs::create_dir_all(root).unwrap();
        fs::write(root.join("Li.xyz"), "1\n\nLi 0 0 0\n").unwrap();
        fs::write(
            root.join("perchlorate.xyz"),
            "5\n\nCl 0 0 0\nO 1.4 0 0\nO -1.4 0 0\nO 0 1.4 0\nO 0 -1.4 0\n",
        )
        .unwrap();
        fs::write(
            root.join("water.xyz"),
            "3\n\nO 0 0 0\nH 0.757 0.586 0\nH -0.757 0.586 0\n",
        )
        .unwrap();
        StructureLibrary::new(root).unwrap()
    }

    fn recipe(budget: usize) -> SystemRecipe {
        SystemRecipe::new(
            vec![SoluteEntry::new("Li", 1), SoluteEntry::new("perchlorate", 1)],
            SolventEntry::new("water", 1.0),
            budget,
        )
    }

    #[test]
    fn run_creates_canonical_output_and_removes_work_dir() {
        let (_structures, library) = library();
        let out = tempdir().unwrap();
        let packer = FakePacker::default();
        let settings = PackingSettings::default();
        let runner = JobRunner::new(&library, &packer, &settings, out.path()).unwrap();

        let outcome = runner.run(&recipe(200)).unwrap();

        let expected = out.path().join("1Li_1perchlorate_water.xyz");
        assert!(matches!(
            outcome,
            JobOutcome::Created { ref path, atoms: 66, .. } if *path == expected
        ));
        assert!(expected.is_file());
        assert!(!out.path().join(".work/1Li_1perchlorate_water").exists());
        assert!(!out.path().join(".1Li_1perchlorate_water.lock").exists());
        assert_eq!(packer.calls(), 1);
    }

    #[test]
    fn run_keeps_work_files_when_requested() {
        let (_structures, library) = library();
        let out = tempdir().unwrap();
        let packer = FakePacker::default();
        let settings = PackingSettings {
            keep_work_files: true,
            ..PackingSettings::default()
        };
        let runner = JobRunner::new(&library, &packer, &settings, out.path()).unwrap();
        runner.run(&recipe(200)).unwrap();

        let work = out.path().join(".work").join("1Li_1perchlorate_water");
        let config = fs::read_to_string(work.join("packmol.inp")).unwrap();
        assert!(config.starts_with("tolerance 2.0\nfiletype xyz\noutput packed.xyz\n"));
        assert!(config.contains("\nstructure species/perchlorate.xyz\n"));
        assert!(config.contains("  number 64\n"));
        assert!(work.join("species/water.xyz").is_file());
        assert!(work.join("packed.xyz").is_file());
    }

    #[test]
    fn paths_with_spaces_reach_the_packer_intact() {
        let dir = tempdir().unwrap();
        let library = library_in(&dir.path().join("My Structures"));
        let packer = FakePacker::default();
        let settings = PackingSettings {
            keep_work_files: true,
            ..PackingSettings::default()
        };
        let out = dir.path().join("out dir");
        let runner = JobRunner::new(&library, &packer, &settings, &out).unwrap();

        let outcome = runner.run(&recipe(200)).unwrap();

        assert!(matches!(outcome, JobOutcome::Created { atoms: 66, .. }));
        assert!(out.join("1Li_1perchlorate_water.xyz").is_file());
        let text =
            fs::read_to_string(out.join(".work/1Li_1perchlorate_water/packmol.inp")).unwrap();
        let config = PackingConfig::parse(&text).unwrap();
        assert_eq!(config.output, PathBuf::from("packed.xyz"));
        assert_eq!(config.structures[0].path, PathBuf::from("species/Li.xyz"));
    }

    #[test]
    fn second_run_skips_without_invoking_the_packer() {
        let (_structures, library) = library();
        let out = tempdir().unwrap();
        let packer = FakePacker::default();
        let settings = PackingSettings::default();
        let runner = JobRunner::new(&library, &packer, &settings, out.path()).unwrap();

        runner.run(&recipe(200)).unwrap();
        let path = runner.destination_for(&recipe(200));
        let first = fs::read(&path).unwrap();

        let outcome = runner.run(&recipe(200)).unwrap();
        assert_eq!(outcome, JobOutcome::AlreadyExists(path.clone()));
        assert_eq!(packer.calls(), 1);
        assert_eq!(fs::read(&path).unwrap(), first);
    }

    #[test]
    fn species_name_with_whitespace_is_rejected_before_packing() {
        let (structures, library) = library();
        fs::copy(
            structures.path().join("water.xyz"),
            structures.path().join("sea water.xyz"),
        )
        .unwrap();
        let out = tempdir().unwrap();
        let packer = FakePacker::default();
        let settings = PackingSettings::default();
        let runner = JobRunner::new(&library, &packer, &settings, out.path()).unwrap();
        let recipe = SystemRecipe::new(
            vec![SoluteEntry::new("Li", 1)],
            SolventEntry::new("sea water", 1.0),
            200,
        );

        let err = runner.run(&recipe).unwrap_err();

        assert_eq!(err.kind(), "InvalidPackingConfig");
        assert_eq!(packer.calls(), 0);
        assert!(!out.path().join(".work").exists());
    }

    #[test]
    fn live_local_holder_is_waited_for() {
        let (_structures, library) = library();
        let out = tempdir().unwrap();
        let packer = FakePacker::default();
        let settings = PackingSettings::default();
        let runner = JobRunner::new(&library, &packer, &settings, out.path()).unwrap();

        let destination = runner.destination_for(&recipe(200));
        let ClaimAttempt::Acquired(held) = OutputClaim::acquire(&destination).unwrap() else {
            panic!("expected to acquire the claim");
        };
        let writer = {
            let destination = destination.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(300));
                fs::write(&destination, "1\n\nH 0 0 0\n").unwrap();
                drop(held);
            })
        };

        let outcome = runner.run(&recipe(200)).unwrap();
        writer.join().unwrap();

        assert_eq!(outcome, JobOutcome::AlreadyExists(destination));
        assert_eq!(packer.calls(), 0);
    }

    #[test]
    fn claim_from_another_host_is_reported_without_packing() {
        let (_structures, library) = library();
        let out = tempdir().unwrap();
        let packer = FakePacker::default();
        let settings = PackingSettings::default();
        let runner = JobRunner::new(&library, &packer, &settings, out.path()).unwrap();

        let destination = runner.destination_for(&recipe(200));
        fs::write(
            OutputClaim::lock_path_for(&destination),
            "777@solvgen-test-host.invalid\n",
        )
        .unwrap();

        assert_eq!(
            runner.run(&recipe(200)).unwrap(),
            JobOutcome::Claimed {
                path: destination.clone(),
                holder: "pid 777 on solvgen-test-host.invalid".into(),
            }
        );
        assert_eq!(packer.calls(), 0);
        assert!(!destination.exists());
    }

    #[cfg(unix)]
    #[test]
    fn leftover_lock_of_a_dead_run_does_not_block_the_output() {
        let (_structures, library) = library();
        let out = tempdir().unwrap();
        let packer = FakePacker::default();
        let settings = PackingSettings::default();
        let runner = JobRunner::new(&library, &packer, &settings, out.path()).unwrap();

        let mut child = std::process::Command::new("true").spawn().unwrap();
        let dead_pid = child.id();
        child.wait().unwrap();
        let destination = runner.destination_for(&recipe(200));
        let lock_path = OutputClaim::lock_path_for(&destination);
        fs::write(&lock_path, format!("{}\n", dead_pid)).unwrap();

        let outcome = runner.run(&recipe(200)).unwrap();

        assert!(matches!(outcome, JobOutcome::Created { atoms: 66, .. }));
        assert!(destination.is_file());
        assert!(!lock_path.exists());
        assert_eq!(packer.calls(), 1);
    }

    #[test]
    fn insufficient_budget_writes_nothing() {
        let (_structures, library) = library();
        let out = tempdir().unwrap();
        let packer = FakePacker::default();
        let settings = PackingSettings::default();
        let runner = JobRunner::new(&library, &packer, &settings, out.path()).unwrap();

        let err = runner.run(&recipe(5)).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientBudget { .. }));
        assert_eq!(packer.calls(), 0);
        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn packer_failure_keeps_work_dir_and_leaves_no_output() {
        let (_structures, library) = library();
        let out = tempdir().unwrap();
        let packer = FakePacker {
            fail_with_exit: true,
            ..FakePacker::default()
        };
        let settings = PackingSettings::default();
        let runner = JobRunner::new(&library, &packer, &settings, out.path()).unwrap();

        let err = runner.run(&recipe(200)).unwrap_err();
        assert_eq!(err.kind(), "ExternalToolFailure");
        assert!(!runner.destination_for(&recipe(200)).exists());
        assert!(
            out.path()
                .join(".work/1Li_1perchlorate_water/packmol.inp")
                .is_file()
        );
    }

    #[test]
    fn missing_species_is_reported_before_packing() {
        let (_structures, library) = library();
        let out = tempdir().unwrap();
        let packer = FakePacker::default();
        let settings = PackingSettings::default();
        let runner = JobRunner::new(&library, &packer, &settings, out.path()).unwrap();

        let recipe = SystemRecipe::new(
            vec![SoluteEntry::new("Na", 1)],
            SolventEntry::new("water", 1.0),
            200,
        );
        assert!(matches!(
            runner.run(&recipe),
            Err(EngineError::MissingStructureFile { .. })
        ));
        assert_eq!(packer.calls(), 0);
    }
}
