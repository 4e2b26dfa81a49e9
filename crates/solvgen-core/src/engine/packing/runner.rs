use crate::engine::error::EngineError;
use std::fs::{self, File};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Files involved in a single packing run.
#[derive(Debug, Clone)]
pub struct PackingInvocation {
    /// Packing configuration fed to the tool on standard input.
    pub config_path: PathBuf,
    /// Absolute path of the raw packed file. The configuration names it relative to
    /// `work_dir`.
    pub output_path: PathBuf,
    /// Directory owned exclusively by this run.
    pub work_dir: PathBuf,
    /// Prefix for the captured `<stem>.packmol.out` / `<stem>.packmol.log` streams.
    pub log_stem: String,
}

impl PackingInvocation {
    pub fn stdout_path(&self) -> PathBuf {
        self.work_dir.join(format!("{}.packmol.out", self.log_stem))
    }

    pub fn stderr_path(&self) -> PathBuf {
        self.work_dir.join(format!("{}.packmol.log", self.log_stem))
    }

    pub(crate) fn failure(&self, reason: impl Into<String>) -> EngineError {
        EngineError::ExternalToolFailure {
            reason: reason.into(),
            work_dir: self.work_dir.clone(),
        }
    }
}

/// An external molecular packing program.
///
/// Implementations place the molecules described by the configuration and return the
/// path of the raw packed structure. The returned file's existence is the only success
/// signal the pipeline relies on.
pub trait PackingTool: Send + Sync {
    fn run(&self, invocation: &PackingInvocation) -> Result<PathBuf, EngineError>;
}

/// Runs the Packmol binary as a child process.
#[derive(Debug, Clone)]
pub struct PackmolRunner {
    executable: PathBuf,
    timeout: Option<Duration>,
}

impl PackmolRunner {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Bare names go through `PATH`; relative paths are anchored to the caller's
    /// directory since the child runs inside the work directory.
    fn program(&self) -> PathBuf {
        if self.executable.is_relative() && self.executable.components().count() > 1 {
            std::path::absolute(&self.executable).unwrap_or_else(|_| self.executable.clone())
        } else {
            self.executable.clone()
        }
    }

    fn wait(&self, child: &mut Child, invocation: &PackingInvocation) -> Result<ExitStatus, EngineError> {
        let Some(timeout) = self.timeout else {
            return child
                .wait()
                .map_err(|e| invocation.failure(format!("failed to wait for packer: {}", e)));
        };

        let deadline = Instant::now() + timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if Instant::now() >= deadline => {
                    if let Err(e) = child.kill() {
                        warn!("Failed to kill timed-out packer: {}", e);
                    }
                    let _ = child.wait();
                    return Err(invocation.failure(format!(
                        "packer exceeded the timeout of {} s",
                        timeout.as_secs_f64()
                    )));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    return Err(invocation.failure(format!("failed to poll packer: {}", e)));
                }
            }
        }
    }
}

impl PackingTool for PackmolRunner {
    #[instrument(skip_all, name = "packmol", fields(stem = %invocation.log_stem))]
    fn run(&self, invocation: &PackingInvocation) -> Result<PathBuf, EngineError> {
        let stdin = File::open(&invocation.config_path)
            .map_err(|e| EngineError::io(&invocation.config_path, e))?;
        let stdout_path = invocation.stdout_path();
        let stderr_path = invocation.stderr_path();
        let stdout = File::create(&stdout_path).map_err(|e| EngineError::io(&stdout_path, e))?;
        let stderr = File::create(&stderr_path).map_err(|e| EngineError::io(&stderr_path, e))?;

        debug!(
            "Running {} < {}",
            self.executable.display(),
            invocation.config_path.display()
        );
        let mut child = Command::new(self.program())
            .current_dir(&invocation.work_dir)
            .stdin(Stdio::from(stdin))
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .spawn()
            .map_err(|e| {
                invocation.failure(format!(
                    "could not start '{}': {}",
                    self.executable.display(),
                    e
                ))
            })?;

        let status = self.wait(&mut child, invocation)?;

        if let Ok(captured) = fs::read_to_string(&stdout_path) {
            for line in captured.lines().filter(|l| !l.trim().is_empty()) {
                debug!(target: "solvgen::packmol", "{}", line);
            }
        }

        if !status.success() {
            return Err(invocation.failure(format!(
                "packer exited with {} (see {})",
                status,
                stderr_path.display()
            )));
        }
        if !invocation.output_path.is_file() {
            return Err(invocation.failure(format!(
                "packer reported success but wrote no {}",
                invocation.output_path.display()
            )));
        }
        Ok(invocation.output_path.clone())
    }
}
