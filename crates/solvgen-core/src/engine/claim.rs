use crate::engine::error::EngineError;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

/// An unreadable lock younger than this may still be mid-write by its creator.
const UNREADABLE_GRACE: Duration = Duration::from_secs(10);
const MAX_TAKEOVERS: usize = 3;

/// Lock files created by this process and not yet released, with the token of the
/// claim that created each.
static HELD: Mutex<BTreeMap<PathBuf, usize>> = Mutex::new(BTreeMap::new());
static NEXT_TOKEN: AtomicUsize = AtomicUsize::new(0);
static ASIDE_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn held() -> MutexGuard<'static, BTreeMap<PathBuf, usize>> {
    HELD.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The process recorded in a lock file, written as `<pid>@<host>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimOwner {
    pub pid: u32,
    /// `None` for locks written without a host name; those are taken to be local.
    pub host: Option<String>,
}

impl ClaimOwner {
    fn current() -> Self {
        Self {
            pid: std::process::id(),
            host: local_host(),
        }
    }

    fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (pid, host) = match text.split_once('@') {
            Some((pid, host)) => (pid, Some(host.to_string()).filter(|h| !h.is_empty())),
            None => (text, None),
        };
        Some(Self {
            pid: pid.parse().ok()?,
            host,
        })
    }

    fn render(&self) -> String {
        match &self.host {
            Some(host) => format!("{}@{}", self.pid, host),
            None => self.pid.to_string(),
        }
    }

    /// Whether the owner ran on this machine, so its liveness can be checked.
    pub fn is_local(&self) -> bool {
        match &self.host {
            None => true,
            Some(host) => local_host().as_deref() == Some(host.as_str()),
        }
    }

    fn is_gone(&self) -> bool {
        self.is_local() && !process_alive(self.pid)
    }
}

impl fmt::Display for ClaimOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.host {
            Some(host) => write!(f, "pid {} on {}", self.pid, host),
            None => write!(f, "pid {}", self.pid),
        }
    }
}

/// Result of trying to claim an output path.
#[derive(Debug)]
pub enum ClaimAttempt {
    Acquired(OutputClaim),
    /// A live (or unverifiable) holder owns the lock. `None` when its lock file could
    /// not be read yet.
    Held(Option<ClaimOwner>),
}

/// Exclusive ownership of one canonical output path for the lifetime of a job.
///
/// Backed by a `.<stem>.lock` file next to the output, created with `create_new` so
/// that exactly one worker can hold it. The file records the owner's pid and host;
/// a lock whose local owner has exited is taken over by the next claimant. The lock
/// file is removed on drop, or by [`release_all`] when the process is interrupted.
#[derive(Debug)]
pub struct OutputClaim {
    lock_path: PathBuf,
    token: usize,
}

impl OutputClaim {
    /// Path of the lock file guarding `output`.
    pub fn lock_path_for(output: &Path) -> PathBuf {
        let stem = output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        output.with_file_name(format!(".{}.lock", stem))
    }

    /// Attempts to claim `output`, taking over a lock left behind by a dead process.
    pub fn acquire(output: &Path) -> Result<ClaimAttempt, EngineError> {
        let lock_path = Self::lock_path_for(output);
        for _ in 0..MAX_TAKEOVERS {
            match Self::create(&lock_path) {
                Ok(claim) => return Ok(ClaimAttempt::Acquired(claim)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(EngineError::io(lock_path, e)),
            }

            let observed = match fs::read_to_string(&lock_path) {
                Ok(text) => text,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(EngineError::io(lock_path, e)),
            };
            let owner = ClaimOwner::parse(&observed);
            let stale = match &owner {
                Some(owner) => owner.is_gone(),
                None => lock_age(&lock_path) > UNREADABLE_GRACE,
            };
            if !stale {
                return Ok(ClaimAttempt::Held(owner));
            }

            match &owner {
                Some(owner) => warn!(
                    "Taking over claim {} left by exited {}.",
                    lock_path.display(),
                    owner
                ),
                None => warn!("Taking over unreadable claim {}.", lock_path.display()),
            }
            remove_stale(&lock_path, &observed)?;
        }

        let owner = fs::read_to_string(&lock_path)
            .ok()
            .and_then(|text| ClaimOwner::parse(&text));
        Ok(ClaimAttempt::Held(owner))
    }

    fn create(lock_path: &Path) -> io::Result<Self> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(lock_path)?;
        let token = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
        held().insert(lock_path.to_path_buf(), token);
        // Dropping the claim on a failed write removes the half-written lock.
        let claim = Self {
            lock_path: lock_path.to_path_buf(),
            token,
        };
        writeln!(file, "{}", ClaimOwner::current().render())?;
        Ok(claim)
    }
}

impl Drop for OutputClaim {
    fn drop(&mut self) {
        {
            let mut held = held();
            if held.get(&self.lock_path) != Some(&self.token) {
                return;
            }
            held.remove(&self.lock_path);
        }
        if let Err(e) = fs::remove_file(&self.lock_path) {
            warn!("Failed to release claim {}: {}", self.lock_path.display(), e);
        }
    }
}

/// Removes every lock file this process still holds and returns how many were
/// removed. For interrupt handlers, where claim destructors will not run.
pub fn release_all() -> usize {
    let paths = std::mem::take(&mut *held());
    paths
        .keys()
        .filter(|path| match fs::remove_file(path) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to release claim {}: {}", path.display(), e);
                false
            }
        })
        .count()
}

/// Moves a stale lock aside and deletes it, handing the lock back if a fresh claim
/// replaced it between reading and renaming.
fn remove_stale(lock_path: &Path, observed: &str) -> Result<(), EngineError> {
    let aside = lock_path.with_extension(format!(
        "lock.stale-{}-{}",
        std::process::id(),
        ASIDE_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    match fs::rename(lock_path, &aside) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(EngineError::io(lock_path, e)),
    }
    let moved = fs::read_to_string(&aside).unwrap_or_default();
    if moved != observed {
        debug!("Claim {} changed hands during takeover.", lock_path.display());
        if let Err(e) = fs::hard_link(&aside, lock_path) {
            warn!("Failed to restore claim {}: {}", lock_path.display(), e);
        }
    }
    if let Err(e) = fs::remove_file(&aside) {
        warn!("Failed to remove {}: {}", aside.display(), e);
    }
    Ok(())
}

fn lock_age(path: &Path) -> Duration {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .unwrap_or_default()
}

#[cfg(unix)]
fn local_host() -> Option<String> {
    let mut buf = [0u8; 256];
    // SAFETY: the buffer outlives the call and its length is passed along.
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
    if rc != 0 {
        return None;
    }
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8(buf[..end].to_vec())
        .ok()
        .filter(|host| !host.is_empty())
}

#[cfg(not(unix))]
fn local_host() -> Option<String> {
    std::env::var("COMPUTERNAME").ok().filter(|host| !host.is_empty())
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    if pid <= 0 {
        return false;
    }
    // SAFETY: signal 0 only checks that the process exists.
    if unsafe { libc::kill(pid, 0) } == 0 {
        return true;
    }
    io::Error::last_os_error().raw_os_error() != Some(libc::ESRCH)
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    true
}
