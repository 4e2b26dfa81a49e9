use std::fmt;

/// Running counts of finished sweep combinations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepTally {
    pub succeeded: usize,
    pub skipped: usize,
    /// Held by a process on another host.
    pub claimed: usize,
    pub failed: usize,
}

impl SweepTally {
    pub fn finished(&self) -> usize {
        self.succeeded + self.skipped + self.claimed + self.failed
    }
}

impl fmt::Display for SweepTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ok, {} skipped", self.succeeded, self.skipped)?;
        if self.claimed > 0 {
            write!(f, ", {} claimed", self.claimed)?;
        }
        write!(f, ", {} failed", self.failed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total: u64 },
    TaskIncrement { amount: u64 },
    TaskFinish,

    /// Sweep counts after another combination finished.
    Tally(SweepTally),
    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn tally_mentions_claims_only_when_present() {
        let mut tally = SweepTally {
            succeeded: 3,
            skipped: 1,
            claimed: 0,
            failed: 0,
        };
        assert_eq!(tally.to_string(), "3 ok, 1 skipped, 0 failed");
        tally.claimed = 2;
        assert_eq!(tally.to_string(), "3 ok, 1 skipped, 2 claimed, 0 failed");
        assert_eq!(tally.finished(), 6);
    }

    #[test]
    fn reporter_without_callback_ignores_events() {
        ProgressReporter::new().report(Progress::PhaseFinish);
    }

    #[test]
    fn reporter_forwards_events_in_order() {
        let seen = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|p| seen.lock().unwrap().push(p)));

        reporter.report(Progress::PhaseStart { name: "Sweep" });
        reporter.report(Progress::TaskIncrement { amount: 1 });
        drop(reporter);

        assert_eq!(
            seen.into_inner().unwrap(),
            vec![
                Progress::PhaseStart { name: "Sweep" },
                Progress::TaskIncrement { amount: 1 }
            ]
        );
    }
}
