use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use solvgen::engine::progress::{Progress, ProgressCallback, SweepTally};
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::warn;

#[derive(Debug)]
pub enum UiEvent {
    Progress(Progress),
    Log(String),
}

/// Counts shown on the sweep bar, shared with the bar's template keys.
type SharedTally = Arc<Mutex<SweepTally>>;

/// Draws phase spinners and the sweep bar on stderr, with log lines printed above.
pub struct UiManager {
    mp: Arc<MultiProgress>,
    phase: Option<Phase>,
    tally: SharedTally,
    events: mpsc::Receiver<UiEvent>,
    shutdown: watch::Receiver<bool>,
    // Keeps the multi-progress drawing between phases.
    anchor: ProgressBar,
}

struct Phase {
    name: &'static str,
    bar: ProgressBar,
}

impl UiManager {
    pub fn new() -> (Self, mpsc::Sender<UiEvent>, watch::Sender<bool>) {
        let (event_sender, events) = mpsc::channel(1024);
        let (shutdown_sender, shutdown) = watch::channel(false);
        let mp = Arc::new(MultiProgress::new());
        mp.set_draw_target(ProgressDrawTarget::stderr_with_hz(12));
        let anchor = mp.add(ProgressBar::hidden());
        let manager = Self {
            mp,
            phase: None,
            tally: SharedTally::default(),
            events,
            shutdown,
            anchor,
        };
        (manager, event_sender, shutdown_sender)
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(event) = self.events.recv() => self.handle_event(event),
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        self.anchor.finish_and_clear();
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Log(line) => self.print_line(line),
            UiEvent::Progress(progress) => self.handle_progress(progress),
        }
    }

    fn handle_progress(&mut self, progress: Progress) {
        match progress {
            Progress::PhaseStart { name } => self.start_phase(name),
            Progress::PhaseFinish => self.finish_phase(),
            Progress::TaskStart { total } => {
                *self.tally.lock().unwrap_or_else(PoisonError::into_inner) = SweepTally::default();
                if let Some(phase) = &self.phase {
                    phase.bar.disable_steady_tick();
                    phase.bar.set_style(sweep_style(&self.tally));
                    phase.bar.set_length(total);
                    phase.bar.set_position(0);
                }
            }
            Progress::TaskIncrement { amount } => {
                if let Some(phase) = &self.phase {
                    phase.bar.inc(amount);
                }
            }
            Progress::TaskFinish => {
                if let Some(phase) = &self.phase {
                    phase.bar.finish();
                }
            }
            Progress::Tally(tally) => {
                *self.tally.lock().unwrap_or_else(PoisonError::into_inner) = tally;
                if let Some(phase) = &self.phase {
                    phase.bar.tick();
                }
            }
            Progress::Message(msg) => self.print_line(format!("  {}", msg)),
        }
    }

    fn start_phase(&mut self, name: &'static str) {
        if let Some(previous) = self.phase.take() {
            previous.bar.finish_and_clear();
        }
        let bar = self.mp.add(ProgressBar::new_spinner());
        bar.set_style(phase_style());
        bar.set_message(name);
        bar.enable_steady_tick(Duration::from_millis(80));
        self.phase = Some(Phase { name, bar });
    }

    fn finish_phase(&mut self) {
        let Some(phase) = self.phase.take() else {
            return;
        };
        phase.bar.finish_and_clear();
        self.print_line(format!("✓ {}", phase.name));
    }

    /// Prints above the bars, or straight to stderr when the display is hidden.
    fn print_line(&self, line: String) {
        if self.mp.is_hidden() {
            eprintln!("{}", line);
        } else {
            self.mp.println(line).ok();
        }
    }
}

fn phase_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
}

/// Bar with one colored counter per combination outcome, read from `tally` on every
/// redraw. The claimed counter only appears once a combination was claimed elsewhere.
fn sweep_style(tally: &SharedTally) -> ProgressStyle {
    let counter = |read: fn(&SweepTally) -> usize, label: &'static str, always: bool| {
        let tally = Arc::clone(tally);
        move |_: &ProgressState, w: &mut dyn std::fmt::Write| {
            let tally = tally.lock().unwrap_or_else(PoisonError::into_inner);
            let count = read(&tally);
            if always || count > 0 {
                let _ = write!(w, "{} {}", count, label);
            }
        }
    };
    ProgressStyle::with_template(
        "{msg} [{bar:30.cyan/blue}] {pos}/{len}  {ok:.green}  {skipped:.yellow}  {claimed:.magenta}  {failed:.red}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .with_key("ok", counter(|t| t.succeeded, "ok", true))
    .with_key("skipped", counter(|t| t.skipped, "skipped", true))
    .with_key("claimed", counter(|t| t.claimed, "claimed", false))
    .with_key("failed", counter(|t| t.failed, "failed", true))
    .progress_chars("━╸ ")
}

/// Forwards engine progress events to the UI task without blocking the workers.
#[derive(Clone)]
pub struct CliProgressHandler {
    sender: mpsc::Sender<UiEvent>,
}

impl CliProgressHandler {
    pub fn new(sender: mpsc::Sender<UiEvent>) -> Self {
        Self { sender }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let sender = self.sender.clone();
        Box::new(move |progress: Progress| {
            if let Err(e) = sender.try_send(UiEvent::Progress(progress)) {
                warn!("Failed to send progress update to UI channel: {}", e);
            }
        })
    }
}
