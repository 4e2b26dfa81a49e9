use crate::error::{CliError, Result};
use crate::ui::UiEvent;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, MakeWriter},
    prelude::*,
};

/// Routes formatted console log lines through the UI so they do not tear progress bars.
#[derive(Clone)]
struct UiLogWriter {
    sender: mpsc::Sender<UiEvent>,
}

impl Write for UiLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let line = String::from_utf8_lossy(buf).trim_end().to_string();
        if !line.is_empty() && self.sender.try_send(UiEvent::Log(line)).is_err() {
            io::stderr().write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for UiLogWriter {
    type Writer = UiLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

pub fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::OFF
    } else {
        match verbosity {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

pub fn setup_logging(
    verbosity: u8,
    quiet: bool,
    log_file: &Option<PathBuf>,
    ui_sender: mpsc::Sender<UiEvent>,
) -> Result<()> {
    let console_layer = fmt::layer()
        .with_writer(UiLogWriter { sender: ui_sender })
        .with_ansi(true)
        .with_target(false)
        .compact()
        .with_filter(level_filter(verbosity, quiet));

    let subscriber = tracing_subscriber::registry().with(console_layer);

    if let Some(path) = log_file {
        let file = File::create(path).map_err(CliError::Io)?;

        // The file records at least INFO, even with a quiet console.
        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_thread_ids(true)
            .with_target(true)
            .with_filter(level_filter(verbosity, false).max(LevelFilter::INFO));

        subscriber.with(file_layer).try_init()
    } else {
        subscriber.try_init()
    }
    .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to install logger: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::Once;
    use std::thread;
    use std::time::Duration;
    use tracing::{debug, error, info, trace, warn};

    static INIT: Once = Once::new();

    fn ensure_global_logger_is_set() {
        INIT.call_once(|| {
            let (sender, receiver) = mpsc::channel(64);
            std::mem::forget(receiver);
            setup_logging(3, false, &None, sender).expect("Failed to set up global logger for tests");
        });
    }

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_filter(0, false), LevelFilter::WARN);
        assert_eq!(level_filter(1, false), LevelFilter::INFO);
        assert_eq!(level_filter(2, false), LevelFilter::DEBUG);
        assert_eq!(level_filter(7, false), LevelFilter::TRACE);
        assert_eq!(level_filter(3, true), LevelFilter::OFF);
    }

    #[test]
    #[serial]
    fn initialization_and_macros_work() {
        ensure_global_logger_is_set();

        error!("This is an error");
        warn!("This is a warning");
        info!("This is info");
        debug!("This is debug");
        trace!("This is trace");
    }

    #[test]
    #[serial]
    fn console_lines_are_forwarded_to_ui() {
        let (sender, mut receiver) = mpsc::channel(8);
        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_writer(UiLogWriter { sender })
                .with_ansi(false)
                .compact(),
        );

        tracing::subscriber::with_default(subscriber, || {
            warn!("Packing 1Li_1chloride_water failed");
        });

        match receiver.try_recv() {
            Ok(UiEvent::Log(line)) => {
                assert!(line.contains("Packing 1Li_1chloride_water failed"));
                assert!(!line.ends_with('\n'));
            }
            other => panic!("expected a log event, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn file_logging_can_be_added_to_global_logger() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("test.log");

        let file = File::create(log_path.clone()).unwrap();
        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_thread_ids(true);
        let subscriber = tracing_subscriber::registry().with(file_layer);

        tracing::subscriber::with_default(subscriber, || {
            debug!("Message for file-only test.");
        });

        thread::sleep(Duration::from_millis(100));

        let content = std::fs::read_to_string(log_path).unwrap();
        assert!(content.contains("Message for file-only test."));
        assert!(content.contains("DEBUG"));
        assert!(content.contains("ThreadId"));
    }

    #[test]
    #[serial]
    fn invalid_log_file_path_propagates_error() {
        let invalid_path = PathBuf::from("/");

        if cfg!(unix) && invalid_path.is_dir() {
            let (sender, _receiver) = mpsc::channel(1);
            let result = setup_logging(0, false, &Some(invalid_path), sender);
            assert!(matches!(result, Err(CliError::Io(_))));
        }
    }
}
