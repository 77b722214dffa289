//! Process-wide logging, installed once at startup
//!
//! Every line goes to stdout and, when configured, to an append-only log
//! file: timestamp, level, target (the component) and message.

use std::fs::OpenOptions;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::infrastructure::config::LoggingConfig;

/// Flushes the file writer when dropped. Hold it for the life of the process.
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber. Later calls leave the first one in place.
pub fn init(config: &LoggingConfig) -> LogGuard {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let mut file_guard = None;
    let file_layer = config.file.as_ref().and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                let (writer, guard) = tracing_appender::non_blocking(file);
                file_guard = Some(guard);
                Some(fmt::layer().with_ansi(false).with_writer(writer))
            }
            Err(e) => {
                // no subscriber yet
                eprintln!("Failed to open log file {}: {}", path.display(), e);
                None
            }
        }
    });

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init();

    if installed.is_err() {
        tracing::debug!("Logging already initialized");
        return LogGuard { _file: None };
    }

    LogGuard { _file: file_guard }
}
