// Logging - tracing subscriber writing to a daily rolling file
//
// The terminal belongs to the UI, so nothing is ever logged to stdout/stderr.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const LOG_FILE_PREFIX: &str = "todo-manager.log";

/// Keeps the background writer alive. Logs are flushed when it is dropped.
pub struct LoggingGuard {
    _guard: WorkerGuard,
}

/// Installs the global subscriber. `RUST_LOG` takes precedence over
/// `default_filter`.
pub fn init_logging(log_dir: &Path, default_filter: &str) -> anyhow::Result<LoggingGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false),
    );

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(target: "system", log_dir = %log_dir.display(), "Logging initialized");

    Ok(LoggingGuard { _guard: guard })
}
