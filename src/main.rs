// Todo Manager - A TUI todo list with priorities, due dates and filters
// Entry point for the application

mod app;
mod config;
mod error;
mod event;
mod logging;
mod models;
mod storage;
mod ui;

use crate::config::AppConfig;
use crate::storage::{FsBlobStore, TaskStore};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;

fn main() -> anyhow::Result<()> {
    // A broken config file shouldn't keep anyone from their tasks.
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };

    // Same for logging: without a log file the app still works.
    let (_logging, logging_error) =
        match logging::init_logging(&config.log_dir(), &config.log_filter) {
            Ok(guard) => (Some(guard), None),
            Err(err) => (None, Some(err)),
        };
    if let Some(err) = config_error {
        tracing::warn!(target: "system", error = %err, "Using default configuration");
    }

    let blobs = FsBlobStore::new(config.resolved_data_dir(), config.atomic_writes);
    tracing::info!(target: "system", data_dir = %blobs.root().display(), "Starting");

    // Load before anything can be changed, so the empty startup list never
    // reaches disk.
    let mut app = app::App::new(TaskStore::new(Box::new(blobs)), &config);
    app.load();
    if let Some(err) = logging_error {
        app.warn(format!("Logging is off: {err}"));
    }

    // Initialize the terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal);

    // Cleanup and restore terminal on exit
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(target: "system", error = %err, "Exited with error");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
