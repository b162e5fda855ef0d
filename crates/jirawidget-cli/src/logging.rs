//! Logging setup: warnings to stderr, everything at debug to a log file

use std::fs;
use std::path::PathBuf;

use jirawidget_core::storage::init_data_dir;
use tracing_subscriber::fmt::writer::MakeWriterExt;

pub const LOG_FILE: &str = "jirawidget.log";

/// Install the global subscriber. `level` is an `EnvFilter` directive such
/// as `info` or `jirawidget_jira=debug`.
///
/// Returns the log file path for display.
pub fn init(level: &str) -> anyhow::Result<PathBuf> {
    let data_dir = init_data_dir()?;
    let log_file_path = data_dir.join(LOG_FILE);

    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;

    let stderr_writer = std::io::stderr.with_max_level(tracing::Level::WARN);
    let file_writer = log_file.with_max_level(tracing::Level::DEBUG);

    tracing_subscriber::fmt()
        .with_writer(stderr_writer.and(file_writer))
        .with_env_filter(level)
        .with_ansi(false) // No color codes in log file
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("Log file: {}", log_file_path.display());
    Ok(log_file_path)
}
