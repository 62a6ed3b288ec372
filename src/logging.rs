//! Logging for the command line.
//!
//! stdout carries the JSON result of a command, so diagnostics never go there.
//! Every run appends to a daily-rotated file; `-v` additionally mirrors events
//! to stderr and raises the level.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

const LOG_FILE_PREFIX: &str = "jira-connector.log";

/// The filter used when `RUST_LOG` is unset, by `-v` count.
fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "jira_connector=info,warn",
        1 => "jira_connector=debug,warn",
        _ => "jira_connector=trace,info",
    }
}

/// Install the global subscriber and return the log directory.
///
/// `RUST_LOG` overrides the level chosen from `verbose`. Tokens and secrets
/// are never recorded by this crate at any level.
///
/// # Errors
///
/// Fails if the local data directory is unknown, the log directory cannot be
/// created, or a global subscriber is already set.
pub fn init(verbose: u8) -> anyhow::Result<PathBuf> {
    let log_dir = log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_layer = fmt::layer()
        .with_writer(RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let stderr_layer = (verbose > 0).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
    });

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(file_layer)
            .with(stderr_layer)
            .with(filter),
    )?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), verbose, "jira-connector starting up");
    Ok(log_dir)
}

/// `<local data dir>/jira-connector/logs`.
fn log_directory() -> anyhow::Result<PathBuf> {
    let base_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(base_dir.join("jira-connector").join("logs"))
}
