//! Tracing setup. The terminal belongs to the UI, so events go to a log file
//! inside the data directory instead of stdout.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the tracing filter directives.
pub const LOG_FILTER_ENV: &str = "LEAGUE_MANAGER_LOG";
const LOG_FILE_NAME: &str = "league-manager.log";
const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber, appending to `<dir>/league-manager.log`.
/// Returns the log file path so the caller can mention it on fatal errors.
pub fn init_tracing(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).context("failed to create log directory")?;
    let path = dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let env_filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| DEFAULT_FILTER.into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(path)
}
