//! Tracing subscriber setup.
//!
//! The terminal is owned by the UI while the app runs, and anything written
//! to stderr lands on top of the table. Logs therefore go to a file
//! (`--log-file`, INFO by default) or are off. `RUST_LOG` overrides the
//! default level in both cases, for use with stderr redirected.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Level used when `RUST_LOG` is unset.
pub const fn default_level(log_file: Option<&Path>) -> LevelFilter {
    if log_file.is_some() {
        LevelFilter::INFO
    } else {
        LevelFilter::OFF
    }
}

fn env_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails if the log file cannot be opened or a subscriber is already set.
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let filter = env_filter(default_level(log_file));
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
                .map_err(|err| anyhow!(err))?;
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|err| anyhow!(err))?;
        }
    }
    tracing::debug!(log_file = ?log_file, "logging initialised");
    Ok(())
}
