//! Session logger: routes `tracing` output to a file in the OS data directory
//! and to stderr.
//!
//! The file is **truncated at each session**, so it only ever contains output
//! from the most recent run.
//!
//! Log location:
//!   Windows:  `%APPDATA%\PaintFE\paintfe-core.log`
//!   Linux:    `$XDG_DATA_HOME/PaintFE/paintfe-core.log` or `~/.local/share/PaintFE/paintfe-core.log`
//!   macOS:    `~/Library/Application Support/PaintFE/paintfe-core.log`
//!
//! The library never installs a subscriber by itself; host applications call
//! [`init`] once and keep the returned guard alive.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "paintfe-core.log";

static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Returns the path to the current session log file.
pub fn log_path() -> Option<&'static PathBuf> {
    LOG_PATH.get()
}

/// Install the global subscriber. Returns the file writer's guard, which
/// must outlive all logging. Later calls do nothing and return `None`.
pub fn init() -> Option<WorkerGuard> {
    if LOG_PATH.get().is_some() {
        return None;
    }
    let dir = data_dir().join("PaintFE");
    let path = dir.join(LOG_FILE_NAME);
    if let Err(e) = truncate(&dir, &path) {
        // Can't open log file; not fatal, just skip
        eprintln!("[logger] Failed to open log file {:?}: {}", path, e);
        return None;
    }

    let file_appender = tracing_appender::rolling::never(&dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,paintfe_core=debug"));

    if tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .is_err()
    {
        eprintln!("[logger] A global subscriber is already installed");
        return None;
    }
    let _ = LOG_PATH.set(path.clone());
    tracing::info!(path = %path.display(), "session log started");
    Some(guard)
}

/// Create the directory and empty the previous session's file.
fn truncate(dir: &Path, path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    OpenOptions::new().create(true).write(true).truncate(true).open(path)?;
    Ok(())
}

/// Platform data directory (without the app sub-folder).
fn data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata);
        }
    }
    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join("Library").join("Application Support");
        }
    }
    // Linux / fallback
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    // Last resort: current working directory
    PathBuf::from(".")
}
