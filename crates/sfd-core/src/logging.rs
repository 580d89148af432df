//! Logging setup.
//!
//! Progress bars own the terminal while a batch runs, so events normally go
//! to `$XDG_STATE_HOME/sfd/sfd.log`. When that file can't be opened the CLI
//! falls back to stderr, filtered to warnings unless `RUST_LOG` says otherwise.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const FILE_FILTER: &str = "info,sfd=debug,sfd_core=debug";
const STDERR_FILTER: &str = "warn";

/// Where the log file lives for this user.
pub fn log_file_path() -> Result<PathBuf> {
    let dirs = xdg::BaseDirectories::with_prefix("sfd").context("resolve XDG state dir")?;
    Ok(dirs.get_state_home().join("sfd.log"))
}

/// Opens `path` for appending, creating missing parent directories.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// `spec` when it parses as a filter, else `fallback`.
fn filter_from(spec: Option<&str>, fallback: &str) -> EnvFilter {
    spec.and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback))
}

fn env_filter_or(fallback: &str) -> EnvFilter {
    let spec = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    filter_from(spec.as_deref(), fallback)
}

/// Installs the file subscriber and returns the log path. Errors leave no
/// subscriber installed, so the caller can still use `init_logging_stderr`.
pub fn init_logging() -> Result<PathBuf> {
    let path = log_file_path()?;
    let file = open_log_file(&path).with_context(|| format!("open {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter_or(FILE_FILTER))
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install subscriber: {}", e))?;

    tracing::info!("sfd logging initialized at {}", path.display());
    Ok(path)
}

/// Stderr-only logging. A second call is a no-op.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter_or(STDERR_FILTER))
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}
