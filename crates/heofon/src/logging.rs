//! Log setup: the run log for the whole process and a log file per test case.
//!
//! The filter comes from `RUST_LOG` and falls back to `info`. While a
//! [`TestCaseLog`] guard is alive, events emitted on the current thread go to
//! the test case's `testlog.txt` instead of the run log; dropping the guard
//! switches back.

use crate::result::{HeofonError, HeofonResult};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn open_log(path: &Path) -> HeofonResult<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| HeofonError::ArtifactWrite {
            path: path.to_path_buf(),
            source,
        })
}

/// Install the process-wide subscriber: the run log and/or stderr
///
/// Returns `false` when a global subscriber was already installed, which is
/// the normal case when several tests in one binary call this.
///
/// # Errors
///
/// Returns [`HeofonError::ArtifactWrite`] if the run log cannot be opened.
pub fn init_run_logging(run_log: Option<&Path>, console: bool) -> HeofonResult<bool> {
    let file_layer = match run_log {
        Some(path) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(open_log(path)?)),
        ),
        None => None,
    };

    let installed = tracing_subscriber::registry()
        .with(env_filter())
        .with(console.then(|| fmt::layer().with_writer(std::io::stderr)))
        .with(file_layer)
        .try_init()
        .is_ok();
    if installed {
        tracing::info!("heofon v{}", env!("CARGO_PKG_VERSION"));
    }
    Ok(installed)
}

/// Redirects the current thread's events to a test case log while alive
#[derive(Debug)]
pub struct TestCaseLog {
    path: PathBuf,
    _guard: DefaultGuard,
}

impl TestCaseLog {
    /// Start logging to `path` (appending)
    ///
    /// # Errors
    ///
    /// Returns [`HeofonError::ArtifactWrite`] if the file cannot be opened.
    pub fn start(path: &Path) -> HeofonResult<Self> {
        tracing::warn!("changing log output path to {}", path.display());
        let subscriber = fmt()
            .with_env_filter(env_filter())
            .with_ansi(false)
            .with_writer(Mutex::new(open_log(path)?))
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        tracing::info!("test case logged to {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            _guard: guard,
        })
    }

    /// File this guard writes to
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_case_log_receives_events() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("testlog.txt");
        {
            let log = TestCaseLog::start(&path).unwrap();
            assert_eq!(log.path(), path);
            tracing::warn!("navigating to Sweets page");
        }
        tracing::warn!("after the guard");
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("navigating to Sweets page"));
        assert!(!text.contains("after the guard"));
    }

    #[test]
    fn test_run_log_opened_before_install() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("runlog.txt");
        if init_run_logging(Some(&path), false).unwrap() {
            tracing::warn!("run started");
            let text = std::fs::read_to_string(&path).unwrap();
            assert!(text.contains("run started"));
        }
        assert!(path.exists());
    }

    #[test]
    fn test_unopenable_log_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = TestCaseLog::start(&tmp.path().join("missing").join("testlog.txt")).unwrap_err();
        assert!(matches!(err, HeofonError::ArtifactWrite { .. }));
    }
}
