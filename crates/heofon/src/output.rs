//! Output layout for a test run.
//!
//! ```text
//! output/
//!   └── 261018-142501/            run folder, one per process
//!       ├── runlog.txt
//!       ├── 1_linear_navigation/  one per test case, numbered in start order
//!       │   ├── testlog.txt
//!       │   ├── cookies/
//!       │   ├── screenshots/
//!       │   ├── webstorage/
//!       │   └── console/          devtools browsers only
//!       └── 2_dynamic_navigation[scenario01]/
//! ```
//!
//! Everything a test writes goes below its own case folder, so tests that
//! each own a tab can run concurrently.

use crate::config::BrowserKind;
use crate::result::{HeofonError, HeofonResult};
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Run folder name format
pub const RUN_TIMESTAMP_FORMAT: &str = "%y%m%d-%H%M%S";

/// Log file of the run folder
pub const RUN_LOG_FILE: &str = "runlog.txt";

/// Log file of each test case folder
pub const TEST_CASE_LOG_FILE: &str = "testlog.txt";

/// Kinds of per-test-case sub-folders
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FolderKind {
    /// Third-party integration output
    Integrations,
    /// Browser downloads
    Downloads,
    /// Browser driver logs
    Driver,
    /// Cookie snapshots
    Cookies,
    /// Screenshots
    Screenshots,
    /// Accessibility reports
    Accessibility,
    /// Local and session storage snapshots
    WebStorage,
    /// Network captures (devtools only)
    Network,
    /// Console logs (devtools only)
    Console,
    /// Performance metrics (devtools only)
    Metrics,
}

impl FolderKind {
    /// Folders every test case gets
    pub const BASE: [Self; 7] = [
        Self::Integrations,
        Self::Downloads,
        Self::Driver,
        Self::Cookies,
        Self::Screenshots,
        Self::Accessibility,
        Self::WebStorage,
    ];

    /// Folders added when the browser supports devtools
    pub const DEVTOOLS: [Self; 3] = [Self::Network, Self::Console, Self::Metrics];

    /// Folder name on disk
    #[must_use]
    pub const fn dir_name(&self) -> &'static str {
        match self {
            Self::Integrations => "integrations",
            Self::Downloads => "downloads",
            Self::Driver => "driver",
            Self::Cookies => "cookies",
            Self::Screenshots => "screenshots",
            Self::Accessibility => "accessibility",
            Self::WebStorage => "webstorage",
            Self::Network => "network",
            Self::Console => "console",
            Self::Metrics => "metrics",
        }
    }

    /// Folders a test case gets for the given browser
    #[must_use]
    pub fn for_browser(browser: BrowserKind) -> Vec<Self> {
        let mut kinds = Self::BASE.to_vec();
        if browser.devtools_supported() {
            kinds.extend(Self::DEVTOOLS);
        }
        kinds
    }
}

impl fmt::Display for FolderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

fn create_dir(path: &Path) -> HeofonResult<()> {
    fs::create_dir_all(path).map_err(|source| HeofonError::ArtifactWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// A timestamped run folder
#[derive(Debug)]
pub struct TestRun {
    dir: PathBuf,
    next_case: AtomicUsize,
}

impl TestRun {
    /// Create `<root>/<%y%m%d-%H%M%S>/`
    ///
    /// # Errors
    ///
    /// Returns [`HeofonError::ArtifactWrite`] if the folder cannot be created.
    pub fn create(root: &Path, started: DateTime<Local>) -> HeofonResult<Self> {
        let dir = root.join(started.format(RUN_TIMESTAMP_FORMAT).to_string());
        create_dir(&dir)?;
        tracing::info!("test run output folder: {}", dir.display());
        Ok(Self {
            dir,
            next_case: AtomicUsize::new(1),
        })
    }

    /// Create a run folder stamped with the current local time
    ///
    /// # Errors
    ///
    /// Returns [`HeofonError::ArtifactWrite`] if the folder cannot be created.
    pub fn start(root: &Path) -> HeofonResult<Self> {
        Self::create(root, Local::now())
    }

    /// Run folder
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the run log
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.dir.join(RUN_LOG_FILE)
    }

    /// Create the numbered folder of a test case and its sub-folders
    ///
    /// A leading `test_` is dropped from the name, so `test_linear_navigation`
    /// becomes `<n>_linear_navigation`.
    ///
    /// # Errors
    ///
    /// Returns [`HeofonError::ArtifactWrite`] if a folder cannot be created.
    pub fn test_case(&self, test_name: &str, browser: BrowserKind) -> HeofonResult<TestCaseDirs> {
        let number = self.next_case.fetch_add(1, Ordering::SeqCst);
        let short_name = test_name.strip_prefix("test_").unwrap_or(test_name);
        let root = self.dir.join(format!("{number}_{short_name}"));
        create_dir(&root)?;

        let mut folders = BTreeMap::new();
        for kind in FolderKind::for_browser(browser) {
            let path = root.join(kind.dir_name());
            create_dir(&path)?;
            let _ = folders.insert(kind, path);
        }
        tracing::info!("test case {test_name} writes to {}", root.display());

        Ok(TestCaseDirs { root, folders })
    }
}

/// Folders of one test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCaseDirs {
    root: PathBuf,
    folders: BTreeMap<FolderKind, PathBuf>,
}

impl TestCaseDirs {
    /// Test case folder
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the test case log
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.root.join(TEST_CASE_LOG_FILE)
    }

    /// Sub-folder of a kind
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the folder was not created for this
    /// test case, e.g. `console` for a browser without devtools.
    pub fn folder(&self, kind: FolderKind) -> HeofonResult<&Path> {
        self.folders.get(&kind).map(PathBuf::as_path).ok_or_else(|| {
            HeofonError::config(format!(
                "test case {} has no '{kind}' folder",
                self.root.display()
            ))
        })
    }

    /// Check whether a sub-folder exists for this test case
    #[must_use]
    pub fn has(&self, kind: FolderKind) -> bool {
        self.folders.contains_key(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn started() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 18, 14, 25, 1).unwrap()
    }

    #[test]
    fn test_run_folder_name() {
        let tmp = TempDir::new().unwrap();
        let run = TestRun::create(tmp.path(), started()).unwrap();
        assert_eq!(run.dir(), tmp.path().join("261018-142501"));
        assert!(run.dir().is_dir());
        assert_eq!(run.log_path(), run.dir().join("runlog.txt"));
    }

    #[test]
    fn test_cases_are_numbered_in_order() {
        let tmp = TempDir::new().unwrap();
        let run = TestRun::create(tmp.path(), started()).unwrap();
        let first = run.test_case("test_linear_navigation", BrowserKind::Chromium).unwrap();
        let second = run
            .test_case("test_dynamic_navigation[scenario01]", BrowserKind::Chromium)
            .unwrap();
        assert!(first.root().ends_with("1_linear_navigation"));
        assert!(second.root().ends_with("2_dynamic_navigation[scenario01]"));
        assert_eq!(first.log_path(), first.root().join("testlog.txt"));
    }

    #[test]
    fn test_name_without_prefix_is_kept() {
        let tmp = TempDir::new().unwrap();
        let run = TestRun::create(tmp.path(), started()).unwrap();
        let case = run.test_case("smoke", BrowserKind::Chromium).unwrap();
        assert!(case.root().ends_with("1_smoke"));
    }

    #[test]
    fn test_sub_folders_created() {
        let tmp = TempDir::new().unwrap();
        let run = TestRun::create(tmp.path(), started()).unwrap();
        let case = run.test_case("test_folders", BrowserKind::HeadlessChromium).unwrap();
        for kind in FolderKind::BASE.iter().chain(FolderKind::DEVTOOLS.iter()) {
            let path = case.folder(*kind).unwrap();
            assert!(path.is_dir(), "{kind}");
            assert_eq!(path.file_name().unwrap(), kind.dir_name());
        }
    }

    #[test]
    fn test_missing_folder_is_configuration_error() {
        let dirs = TestCaseDirs {
            root: PathBuf::from("/nowhere/1_x"),
            folders: BTreeMap::new(),
        };
        assert!(!dirs.has(FolderKind::Console));
        let err = dirs.folder(FolderKind::Console).unwrap_err();
        assert!(matches!(err, HeofonError::Configuration { .. }));
    }
}
