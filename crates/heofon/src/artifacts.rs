//! Diagnostic artifacts captured at every page transition.
//!
//! | artifact    | folder        | file                                   |
//! |-------------|---------------|----------------------------------------|
//! | cookies     | `cookies`     | `HHMMSS_<label>.txt`                   |
//! | console log | `console`     | `HHMMSS_<label>.json`                  |
//! | web storage | `webstorage`  | `HHMMSS_<event>_local.json`, `_session.json` |
//! | screenshot  | `screenshots` | `<label>.png`                          |
//!
//! Artifact bodies are for humans reading a failed run; they are not meant to
//! be parsed back.

use crate::output::{FolderKind, TestCaseDirs};
use crate::pretty::plog;
use crate::result::{HeofonError, HeofonResult};
use crate::tab::{ConsoleEntry, Cookie, StorageSnapshot};
use chrono::Local;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Prefix format of timestamped artifact files
pub const ARTIFACT_TIME_FORMAT: &str = "%H%M%S";

/// Make a label safe to use as a file name
///
/// `/` becomes `-`, spaces become `_`, quotes are removed and an empty label
/// becomes `None`.
#[must_use]
pub fn path_proof_name(name: &str) -> String {
    if name.is_empty() {
        return "None".to_string();
    }
    name.replace('/', "-")
        .replace(' ', "_")
        .replace(['"', '\''], "")
}

/// Destination for captured diagnostics
pub trait ArtifactSink: Send + Sync + std::fmt::Debug {
    /// Persist a cookie snapshot
    ///
    /// # Errors
    ///
    /// Returns [`HeofonError::ArtifactWrite`] if the artifact cannot be stored.
    fn write_cookies(&self, cookies: &[Cookie], url: &str, label: &str) -> HeofonResult<PathBuf>;

    /// Persist the console history
    ///
    /// # Errors
    ///
    /// Returns [`HeofonError::ArtifactWrite`] if the artifact cannot be stored.
    fn write_console_log(
        &self,
        entries: &[ConsoleEntry],
        url: &str,
        label: &str,
    ) -> HeofonResult<PathBuf>;

    /// Persist local and session storage, returning both paths
    ///
    /// # Errors
    ///
    /// Returns [`HeofonError::ArtifactWrite`] if the artifact cannot be stored.
    fn write_web_storage(
        &self,
        snapshot: &StorageSnapshot,
        url: &str,
        page_name: &str,
        event: &str,
    ) -> HeofonResult<[PathBuf; 2]>;

    /// Persist a PNG screenshot
    ///
    /// # Errors
    ///
    /// Returns [`HeofonError::ArtifactWrite`] if the artifact cannot be stored.
    fn write_screenshot(&self, png: &[u8], label: &str) -> HeofonResult<PathBuf>;
}

/// Console artifact body: the page URL followed by the messages
#[must_use]
pub fn console_body(entries: &[ConsoleEntry], url: &str) -> Value {
    let mut items = Vec::with_capacity(entries.len() + 1);
    items.push(Value::String(format!("_page: {url}")));
    items.extend(entries.iter().map(|e| {
        let mut obj = Map::new();
        let _ = obj.insert("level".into(), Value::String(e.level.clone()));
        let _ = obj.insert("text".into(), Value::String(e.text.clone()));
        Value::Object(obj)
    }));
    Value::Array(items)
}

/// Web storage artifact body: the stored items plus capture metadata
#[must_use]
pub fn storage_body(
    items: &BTreeMap<String, String>,
    storage_type: &str,
    url: &str,
    page_name: &str,
    event: &str,
) -> Map<String, Value> {
    let mut body: Map<String, Value> = items
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    let _ = body.insert("_storage type".into(), storage_type.into());
    let _ = body.insert("_page".into(), url.into());
    let _ = body.insert("_page object name".into(), page_name.into());
    let _ = body.insert("_precipitating event".into(), event.into());
    body
}

/// File-backed sink writing into a test case's folders
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    dirs: TestCaseDirs,
}

impl ArtifactWriter {
    /// Create a writer for a test case
    #[must_use]
    pub const fn new(dirs: TestCaseDirs) -> Self {
        Self { dirs }
    }

    /// Folders this writer targets
    #[must_use]
    pub const fn dirs(&self) -> &TestCaseDirs {
        &self.dirs
    }

    fn stamped(label: &str) -> String {
        format!(
            "{}_{}",
            Local::now().format(ARTIFACT_TIME_FORMAT),
            path_proof_name(label)
        )
    }

    fn write(path: &Path, contents: &[u8], append: bool) -> HeofonResult<()> {
        let wrap = |source| HeofonError::ArtifactWrite {
            path: path.to_path_buf(),
            source,
        };
        if append {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(wrap)?;
            file.write_all(contents).map_err(wrap)
        } else {
            fs::write(path, contents).map_err(wrap)
        }
    }
}

impl ArtifactSink for ArtifactWriter {
    fn write_cookies(&self, cookies: &[Cookie], url: &str, label: &str) -> HeofonResult<PathBuf> {
        let path = self
            .dirs
            .folder(FolderKind::Cookies)?
            .join(format!("{}.txt", Self::stamped(label)));
        let body = format!("{url}\n{}", plog(cookies));
        Self::write(&path, body.as_bytes(), false)?;
        tracing::info!("saved cookies: {}", path.display());
        Ok(path)
    }

    fn write_console_log(
        &self,
        entries: &[ConsoleEntry],
        url: &str,
        label: &str,
    ) -> HeofonResult<PathBuf> {
        let path = self
            .dirs
            .folder(FolderKind::Console)?
            .join(format!("{}.json", Self::stamped(label)));
        let body = plog(&console_body(entries, url));
        Self::write(&path, body.as_bytes(), true)?;
        tracing::info!("saved console log: {}", path.display());
        Ok(path)
    }

    fn write_web_storage(
        &self,
        snapshot: &StorageSnapshot,
        url: &str,
        page_name: &str,
        event: &str,
    ) -> HeofonResult<[PathBuf; 2]> {
        let folder = self.dirs.folder(FolderKind::WebStorage)?;
        let base = Self::stamped(event);
        let write_one = |kind: &str, items: &BTreeMap<String, String>| -> HeofonResult<PathBuf> {
            let path = folder.join(format!("{base}_{kind}.json"));
            let body = plog(&storage_body(items, kind, url, page_name, event));
            Self::write(&path, body.as_bytes(), true)?;
            tracing::info!("saved {kind} storage log: {}", path.display());
            Ok(path)
        };
        Ok([
            write_one("local", &snapshot.local)?,
            write_one("session", &snapshot.session)?,
        ])
    }

    fn write_screenshot(&self, png: &[u8], label: &str) -> HeofonResult<PathBuf> {
        let path = self
            .dirs
            .folder(FolderKind::Screenshots)?
            .join(format!("{}.png", path_proof_name(label)));
        Self::write(&path, png, false)?;
        tracing::info!("saved screenshot: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BrowserKind;
    use crate::output::TestRun;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn writer(tmp: &TempDir) -> ArtifactWriter {
        let run = TestRun::start(tmp.path()).unwrap();
        ArtifactWriter::new(run.test_case("test_artifacts", BrowserKind::Chromium).unwrap())
    }

    mod path_proof_tests {
        use super::*;

        #[test]
        fn test_examples() {
            assert_eq!(
                path_proof_name("loaded page 'sweetshop home page'"),
                "loaded_page_sweetshop_home_page",
            );
            assert_eq!(path_proof_name("a/b \"c\""), "a-b_c");
            assert_eq!(path_proof_name(""), "None");
        }

        proptest! {
            #[test]
            fn prop_never_contains_unsafe_chars(name in ".*") {
                let clean = path_proof_name(&name);
                prop_assert!(!clean.contains('/'));
                prop_assert!(!clean.contains(' '));
                prop_assert!(!clean.contains('"'));
                prop_assert!(!clean.contains('\''));
            }

            #[test]
            fn prop_safe_names_unchanged(name in "[a-zA-Z0-9_.-]{1,32}") {
                prop_assert_eq!(path_proof_name(&name), name);
            }
        }
    }

    mod body_tests {
        use super::*;

        #[test]
        fn test_console_body_starts_with_page() {
            let body = console_body(&[ConsoleEntry::new("log", "hi")], "https://x.test/");
            assert_eq!(body[0], "_page: https://x.test/");
            assert_eq!(body[1]["text"], "hi");
        }

        #[test]
        fn test_storage_body_metadata() {
            let mut items = BTreeMap::new();
            let _ = items.insert("basket".to_string(), "[]".to_string());
            let body = storage_body(&items, "local", "https://x.test/", "home", "loaded");
            assert_eq!(body["basket"], "[]");
            assert_eq!(body["_storage type"], "local");
            assert_eq!(body["_page"], "https://x.test/");
            assert_eq!(body["_page object name"], "home");
            assert_eq!(body["_precipitating event"], "loaded");
        }
    }

    mod writer_tests {
        use super::*;

        #[test]
        fn test_cookie_file() {
            let tmp = TempDir::new().unwrap();
            let writer = writer(&tmp);
            let cookies = vec![Cookie::new("basket", "1", "sweetshop.vivrichards.co.uk")];
            let path = writer
                .write_cookies(
                    &cookies,
                    "https://sweetshop.vivrichards.co.uk/",
                    "sweetshop home page",
                )
                .unwrap();
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            assert!(name.ends_with("_sweetshop_home_page.txt"));
            assert_eq!(name.len(), "HHMMSS_sweetshop_home_page.txt".len());

            let text = fs::read_to_string(&path).unwrap();
            let (first, rest) = text.split_once('\n').unwrap();
            assert_eq!(first, "https://sweetshop.vivrichards.co.uk/");
            assert!(rest.contains("\"basket\""));
        }

        #[test]
        fn test_console_file() {
            let tmp = TempDir::new().unwrap();
            let writer = writer(&tmp);
            let path = writer
                .write_console_log(&[ConsoleEntry::new("warn", "slow")], "https://x.test/", "home")
                .unwrap();
            assert!(path.parent().unwrap().ends_with("console"));
            let parsed: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
            assert_eq!(parsed[0], "_page: https://x.test/");
        }

        #[test]
        fn test_storage_files() {
            let tmp = TempDir::new().unwrap();
            let writer = writer(&tmp);
            let mut snapshot = StorageSnapshot::default();
            let _ = snapshot.session.insert("token".into(), "abc".into());
            let [local, session] = writer
                .write_web_storage(
                    &snapshot,
                    "https://x.test/login",
                    "login page",
                    "loaded page 'login page'",
                )
                .unwrap();
            assert!(local.to_string_lossy().ends_with("_loaded_page_login_page_local.json"));
            assert!(session.to_string_lossy().ends_with("_loaded_page_login_page_session.json"));

            let body: Value = serde_json::from_str(&fs::read_to_string(session).unwrap()).unwrap();
            assert_eq!(body["token"], "abc");
            assert_eq!(body["_storage type"], "session");
            assert_eq!(body["_page object name"], "login page");
        }

        #[test]
        fn test_screenshot_file() {
            let tmp = TempDir::new().unwrap();
            let writer = writer(&tmp);
            let path = writer.write_screenshot(b"\x89PNG", "home loaded").unwrap();
            assert!(path.ends_with("screenshots/home_loaded.png"));
            assert_eq!(fs::read(path).unwrap(), b"\x89PNG");
        }

        #[test]
        fn test_unwritable_folder_is_artifact_error() {
            let tmp = TempDir::new().unwrap();
            let writer = writer(&tmp);
            fs::remove_dir_all(writer.dirs().folder(FolderKind::Screenshots).unwrap()).unwrap();
            let err = writer.write_screenshot(b"png", "gone").unwrap_err();
            assert!(matches!(err, HeofonError::ArtifactWrite { .. }));
        }
    }
}
