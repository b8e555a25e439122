use crate::artifacts::{path_proof_name, ArtifactSink};
use crate::result::{HeofonError, HeofonResult};
use crate::tab::{ConsoleEntry, Cookie, StorageSnapshot};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

/// One call received by a [`RecordingSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capture {
    /// Cookie snapshot
    Cookies {
        /// Label
        label: String,
        /// Page URL
        url: String,
        /// Number of cookies
        count: usize,
    },
    /// Console history
    ConsoleLog {
        /// Label
        label: String,
        /// Page URL
        url: String,
        /// Number of messages
        count: usize,
    },
    /// Web storage snapshot
    WebStorage {
        /// Page object name
        page: String,
        /// Precipitating event
        event: String,
        /// Page URL
        url: String,
        /// Captured storage
        snapshot: StorageSnapshot,
    },
    /// Screenshot
    Screenshot {
        /// Label
        label: String,
    },
}

/// Artifact sink that keeps captures in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    captures: Mutex<Vec<Capture>>,
}

impl RecordingSink {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> HeofonResult<MutexGuard<'_, Vec<Capture>>> {
        self.captures
            .lock()
            .map_err(|_| HeofonError::browser("recording sink poisoned"))
    }

    fn record(&self, capture: Capture, path: String) -> HeofonResult<PathBuf> {
        self.lock()?.push(capture);
        Ok(PathBuf::from(path))
    }

    /// Everything captured so far
    #[must_use]
    pub fn captures(&self) -> Vec<Capture> {
        self.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of cookie captures, one per capture cycle
    #[must_use]
    pub fn cookie_captures(&self) -> usize {
        self.captures()
            .iter()
            .filter(|c| matches!(c, Capture::Cookies { .. }))
            .count()
    }

    /// Labels of all screenshots
    #[must_use]
    pub fn screenshots(&self) -> Vec<String> {
        self.captures()
            .into_iter()
            .filter_map(|c| match c {
                Capture::Screenshot { label } => Some(label),
                _ => None,
            })
            .collect()
    }
}

impl ArtifactSink for RecordingSink {
    fn write_cookies(&self, cookies: &[Cookie], url: &str, label: &str) -> HeofonResult<PathBuf> {
        self.record(
            Capture::Cookies {
                label: label.to_string(),
                url: url.to_string(),
                count: cookies.len(),
            },
            format!("cookies/{}.txt", path_proof_name(label)),
        )
    }

    fn write_console_log(
        &self,
        entries: &[ConsoleEntry],
        url: &str,
        label: &str,
    ) -> HeofonResult<PathBuf> {
        self.record(
            Capture::ConsoleLog {
                label: label.to_string(),
                url: url.to_string(),
                count: entries.len(),
            },
            format!("console/{}.json", path_proof_name(label)),
        )
    }

    fn write_web_storage(
        &self,
        snapshot: &StorageSnapshot,
        url: &str,
        page_name: &str,
        event: &str,
    ) -> HeofonResult<[PathBuf; 2]> {
        let base = format!("webstorage/{}", path_proof_name(event));
        self.lock()?.push(Capture::WebStorage {
            page: page_name.to_string(),
            event: event.to_string(),
            url: url.to_string(),
            snapshot: snapshot.clone(),
        });
        Ok([
            PathBuf::from(format!("{base}_local.json")),
            PathBuf::from(format!("{base}_session.json")),
        ])
    }

    fn write_screenshot(&self, _png: &[u8], label: &str) -> HeofonResult<PathBuf> {
        self.record(
            Capture::Screenshot {
                label: label.to_string(),
            },
            format!("screenshots/{}.png", path_proof_name(label)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let sink = RecordingSink::new();
        let _ = sink.write_cookies(&[], "https://x.test/", "home").unwrap();
        let _ = sink.write_screenshot(b"png", "home loaded").unwrap();
        let [local, _] = sink
            .write_web_storage(
                &StorageSnapshot::default(),
                "https://x.test/",
                "home",
                "loaded page 'home'",
            )
            .unwrap();
        assert_eq!(local, PathBuf::from("webstorage/loaded_page_home_local.json"));
        assert_eq!(sink.captures().len(), 3);
        assert_eq!(sink.cookie_captures(), 1);
        assert_eq!(sink.screenshots(), vec!["home loaded".to_string()]);
    }
}
