//! BrowserTab - the narrow capability set page objects need from a browser.
//!
//! Page objects never talk to a browser binding directly. Everything goes
//! through [`BrowserTab`], which keeps the transition engine independent of the
//! automation backend:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  BrowserTab (async trait, one shared handle per test)        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌────────────────────┐          ┌────────────────────────┐  │
//! │  │  ChromiumTab       │          │  MockTab               │  │
//! │  │  (feature=browser) │          │  (scripted site)       │  │
//! │  │  chromiumoxide CDP │          │  unit + scenario tests │  │
//! │  └────────────────────┘          └────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use crate::locator::Selector;
use crate::result::HeofonResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Shared handle to the single tab a test drives
pub type SharedTab = Arc<dyn BrowserTab>;

/// Reads `console.history`, populated by the console shim
pub const CONSOLE_HISTORY_SCRIPT: &str = "(() => {
    if (console.history) {
        return console.history.map(msg => ({ level: msg.level, text: msg.args.join(' ') }));
    }
    return [];
})()";

/// Installs `console.history` so console output can be read back later
pub const CONSOLE_SHIM_SCRIPT: &str = "(() => {
    if (console.history) { return; }
    console.history = [];
    for (const level of ['log', 'info', 'warn', 'error', 'debug']) {
        const original = console[level].bind(console);
        console[level] = (...args) => {
            console.history.push({ level, args: args.map(a => String(a)) });
            original(...args);
        };
    }
})()";

/// Collects `window.localStorage` into a plain object
pub const LOCAL_STORAGE_SCRIPT: &str = "(() => {
    const items = {};
    for (let i = 0; i < window.localStorage.length; i++) {
        const key = window.localStorage.key(i);
        items[key] = window.localStorage.getItem(key);
    }
    return items;
})()";

/// Collects `window.sessionStorage` into a plain object
pub const SESSION_STORAGE_SCRIPT: &str = "(() => {
    const items = {};
    for (let i = 0; i < window.sessionStorage.length; i++) {
        const key = window.sessionStorage.key(i);
        items[key] = window.sessionStorage.getItem(key);
    }
    return items;
})()";

/// Async capability trait for a browser tab
///
/// Implementations use interior mutability: every method takes `&self` so a
/// single `Arc<dyn BrowserTab>` can be shared by the whole page-object chain.
#[async_trait]
pub trait BrowserTab: Send + Sync + std::fmt::Debug {
    /// Navigate to URL
    async fn navigate(&self, url: &str) -> HeofonResult<()>;

    /// Click the first element matching the selector
    async fn click(&self, selector: &Selector) -> HeofonResult<()>;

    /// Move the pointer over the first element matching the selector
    async fn hover(&self, selector: &Selector) -> HeofonResult<()>;

    /// Replace the value of the first input matching the selector
    async fn type_text(&self, selector: &Selector, text: &str) -> HeofonResult<()>;

    /// Execute JavaScript in page context
    async fn evaluate(&self, script: &str) -> HeofonResult<Value>;

    /// Full-page screenshot as PNG bytes
    async fn screenshot(&self) -> HeofonResult<Vec<u8>>;

    /// Cookies visible to the tab's context
    async fn cookies(&self) -> HeofonResult<Vec<Cookie>>;

    /// Get current URL
    async fn current_url(&self) -> HeofonResult<String>;

    /// Document title
    async fn title(&self) -> HeofonResult<String>;

    /// Console history of the current document
    async fn console_log(&self) -> HeofonResult<Vec<ConsoleEntry>> {
        let raw = self.evaluate(CONSOLE_HISTORY_SCRIPT).await?;
        Ok(ConsoleEntry::from_value(&raw))
    }

    /// `localStorage` of the current document
    async fn local_storage(&self) -> HeofonResult<BTreeMap<String, String>> {
        let raw = self.evaluate(LOCAL_STORAGE_SCRIPT).await?;
        Ok(storage_from_value(&raw, "local"))
    }

    /// `sessionStorage` of the current document
    async fn session_storage(&self) -> HeofonResult<BTreeMap<String, String>> {
        let raw = self.evaluate(SESSION_STORAGE_SCRIPT).await?;
        Ok(storage_from_value(&raw, "session"))
    }

    /// Both web storages at once
    async fn web_storage(&self) -> HeofonResult<StorageSnapshot> {
        Ok(StorageSnapshot {
            local: self.local_storage().await?,
            session: self.session_storage().await?,
        })
    }
}

/// A browser cookie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Domain
    pub domain: String,
    /// Path
    pub path: String,
    /// Expiration timestamp (seconds since epoch)
    pub expires: Option<i64>,
    /// HTTP only flag
    pub http_only: bool,
    /// Secure flag
    pub secure: bool,
    /// Same site setting
    pub same_site: Option<SameSite>,
}

impl Cookie {
    /// Create a new cookie
    #[must_use]
    pub fn new(name: &str, value: &str, domain: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            domain: domain.to_string(),
            path: "/".to_string(),
            expires: None,
            http_only: false,
            secure: false,
            same_site: None,
        }
    }

    /// Set path
    #[must_use]
    pub fn with_path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Set expiration
    #[must_use]
    pub const fn with_expires(mut self, expires: i64) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Set secure
    #[must_use]
    pub const fn secure(mut self) -> Self {
        self.secure = true;
        self
    }
}

/// Same site cookie setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    /// Strict same site
    Strict,
    /// Lax same site
    Lax,
    /// No same site restriction
    None,
}

/// One console message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleEntry {
    /// Console level (log, warn, error, ...)
    pub level: String,
    /// Joined message arguments
    pub text: String,
}

impl ConsoleEntry {
    /// Create a console entry
    #[must_use]
    pub fn new(level: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            text: text.into(),
        }
    }

    /// Lenient conversion of the console history script result
    #[must_use]
    pub fn from_value(raw: &Value) -> Vec<Self> {
        let Some(items) = raw.as_array() else {
            if !raw.is_null() {
                tracing::warn!("console history is not a list; ignoring {raw}");
            }
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| {
                let level = item.get("level").and_then(Value::as_str);
                let text = item.get("text").and_then(Value::as_str);
                match (level, text) {
                    (Some(level), Some(text)) => Some(Self::new(level, text)),
                    _ => {
                        tracing::warn!("skipping malformed console entry {item}");
                        None
                    }
                }
            })
            .collect()
    }
}

/// Local and session storage captured at one moment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSnapshot {
    /// `window.localStorage`
    pub local: BTreeMap<String, String>,
    /// `window.sessionStorage`
    pub session: BTreeMap<String, String>,
}

impl StorageSnapshot {
    /// Check if both storages are empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.session.is_empty()
    }
}

/// Convert the storage script result into a string map
///
/// Non-string values are kept in their JSON text form; anything that is not an
/// object degrades to an empty map with a warning.
#[must_use]
pub fn storage_from_value(raw: &Value, source: &str) -> BTreeMap<String, String> {
    match raw {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), value)
            })
            .collect(),
        Value::Null => BTreeMap::new(),
        other => {
            tracing::warn!("{source} storage is not an object; ignoring {other}");
            BTreeMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod cookie_tests {
        use super::*;

        #[test]
        fn test_cookie_builder() {
            let cookie = Cookie::new("session", "abc", "sweetshop.vivrichards.co.uk")
                .with_path("/basket")
                .with_expires(1_700_000_000)
                .secure();
            assert_eq!(cookie.path, "/basket");
            assert_eq!(cookie.expires, Some(1_700_000_000));
            assert!(cookie.secure);
            assert!(!cookie.http_only);
        }
    }

    mod console_tests {
        use super::*;

        #[test]
        fn test_from_value() {
            let raw = json!([
                {"level": "log", "text": "hello"},
                {"level": "error", "text": "boom"}
            ]);
            let entries = ConsoleEntry::from_value(&raw);
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[1], ConsoleEntry::new("error", "boom"));
        }

        #[test]
        fn test_malformed_entries_are_skipped() {
            let raw = json!([{"level": "log"}, {"level": "warn", "text": "ok"}, 7]);
            let entries = ConsoleEntry::from_value(&raw);
            assert_eq!(entries, vec![ConsoleEntry::new("warn", "ok")]);
        }

        #[test]
        fn test_non_list_degrades_to_empty() {
            assert!(ConsoleEntry::from_value(&json!("nope")).is_empty());
            assert!(ConsoleEntry::from_value(&Value::Null).is_empty());
        }
    }

    mod storage_tests {
        use super::*;

        #[test]
        fn test_values_are_stringified() {
            let raw = json!({"basket": "[1,2]", "count": 3, "flag": true});
            let map = storage_from_value(&raw, "local");
            assert_eq!(map["basket"], "[1,2]");
            assert_eq!(map["count"], "3");
            assert_eq!(map["flag"], "true");
        }

        #[test]
        fn test_non_object_degrades_to_empty() {
            assert!(storage_from_value(&json!([1, 2]), "session").is_empty());
        }

        #[test]
        fn test_snapshot_is_empty() {
            let mut snapshot = StorageSnapshot::default();
            assert!(snapshot.is_empty());
            let _ = snapshot.session.insert("k".into(), "v".into());
            assert!(!snapshot.is_empty());
        }
    }
}
