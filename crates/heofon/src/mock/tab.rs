use crate::locator::Selector;
use crate::result::{HeofonError, HeofonResult};
use crate::tab::{
    BrowserTab, ConsoleEntry, Cookie, StorageSnapshot, CONSOLE_HISTORY_SCRIPT,
    LOCAL_STORAGE_SCRIPT, SESSION_STORAGE_SCRIPT,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Title reported for URLs the site does not define
pub const NOT_FOUND_TITLE: &str = "404 Not Found";

/// Minimal PNG signature returned by screenshots
const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

#[derive(Debug)]
struct MockState {
    current_url: String,
    titles: HashMap<String, String>,
    links: HashMap<String, Option<String>>,
    page_links: HashMap<(String, String), Option<String>>,
    cookies: Vec<Cookie>,
    storage: StorageSnapshot,
    console: Vec<ConsoleEntry>,
    scripts: HashMap<String, Value>,
    typed: HashMap<String, String>,
    history: Vec<String>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            current_url: "about:blank".to_string(),
            titles: HashMap::new(),
            links: HashMap::new(),
            page_links: HashMap::new(),
            cookies: Vec::new(),
            storage: StorageSnapshot::default(),
            console: Vec::new(),
            scripts: HashMap::new(),
            typed: HashMap::new(),
            history: Vec::new(),
        }
    }
}

impl MockState {
    /// Link target of a selector on the current page; `None` if no such element
    fn target(&self, selector: &Selector) -> Option<Option<String>> {
        let key = selector.to_string();
        self.page_links
            .get(&(self.current_url.clone(), key.clone()))
            .or_else(|| self.links.get(&key))
            .cloned()
    }
}

/// Scripted browser tab
#[derive(Debug, Default)]
pub struct MockTab {
    state: Mutex<MockState>,
}

impl MockTab {
    /// Create a tab showing `about:blank`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> HeofonResult<MutexGuard<'_, MockState>> {
        self.state
            .lock()
            .map_err(|_| HeofonError::browser("mock tab state poisoned"))
    }

    fn edit(self, f: impl FnOnce(&mut MockState)) -> Self {
        if let Ok(mut state) = self.state.lock() {
            f(&mut state);
        }
        self
    }

    /// Define a page and its title
    #[must_use]
    pub fn with_page(self, url: impl Into<String>, title: impl Into<String>) -> Self {
        let (url, title) = (url.into(), title.into());
        self.edit(|s| {
            let _ = s.titles.insert(url, title);
        })
    }

    /// Element present on every page whose click loads `url`
    #[must_use]
    pub fn with_link(self, selector: Selector, url: impl Into<String>) -> Self {
        let url = url.into();
        self.edit(|s| {
            let _ = s.links.insert(selector.to_string(), Some(url));
        })
    }

    /// Element on one page only; overrides a site-wide link with the same selector
    #[must_use]
    pub fn with_link_on(
        self,
        page_url: impl Into<String>,
        selector: Selector,
        url: impl Into<String>,
    ) -> Self {
        let (page_url, url) = (page_url.into(), url.into());
        self.edit(|s| {
            let _ = s
                .page_links
                .insert((page_url, selector.to_string()), Some(url));
        })
    }

    /// Element present on every page whose click does not navigate
    #[must_use]
    pub fn with_element(self, selector: Selector) -> Self {
        self.edit(|s| {
            let _ = s.links.insert(selector.to_string(), None);
        })
    }

    /// Element on one page only whose click does not navigate
    #[must_use]
    pub fn with_element_on(self, page_url: impl Into<String>, selector: Selector) -> Self {
        let page_url = page_url.into();
        self.edit(|s| {
            let _ = s.page_links.insert((page_url, selector.to_string()), None);
        })
    }

    /// Remove an element from every page
    #[must_use]
    pub fn without(self, selector: &Selector) -> Self {
        let key = selector.to_string();
        self.edit(|s| {
            let _ = s.links.remove(&key);
            s.page_links.retain(|(_, sel), _| *sel != key);
        })
    }

    /// Add a cookie
    #[must_use]
    pub fn with_cookie(self, cookie: Cookie) -> Self {
        self.edit(|s| s.cookies.push(cookie))
    }

    /// Add a `localStorage` item
    #[must_use]
    pub fn with_local_item(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let (key, value) = (key.into(), value.into());
        self.edit(|s| {
            let _ = s.storage.local.insert(key, value);
        })
    }

    /// Add a `sessionStorage` item
    #[must_use]
    pub fn with_session_item(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let (key, value) = (key.into(), value.into());
        self.edit(|s| {
            let _ = s.storage.session.insert(key, value);
        })
    }

    /// Add a console message
    #[must_use]
    pub fn with_console(self, level: &str, text: &str) -> Self {
        let entry = ConsoleEntry::new(level, text);
        self.edit(|s| s.console.push(entry))
    }

    /// Fixed result for a script
    #[must_use]
    pub fn with_script_result(self, script: impl Into<String>, result: Value) -> Self {
        let script = script.into();
        self.edit(|s| {
            let _ = s.scripts.insert(script, result);
        })
    }

    /// URL currently shown
    #[must_use]
    pub fn url(&self) -> String {
        self.state()
            .map(|s| s.current_url.clone())
            .unwrap_or_default()
    }

    /// Last text typed into an element
    #[must_use]
    pub fn typed(&self, selector: &Selector) -> Option<String> {
        self.state()
            .ok()
            .and_then(|s| s.typed.get(&selector.to_string()).cloned())
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().map(|s| s.history.clone()).unwrap_or_default()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state()
            .map(|s| s.history.iter().any(|c| c.starts_with(method)))
            .unwrap_or(false)
    }

    /// Number of calls to a method
    #[must_use]
    pub fn call_count(&self, method: &str) -> usize {
        self.state()
            .map(|s| s.history.iter().filter(|c| c.starts_with(method)).count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl BrowserTab for MockTab {
    async fn navigate(&self, url: &str) -> HeofonResult<()> {
        let mut state = self.state()?;
        state.history.push(format!("navigate:{url}"));
        state.current_url = url.to_string();
        Ok(())
    }

    async fn click(&self, selector: &Selector) -> HeofonResult<()> {
        let mut state = self.state()?;
        state.history.push(format!("click:{selector}"));
        match state.target(selector) {
            Some(Some(url)) => {
                state.current_url = url;
                Ok(())
            }
            Some(None) => Ok(()),
            None => Err(HeofonError::ElementNotFound {
                selector: selector.to_string(),
            }),
        }
    }

    async fn hover(&self, selector: &Selector) -> HeofonResult<()> {
        let mut state = self.state()?;
        state.history.push(format!("hover:{selector}"));
        if state.target(selector).is_none() {
            return Err(HeofonError::ElementNotFound {
                selector: selector.to_string(),
            });
        }
        Ok(())
    }

    async fn type_text(&self, selector: &Selector, text: &str) -> HeofonResult<()> {
        let mut state = self.state()?;
        state.history.push(format!("type_text:{selector}"));
        if state.target(selector).is_none() {
            return Err(HeofonError::ElementNotFound {
                selector: selector.to_string(),
            });
        }
        let _ = state.typed.insert(selector.to_string(), text.to_string());
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> HeofonResult<Value> {
        let mut state = self.state()?;
        state.history.push("evaluate".to_string());
        let value = if script == CONSOLE_HISTORY_SCRIPT {
            serde_json::to_value(&state.console)?
        } else if script == LOCAL_STORAGE_SCRIPT {
            serde_json::to_value(&state.storage.local)?
        } else if script == SESSION_STORAGE_SCRIPT {
            serde_json::to_value(&state.storage.session)?
        } else {
            state.scripts.get(script).cloned().unwrap_or(Value::Null)
        };
        Ok(value)
    }

    async fn screenshot(&self) -> HeofonResult<Vec<u8>> {
        self.state()?.history.push("screenshot".to_string());
        Ok(PNG_SIGNATURE.to_vec())
    }

    async fn cookies(&self) -> HeofonResult<Vec<Cookie>> {
        let mut state = self.state()?;
        state.history.push("cookies".to_string());
        Ok(state.cookies.clone())
    }

    async fn current_url(&self) -> HeofonResult<String> {
        Ok(self.state()?.current_url.clone())
    }

    async fn title(&self) -> HeofonResult<String> {
        let state = self.state()?;
        Ok(state
            .titles
            .get(&state.current_url)
            .cloned()
            .unwrap_or_else(|| NOT_FOUND_TITLE.to_string()))
    }
}
