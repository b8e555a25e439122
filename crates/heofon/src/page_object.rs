//! Page objects: one logical page believed to be loaded in the shared tab.
//!
//! A page object carries the identity of its page (name, title, URL, auth
//! mode), a handle to the tab every page of the test shares, and an event log.
//! Navigation methods return the next page object; the one they were called
//! on describes a page that is no longer displayed and should be dropped.
//!
//! Pages are not separate types. Each application registers a
//! [`PageFactory`] per page that produces a [`PageBlueprint`]; the resolver
//! turns the blueprint into a [`PageObject`].

use crate::application::Application;
use crate::context::TestContext;
use crate::event::{EventLog, InteractionEvent};
use crate::pretty::plog;
use crate::result::HeofonResult;
use crate::routing::AuthMode;
use crate::tab::{Cookie, SharedTab};
use std::path::PathBuf;
use std::sync::Arc;

/// Keyword data passed through a transition to the next page's factory
pub type PageArgs = serde_json::Map<String, serde_json::Value>;

/// Builds the blueprint of one page for an application
pub type PageFactory = fn(&Application, &PageArgs) -> HeofonResult<PageBlueprint>;

/// What constructing a page object does to the tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnConstruct {
    /// Load the page's URL (entry pages)
    Navigate,
    /// The click that led here already loaded the page
    AssumeLoaded,
}

/// Identity of a page, produced by its factory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageBlueprint {
    /// Page name, equal to its routing key
    pub name: String,
    /// Expected document title
    pub title: String,
    /// Full URL
    pub url: String,
    /// Path pattern the tab's URL must match, e.g. `/sweets` or `/users/:id`
    pub url_path: String,
    /// Construction policy
    pub on_construct: OnConstruct,
}

// =============================================================================
// URL MATCHING
// =============================================================================

/// URL path matcher for identity checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Parameter(String),
}

impl UrlMatcher {
    /// Create a new URL matcher from a pattern
    ///
    /// Patterns support:
    /// - Literal segments: `/login`
    /// - Wildcards: `/users/*`
    /// - Named parameters: `/users/:id`
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == "*" {
                    UrlSegment::Wildcard
                } else if let Some(name) = s.strip_prefix(':') {
                    UrlSegment::Parameter(name.to_string())
                } else {
                    UrlSegment::Literal(s.to_string())
                }
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Check if a path matches the pattern
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        // wildcards and parameters each consume exactly one segment
        if path_segments.len() != self.segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(path_segments)
            .all(|(segment, actual)| match segment {
                UrlSegment::Literal(lit) => lit == actual,
                UrlSegment::Wildcard | UrlSegment::Parameter(_) => true,
            })
    }

    /// Check if the path of a full URL matches the pattern
    #[must_use]
    pub fn matches_url(&self, url: &str) -> bool {
        self.matches(&path_of(url))
    }

    /// Get the original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Path component of a URL; the input itself when it does not parse
#[must_use]
pub fn path_of(url: &str) -> String {
    url::Url::parse(url).map_or_else(|_| url.to_string(), |u| u.path().to_string())
}

// =============================================================================
// PAGE OBJECT
// =============================================================================

/// One page of the application under test
#[derive(Debug)]
pub struct PageObject {
    name: String,
    title: String,
    url: String,
    url_path: UrlMatcher,
    auth_mode: AuthMode,
    tab: SharedTab,
    app: Arc<Application>,
    ctx: Arc<TestContext>,
    cookies: Vec<Cookie>,
    events: EventLog,
}

impl PageObject {
    /// Build a page object from its blueprint
    ///
    /// With [`OnConstruct::Navigate`] the tab is sent to the page's URL first.
    ///
    /// # Errors
    ///
    /// Propagates navigation errors from the tab.
    pub async fn construct(
        blueprint: PageBlueprint,
        auth_mode: AuthMode,
        tab: SharedTab,
        app: Arc<Application>,
        ctx: Arc<TestContext>,
    ) -> HeofonResult<Self> {
        if blueprint.on_construct == OnConstruct::Navigate {
            tracing::info!("navigating to {}", blueprint.url);
            tab.navigate(&blueprint.url).await?;
        }
        tracing::info!(
            "instantiated page object '{}' ({auth_mode})",
            blueprint.name
        );
        Ok(Self {
            name: blueprint.name,
            title: blueprint.title,
            url: blueprint.url,
            url_path: UrlMatcher::new(&blueprint.url_path),
            auth_mode,
            tab,
            app,
            ctx,
            cookies: Vec::new(),
            events: EventLog::new(),
        })
    }

    /// Page name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Expected document title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Page URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Path pattern used for identity checks
    #[must_use]
    pub fn url_path(&self) -> &str {
        self.url_path.pattern()
    }

    /// Auth mode of the table this page was resolved from
    #[must_use]
    pub const fn auth_mode(&self) -> AuthMode {
        self.auth_mode
    }

    /// Last cookie snapshot
    #[must_use]
    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    /// Events recorded on this page object
    #[must_use]
    pub const fn events(&self) -> &EventLog {
        &self.events
    }

    /// The shared tab
    #[must_use]
    pub const fn tab(&self) -> &SharedTab {
        &self.tab
    }

    /// Application this page belongs to
    #[must_use]
    pub const fn application(&self) -> &Arc<Application> {
        &self.app
    }

    /// Context of the running test
    #[must_use]
    pub const fn context(&self) -> &Arc<TestContext> {
        &self.ctx
    }

    /// Append an interaction event; `page` defaults to this page's name
    pub fn record_event(&mut self, event: &str, page: Option<&str>) -> &InteractionEvent {
        let page = page.unwrap_or(self.name.as_str()).to_string();
        let recorded = self.events.record(event, page);
        tracing::info!("\n{}", plog(recorded));
        recorded
    }

    /// Whether the tab shows this page: URL path and title both match
    ///
    /// # Errors
    ///
    /// Propagates tab errors.
    pub async fn is_loaded(&self) -> HeofonResult<bool> {
        let current = self.tab.current_url().await?;
        if !self.url_path.matches_url(&current) {
            return Ok(false);
        }
        Ok(self.tab.title().await? == self.title)
    }

    // =========================================================================
    // ARTIFACT CAPTURE
    // =========================================================================

    /// Snapshot cookies to the sink; `label` defaults to the page name
    ///
    /// # Errors
    ///
    /// Propagates tab errors and artifact write errors.
    pub async fn save_cookies(&mut self, label: Option<&str>) -> HeofonResult<PathBuf> {
        let cookies = self.tab.cookies().await?;
        let url = self.tab.current_url().await?;
        let path = self
            .ctx
            .sink()
            .write_cookies(&cookies, &url, label.unwrap_or(self.name.as_str()))?;
        self.cookies = cookies;
        Ok(path)
    }

    /// Save the console history; `label` defaults to the page name
    ///
    /// Returns `None` for browsers without devtools.
    ///
    /// # Errors
    ///
    /// Propagates tab errors and artifact write errors.
    pub async fn save_browser_logs(&self, label: Option<&str>) -> HeofonResult<Option<PathBuf>> {
        if !self.ctx.config().browser.devtools_supported() {
            tracing::debug!("browser has no devtools; console log not saved");
            return Ok(None);
        }
        let entries = self.tab.console_log().await?;
        let url = self.tab.current_url().await?;
        let path = self
            .ctx
            .sink()
            .write_console_log(&entries, &url, label.unwrap_or(self.name.as_str()))?;
        Ok(Some(path))
    }

    /// Save local and session storage tagged with the event that caused it
    ///
    /// With `record_event` the event label is also appended to the event log.
    ///
    /// # Errors
    ///
    /// Propagates tab errors and artifact write errors.
    pub async fn save_web_storage(
        &mut self,
        event_label: &str,
        record_event: bool,
    ) -> HeofonResult<[PathBuf; 2]> {
        if record_event {
            let _ = self.record_event(event_label, None);
        }
        let snapshot = self.tab.web_storage().await?;
        let url = self.tab.current_url().await?;
        self.ctx
            .sink()
            .write_web_storage(&snapshot, &url, &self.name, event_label)
    }

    /// Save a full-page screenshot; `label` defaults to the page name
    ///
    /// # Errors
    ///
    /// Propagates tab errors and artifact write errors.
    pub async fn save_screenshot(&self, label: Option<&str>) -> HeofonResult<PathBuf> {
        let png = self.tab.screenshot().await?;
        self.ctx
            .sink()
            .write_screenshot(&png, label.unwrap_or(self.name.as_str()))
    }

    /// One capture cycle: cookies, console log and web storage
    ///
    /// # Errors
    ///
    /// Propagates the first capture error.
    pub async fn capture(&mut self, label: &str) -> HeofonResult<()> {
        let _ = self.save_cookies(Some(label)).await?;
        let _ = self.save_browser_logs(Some(label)).await?;
        let _ = self.save_web_storage(label, false).await?;
        Ok(())
    }
}
