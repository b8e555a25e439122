//! Transition controller: click, resolve, verify, capture.
//!
//! ```text
//! current page ──click──▶ unload poll ──resolve──▶ next page ──load poll──▶ capture
//!      │                    (PageUnload)              │          (PageLoad)     │
//!      └── event "clicked element '<name>'"           └── cookies, console, web storage
//! ```
//!
//! There are no retries. The first failing step ends the transition with its
//! error and the caller keeps the page object it started from.

use crate::locator::Selector;
use crate::page_object::{PageArgs, PageObject, UrlMatcher};
use crate::resolver::resolve;
use crate::result::{HeofonError, HeofonResult};
use crate::wait::{poll_until, WaitOptions};

/// Options of a single transition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionOptions {
    /// Resolve the target from the table on the other side of the auth boundary
    pub cross_auth_boundary: bool,
    /// Keyword data forwarded to the target page's factory
    pub pass_through: Option<PageArgs>,
    /// Event text replacing `clicked element '<name>'`
    pub message: Option<String>,
    /// Path the URL must reach for the old page to count as unloaded
    pub target_url: Option<String>,
}

impl TransitionOptions {
    /// Create default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cross the auth boundary
    #[must_use]
    pub const fn crossing(mut self) -> Self {
        self.cross_auth_boundary = true;
        self
    }

    /// Set whether the auth boundary is crossed
    #[must_use]
    pub const fn with_cross_auth_boundary(mut self, cross: bool) -> Self {
        self.cross_auth_boundary = cross;
        self
    }

    /// Forward keyword data to the target page
    #[must_use]
    pub fn with_pass_through(mut self, args: PageArgs) -> Self {
        self.pass_through = Some(args);
        self
    }

    /// Override the recorded event text
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Expect the URL to reach this path
    #[must_use]
    pub fn with_target_url(mut self, target_url: impl Into<String>) -> Self {
        self.target_url = Some(target_url.into());
        self
    }
}

impl PageObject {
    /// Click an element and record the interaction
    ///
    /// The event is `clicked element '<interaction_name>'` unless `message`
    /// is given. With trace screenshots enabled a screenshot named
    /// `after click <interaction_name>` follows.
    ///
    /// # Errors
    ///
    /// Propagates tab errors such as [`HeofonError::ElementNotFound`].
    pub async fn click_element(
        &mut self,
        element: &Selector,
        interaction_name: &str,
        message: Option<&str>,
    ) -> HeofonResult<()> {
        tracing::info!("clicking '{interaction_name}' ({element})");
        self.tab().click(element).await?;

        let event = message.map_or_else(
            || format!("clicked element '{interaction_name}'"),
            str::to_string,
        );
        let _ = self.record_event(&event, None);

        if self.context().config().trace_screenshots {
            let _ = self
                .save_screenshot(Some(&format!("after click {interaction_name}")))
                .await?;
        }
        Ok(())
    }

    /// Click an element that leads to another page and return that page
    ///
    /// When `expect_url_change` is set and verification is enabled, the tab
    /// must leave the current URL (or reach `options.target_url`) before the
    /// target is resolved. After resolution the new page must report
    /// [`PageObject::is_loaded`]. Artifacts are captured on the new page with
    /// the label `loaded page '<target_page_id>'`.
    ///
    /// # Errors
    ///
    /// - [`HeofonError::PageUnload`] if the browser never left the old page
    /// - [`HeofonError::UnknownPage`] if the target is not routable
    /// - [`HeofonError::PageLoad`] if the new page never matched its identity
    /// - tab and artifact errors
    pub async fn click_and_load(
        &mut self,
        element: &Selector,
        interaction_name: &str,
        target_page_id: &str,
        expect_url_change: bool,
        options: TransitionOptions,
    ) -> HeofonResult<PageObject> {
        let verification = self.context().config().verification;

        let old_url = if expect_url_change {
            let url = self.tab().current_url().await?;
            tracing::info!(
                "leaving {url} for '{target_page_id}' (target url: {})",
                options.target_url.as_deref().unwrap_or("any")
            );
            Some(url)
        } else {
            None
        };

        self.click_element(element, interaction_name, options.message.as_deref())
            .await?;

        if let (true, Some(old_url)) = (verification.enabled, old_url.as_deref()) {
            self.verify_unload(old_url, options.target_url.as_deref(), &verification.wait)
                .await?;
        }

        if let Some(args) = &options.pass_through {
            tracing::info!("passing through to '{target_page_id}': {args:?}");
        }
        let mut page = resolve(
            self.application(),
            self.context(),
            self.auth_mode(),
            target_page_id,
            options.cross_auth_boundary,
            self.tab(),
            options.pass_through.as_ref(),
        )
        .await?;

        if verification.enabled {
            page.verify_load(&verification.wait).await?;
        }

        page.capture(&format!("loaded page '{target_page_id}'"))
            .await?;
        Ok(page)
    }

    async fn verify_unload(
        &self,
        old_url: &str,
        target_url: Option<&str>,
        wait: &WaitOptions,
    ) -> HeofonResult<()> {
        let matcher = target_url.map(UrlMatcher::new);
        let tab = self.tab();
        let result = poll_until(wait, "page unload", || {
            let matcher = matcher.as_ref();
            async move {
                let current = tab.current_url().await?;
                Ok(match matcher {
                    Some(m) => m.matches_url(&current),
                    None => current != old_url,
                })
            }
        })
        .await?;

        if result.success {
            return Ok(());
        }
        let current = tab.current_url().await?;
        let expected = target_url.map_or_else(
            || format!("a url other than {old_url}"),
            |t| format!("path {t}"),
        );
        Err(HeofonError::PageUnload {
            errors: format!(
                "'{}' still at {current} after {:?}, expected {expected}",
                self.name(),
                result.elapsed
            ),
        })
    }

    async fn verify_load(&self, wait: &WaitOptions) -> HeofonResult<()> {
        let this = self;
        let result = poll_until(wait, "page load", move || this.is_loaded()).await?;
        if result.success {
            return Ok(());
        }
        let url = self.tab().current_url().await?;
        let title = self.tab().title().await?;
        Err(HeofonError::PageLoad {
            errors: format!(
                "'{}' expected path {} with title '{}', found {url} with title '{title}'",
                self.name(),
                self.url_path(),
                self.title()
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::sweetshop::{self, HOME_PAGE, SWEETS_PAGE};
    use crate::config::{RunConfig, Tier};
    use crate::context::TestContext;
    use crate::mock::{Capture, MockTab, RecordingSink};
    use crate::tab::SharedTab;
    use crate::wait::LoadVerification;
    use crate::Application;
    use std::sync::Arc;

    fn fast_config() -> RunConfig {
        RunConfig::default().with_verification(LoadVerification::with_wait(
            WaitOptions::new().with_timeout(50).with_poll_interval(5),
        ))
    }

    struct Harness {
        app: Arc<Application>,
        sink: Arc<RecordingSink>,
        ctx: Arc<TestContext>,
    }

    impl Harness {
        fn new(config: RunConfig) -> Self {
            let app = sweetshop::application(Tier::Stage).unwrap();
            let sink = Arc::new(RecordingSink::new());
            let ctx = Arc::new(TestContext::new(config, sink.clone()));
            Self { app, sink, ctx }
        }

        async fn home(&self, tab: MockTab) -> PageObject {
            let tab: SharedTab = Arc::new(tab);
            self.app
                .start_with(&self.ctx, &tab, HOME_PAGE)
                .await
                .unwrap()
        }
    }

    fn sweets_link() -> Selector {
        Selector::css_with_text("nav a", "Sweets")
    }

    mod options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let options = TransitionOptions::new();
            assert!(!options.cross_auth_boundary);
            assert!(options.pass_through.is_none());
            assert!(options.message.is_none());
            assert!(options.target_url.is_none());
        }

        #[test]
        fn test_builder() {
            let options = TransitionOptions::new()
                .crossing()
                .with_message("submitted")
                .with_target_url("/account");
            assert!(options.cross_auth_boundary);
            assert_eq!(options.message.as_deref(), Some("submitted"));
            assert_eq!(options.target_url.as_deref(), Some("/account"));
            assert!(!options.with_cross_auth_boundary(false).cross_auth_boundary);
        }
    }

    mod click_and_load_tests {
        use super::*;

        #[tokio::test]
        async fn test_loads_target_and_captures_once() {
            let h = Harness::new(fast_config());
            let mut home = h.home(sweetshop::mock_site(&h.app)).await;

            let sweets = home
                .click_and_load(
                    &sweets_link(),
                    "Sweets link",
                    SWEETS_PAGE,
                    true,
                    TransitionOptions::new(),
                )
                .await
                .unwrap();

            assert_eq!(sweets.name(), SWEETS_PAGE);
            assert_eq!(home.events().last().unwrap().event, "clicked element 'Sweets link'");
            assert_eq!(home.events().last().unwrap().page, HOME_PAGE);

            let label = format!("loaded page '{SWEETS_PAGE}'");
            let captures = h.sink.captures();
            assert_eq!(captures.len(), 3);
            assert!(matches!(&captures[0], Capture::Cookies { label: l, .. } if *l == label));
            assert!(matches!(&captures[1], Capture::ConsoleLog { label: l, .. } if *l == label));
            assert!(matches!(
                &captures[2],
                Capture::WebStorage { page, event, .. } if page == SWEETS_PAGE && *event == label
            ));
        }

        #[tokio::test]
        async fn test_message_replaces_event_text() {
            let h = Harness::new(fast_config());
            let mut home = h.home(sweetshop::mock_site(&h.app)).await;
            let options = TransitionOptions::new().with_message("browsed to sweets");

            let _ = home
                .click_and_load(&sweets_link(), "Sweets link", SWEETS_PAGE, true, options)
                .await
                .unwrap();
            assert_eq!(home.events().last().unwrap().event, "browsed to sweets");
        }

        #[tokio::test]
        async fn test_trace_screenshot_after_click() {
            let h = Harness::new(fast_config().with_trace_screenshots(true));
            let mut home = h.home(sweetshop::mock_site(&h.app)).await;

            let _ = home
                .click_and_load(
                    &sweets_link(),
                    "Sweets link",
                    SWEETS_PAGE,
                    true,
                    TransitionOptions::new(),
                )
                .await
                .unwrap();
            assert_eq!(h.sink.screenshots(), vec!["after click Sweets link".to_string()]);
        }

        #[tokio::test]
        async fn test_no_trace_screenshot_by_default() {
            let h = Harness::new(fast_config());
            let mut home = h.home(sweetshop::mock_site(&h.app)).await;

            let _ = home
                .click_and_load(
                    &sweets_link(),
                    "Sweets link",
                    SWEETS_PAGE,
                    true,
                    TransitionOptions::new(),
                )
                .await
                .unwrap();
            assert!(h.sink.screenshots().is_empty());
        }

        #[tokio::test]
        async fn test_same_page_without_url_change() {
            let h = Harness::new(fast_config());
            let refresh = Selector::css("#refresh");
            let mut home = h
                .home(sweetshop::mock_site(&h.app).with_element(refresh.clone()))
                .await;

            let again = home
                .click_and_load(&refresh, "refresh", HOME_PAGE, false, TransitionOptions::new())
                .await
                .unwrap();
            assert_eq!(again.name(), HOME_PAGE);
        }

        #[tokio::test]
        async fn test_unknown_target_page() {
            let h = Harness::new(fast_config());
            let mut home = h.home(sweetshop::mock_site(&h.app)).await;

            let err = home
                .click_and_load(
                    &sweets_link(),
                    "Sweets link",
                    "sweetshop checkout page",
                    true,
                    TransitionOptions::new(),
                )
                .await
                .unwrap_err();
            assert!(matches!(err, HeofonError::UnknownPage { .. }));
            assert!(h.sink.captures().is_empty());
        }
    }

    mod verification_tests {
        use super::*;

        #[tokio::test]
        async fn test_click_that_stays_put_is_unload_failure() {
            let h = Harness::new(fast_config());
            let dead = Selector::css("#dead-link");
            let mut home = h
                .home(sweetshop::mock_site(&h.app).with_element(dead.clone()))
                .await;

            let err = home
                .click_and_load(&dead, "dead link", SWEETS_PAGE, true, TransitionOptions::new())
                .await
                .unwrap_err();
            assert!(matches!(err, HeofonError::PageUnload { .. }));
            assert!(err.is_verification_failure());
            assert!(h.sink.captures().is_empty());
        }

        #[tokio::test]
        async fn test_wrong_target_url_is_unload_failure() {
            let h = Harness::new(fast_config());
            let mut home = h.home(sweetshop::mock_site(&h.app)).await;
            let options = TransitionOptions::new().with_target_url("/about");

            let err = home
                .click_and_load(&sweets_link(), "Sweets link", SWEETS_PAGE, true, options)
                .await
                .unwrap_err();
            assert!(matches!(err, HeofonError::PageUnload { .. }));
            assert!(err.to_string().contains("path /about"));
        }

        #[tokio::test]
        async fn test_broken_link_is_load_failure() {
            let h = Harness::new(fast_config());
            let broken = Selector::css("#broken");
            let tab = sweetshop::mock_site(&h.app)
                .with_link(broken.clone(), h.app.url_for("/sweets-old"));
            let mut home = h.home(tab).await;

            let err = home
                .click_and_load(&broken, "broken link", SWEETS_PAGE, true, TransitionOptions::new())
                .await
                .unwrap_err();
            assert!(matches!(err, HeofonError::PageLoad { .. }));
            assert!(err.to_string().contains("/sweets-old"));
        }

        #[tokio::test]
        async fn test_disabled_verification_accepts_broken_link() {
            let h =
                Harness::new(RunConfig::default().with_verification(LoadVerification::disabled()));
            let broken = Selector::css("#broken");
            let tab = sweetshop::mock_site(&h.app)
                .with_link(broken.clone(), h.app.url_for("/sweets-old"));
            let mut home = h.home(tab).await;

            let page = home
                .click_and_load(&broken, "broken link", SWEETS_PAGE, true, TransitionOptions::new())
                .await
                .unwrap();
            assert_eq!(page.name(), SWEETS_PAGE);
            assert!(!page.is_loaded().await.unwrap());
        }

        #[tokio::test]
        async fn test_missing_element() {
            let h = Harness::new(fast_config());
            let mut home = h.home(sweetshop::mock_site(&h.app)).await;

            let err = home
                .click_and_load(
                    &Selector::css("#nowhere"),
                    "nowhere",
                    SWEETS_PAGE,
                    true,
                    TransitionOptions::new(),
                )
                .await
                .unwrap_err();
            assert!(matches!(err, HeofonError::ElementNotFound { .. }));
            assert!(home.events().is_empty());
        }
    }
}
