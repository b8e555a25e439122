//! Chromium over the Chrome `DevTools` Protocol.
//!
//! Compiled with the `browser` feature. [`BrowserSession`] owns the chromium
//! process and its CDP event loop; [`ChromiumTab`] implements [`BrowserTab`]
//! for one page of it.

use crate::config::BrowserKind;
use crate::locator::Selector;
use crate::result::{HeofonError, HeofonResult};
use crate::tab::{BrowserTab, Cookie, SameSite, CONSOLE_SHIM_SCRIPT};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::network::CookieSameSite;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page as CdpPage, ScreenshotParams};
use futures::StreamExt;
use serde_json::Value;

/// Browser launch options
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run without a window
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 1024,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Launch options for a browser kind
    #[must_use]
    pub fn for_kind(kind: BrowserKind) -> Self {
        Self {
            headless: kind.is_headless(),
            ..Self::default()
        }
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

fn launch_error(e: impl std::fmt::Display) -> HeofonError {
    HeofonError::BrowserLaunch {
        message: e.to_string(),
    }
}

/// A running chromium process
#[derive(Debug)]
pub struct BrowserSession {
    browser: CdpBrowser,
    handle: tokio::task::JoinHandle<()>,
}

impl BrowserSession {
    /// Launch chromium
    ///
    /// # Errors
    ///
    /// Returns [`HeofonError::BrowserLaunch`] if chromium cannot be started.
    pub async fn launch(config: &BrowserConfig) -> HeofonResult<Self> {
        let mut builder =
            CdpConfig::builder().window_size(config.viewport_width, config.viewport_height);
        if !config.headless {
            builder = builder.with_head();
        }
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let cdp_config = builder.build().map_err(launch_error)?;

        let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(launch_error)?;
        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });
        tracing::info!("launched chromium (headless: {})", config.headless);

        Ok(Self { browser, handle })
    }

    /// Open a blank tab with the console history shim installed
    ///
    /// # Errors
    ///
    /// Returns [`HeofonError::Browser`] if the tab cannot be created.
    pub async fn new_tab(&self) -> HeofonResult<ChromiumTab> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| HeofonError::browser(e.to_string()))?;
        let _ = page
            .evaluate_on_new_document(CONSOLE_SHIM_SCRIPT)
            .await
            .map_err(|e| HeofonError::browser(e.to_string()))?;
        Ok(ChromiumTab { page })
    }

    /// Close the browser and stop its event loop
    ///
    /// # Errors
    ///
    /// Returns [`HeofonError::Browser`] if chromium does not close cleanly.
    pub async fn close(mut self) -> HeofonResult<()> {
        let _ = self
            .browser
            .close()
            .await
            .map_err(|e| HeofonError::browser(e.to_string()))?;
        self.handle.abort();
        Ok(())
    }
}

/// One chromium page
#[derive(Debug, Clone)]
pub struct ChromiumTab {
    page: CdpPage,
}

impl ChromiumTab {
    fn cdp_error(e: impl std::fmt::Display) -> HeofonError {
        HeofonError::browser(e.to_string())
    }

    async fn run_element_script(&self, selector: &Selector, script: String) -> HeofonResult<()> {
        let found = self.evaluate(&script).await?;
        if found.as_bool() == Some(true) {
            Ok(())
        } else {
            Err(HeofonError::ElementNotFound {
                selector: selector.to_string(),
            })
        }
    }
}

#[async_trait]
impl BrowserTab for ChromiumTab {
    async fn navigate(&self, url: &str) -> HeofonResult<()> {
        let _ = self
            .page
            .goto(url)
            .await
            .map_err(|e| HeofonError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn click(&self, selector: &Selector) -> HeofonResult<()> {
        match selector.as_css() {
            Some(css) => {
                let element = self
                    .page
                    .find_element(css)
                    .await
                    .map_err(|_| HeofonError::ElementNotFound {
                        selector: selector.to_string(),
                    })?;
                let _ = element.click().await.map_err(Self::cdp_error)?;
                Ok(())
            }
            None => {
                self.run_element_script(selector, selector.to_click_script())
                    .await
            }
        }
    }

    async fn hover(&self, selector: &Selector) -> HeofonResult<()> {
        match selector.as_css() {
            Some(css) => {
                let element = self
                    .page
                    .find_element(css)
                    .await
                    .map_err(|_| HeofonError::ElementNotFound {
                        selector: selector.to_string(),
                    })?;
                let _ = element.hover().await.map_err(Self::cdp_error)?;
                Ok(())
            }
            None => {
                self.run_element_script(selector, selector.to_hover_script())
                    .await
            }
        }
    }

    async fn type_text(&self, selector: &Selector, text: &str) -> HeofonResult<()> {
        self.run_element_script(selector, selector.to_fill_script(text))
            .await
    }

    async fn evaluate(&self, script: &str) -> HeofonResult<Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(Self::cdp_error)?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn screenshot(&self) -> HeofonResult<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        self.page.screenshot(params).await.map_err(Self::cdp_error)
    }

    async fn cookies(&self) -> HeofonResult<Vec<Cookie>> {
        let cookies = self.page.get_cookies().await.map_err(Self::cdp_error)?;
        Ok(cookies
            .into_iter()
            .map(|c| Cookie {
                name: c.name,
                value: c.value,
                domain: c.domain,
                path: c.path,
                expires: (c.expires > 0.0).then(|| c.expires as i64),
                http_only: c.http_only,
                secure: c.secure,
                same_site: c.same_site.map(|s| match s {
                    CookieSameSite::Strict => SameSite::Strict,
                    CookieSameSite::Lax => SameSite::Lax,
                    CookieSameSite::None => SameSite::None,
                }),
            })
            .collect())
    }

    async fn current_url(&self) -> HeofonResult<String> {
        let url = self.page.url().await.map_err(Self::cdp_error)?;
        Ok(url.unwrap_or_default())
    }

    async fn title(&self) -> HeofonResult<String> {
        let title = self.page.get_title().await.map_err(Self::cdp_error)?;
        Ok(title.unwrap_or_default())
    }
}
