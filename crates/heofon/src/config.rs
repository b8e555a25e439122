//! Run configuration: deployment tier, browser, tracing and output options.

use crate::result::HeofonError;
use crate::wait::LoadVerification;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default output root, relative to the working directory
pub const DEFAULT_OUTPUT_ROOT: &str = "output";

/// Deployment tier of the application under test
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// QA environment
    Qa,
    /// Staging environment
    #[default]
    Stage,
    /// Production
    Prod,
}

impl Tier {
    /// Textual form used on the command line and in data files
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Qa => "qa",
            Self::Stage => "stage",
            Self::Prod => "prod",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = HeofonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "qa" => Ok(Self::Qa),
            "stage" => Ok(Self::Stage),
            "prod" => Ok(Self::Prod),
            other => Err(HeofonError::config(format!("unknown tier '{other}'"))),
        }
    }
}

/// Browser used to run a test
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserKind {
    /// Chromium with a visible window
    #[default]
    Chromium,
    /// Chromium without a window
    HeadlessChromium,
}

impl BrowserKind {
    /// Textual form used on the command line
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chromium => "chromium",
            Self::HeadlessChromium => "headless_chromium",
        }
    }

    /// Run without a window
    #[must_use]
    pub const fn is_headless(&self) -> bool {
        matches!(self, Self::HeadlessChromium)
    }

    /// Whether the browser exposes DevTools, which enables the network,
    /// console and metrics folders of a test case
    #[must_use]
    pub const fn devtools_supported(&self) -> bool {
        matches!(self, Self::Chromium | Self::HeadlessChromium)
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrowserKind {
    type Err = HeofonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chromium" => Ok(Self::Chromium),
            "headless_chromium" => Ok(Self::HeadlessChromium),
            other => Err(HeofonError::config(format!("unsupported browser '{other}'"))),
        }
    }
}

/// Options for one test run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Tier whose domain the application is served from
    pub tier: Tier,
    /// Browser to launch
    pub browser: BrowserKind,
    /// Save a screenshot after every tracked click
    pub trace_screenshots: bool,
    /// Directory the timestamped run folder is created in
    pub output_root: PathBuf,
    /// Post-navigation verification policy
    pub verification: LoadVerification,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tier: Tier::default(),
            browser: BrowserKind::default(),
            trace_screenshots: false,
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            verification: LoadVerification::default(),
        }
    }
}

impl RunConfig {
    /// Create a configuration with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tier
    #[must_use]
    pub const fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self
    }

    /// Set the browser
    #[must_use]
    pub const fn with_browser(mut self, browser: BrowserKind) -> Self {
        self.browser = browser;
        self
    }

    /// Enable or disable trace screenshots
    #[must_use]
    pub const fn with_trace_screenshots(mut self, enabled: bool) -> Self {
        self.trace_screenshots = enabled;
        self
    }

    /// Set the output root
    #[must_use]
    pub fn with_output_root(mut self, root: impl AsRef<Path>) -> Self {
        self.output_root = root.as_ref().to_path_buf();
        self
    }

    /// Set the verification policy
    #[must_use]
    pub const fn with_verification(mut self, verification: LoadVerification) -> Self {
        self.verification = verification;
        self
    }
}
