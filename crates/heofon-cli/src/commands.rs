//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use heofon::{BrowserKind, Tier};
use std::path::PathBuf;

/// Heofon: page-object navigation scenarios for browser end-to-end tests
#[derive(Parser, Debug)]
#[command(name = "heofon")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the routing tables and top menus of the bundled application
    Routes(RoutesArgs),

    /// Run navigation scenarios
    Run(RunArgs),
}

/// Arguments for the routes command
#[derive(Parser, Debug)]
pub struct RoutesArgs {
    /// Tier whose domain is shown
    #[arg(short, long, default_value = "stage")]
    pub tier: TierArg,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Scenario to run
    #[arg(short, long, default_value = "all")]
    pub scenario: ScenarioArg,

    /// Tier to test against
    #[arg(short, long, default_value = "stage")]
    pub tier: TierArg,

    /// Browser to drive
    #[arg(short, long, default_value = "chromium")]
    pub browser: BrowserArg,

    /// Screenshot after every click
    #[arg(long, default_value = "off")]
    pub tracing: Toggle,

    /// Root folder of run output
    #[arg(short, long, default_value = heofon::config::DEFAULT_OUTPUT_ROOT)]
    pub output: PathBuf,

    /// Run against the scripted site instead of a browser
    #[arg(long)]
    pub dry_run: bool,

    /// Path to the chromium binary
    #[arg(long)]
    pub chromium_path: Option<PathBuf>,

    /// Disable the chromium sandbox (containers/CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Wait limit for unload and load checks in milliseconds
    #[arg(long, default_value_t = heofon::wait::DEFAULT_WAIT_TIMEOUT_MS)]
    pub timeout: u64,
}

/// Scenario selection
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScenarioArg {
    /// Every scenario
    #[default]
    All,
    /// Home, Sweets, About, Login, Basket, Home
    Linear,
    /// Six three-step walks
    Dynamic,
    /// Log in and out again
    Login,
}

/// Deployment tier
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TierArg {
    /// QA
    Qa,
    /// Staging
    #[default]
    Stage,
    /// Production
    Prod,
}

impl From<TierArg> for Tier {
    fn from(arg: TierArg) -> Self {
        match arg {
            TierArg::Qa => Self::Qa,
            TierArg::Stage => Self::Stage,
            TierArg::Prod => Self::Prod,
        }
    }
}

/// Browser selection
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BrowserArg {
    /// Chromium with a window
    #[default]
    Chromium,
    /// Chromium without a window
    HeadlessChromium,
}

impl From<BrowserArg> for BrowserKind {
    fn from(arg: BrowserArg) -> Self {
        match arg {
            BrowserArg::Chromium => Self::Chromium,
            BrowserArg::HeadlessChromium => Self::HeadlessChromium,
        }
    }
}

/// On/off switch
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Toggle {
    /// Enabled
    On,
    /// Disabled
    #[default]
    Off,
}

impl Toggle {
    /// Whether the switch is on
    #[must_use]
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

/// Color output argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
