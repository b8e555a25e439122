//! Heofon: page objects and transitions for browser end-to-end tests.
//!
//! An [`Application`] owns two routing tables (`noauth` and `auth`) and the
//! top-menu maps of both. Tests start on a page, then move through the site
//! with [`PageObject::click_and_load`] and [`PageObject::top_menu_goto`];
//! each transition verifies the old page unloaded and the new one loaded,
//! then captures cookies, console output and web storage.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    HEOFON Architecture                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Page       │    │ Resolver   │    │ BrowserTab │            │
//! │   │ Object     │───►│ (routing   │───►│ (chromium  │            │
//! │   │ transition │    │  tables)   │    │  or mock)  │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! │         │                                                        │
//! │         ▼                                                        │
//! │   ┌────────────┐    ┌────────────┐                               │
//! │   │ Artifact   │───►│ output/    │                               │
//! │   │ Sink       │    │ run folder │                               │
//! │   └────────────┘    └────────────┘                               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Applications under test and their entry points
pub mod application;

/// Bundled application definitions
pub mod apps;

/// Cookie, console, web storage and screenshot files
#[allow(clippy::missing_errors_doc)]
pub mod artifacts;

/// Chromium over CDP
#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc, clippy::cast_possible_truncation)]
pub mod browser;

/// Run configuration: tier, browser, tracing
pub mod config;

/// Per-test context
pub mod context;

/// Interaction event log
pub mod event;

/// Element selectors
pub mod locator;

/// Run and test case logs
pub mod logging;

/// Scripted tab and recording sink for tests
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod mock;

/// Top-menu navigation
pub mod navigation;

/// Output folder layout
pub mod output;

/// Page objects
pub mod page_object;

/// Pretty printing for logs and artifacts
pub mod pretty;

/// Page id resolution
pub mod resolver;

/// Error types
pub mod result;

/// Routing tables
pub mod routing;

/// Browser tab abstraction
pub mod tab;

/// Click, resolve, verify, capture
pub mod transition;

/// Polling waits
pub mod wait;

pub use application::{Application, TierDomains};
pub use artifacts::{path_proof_name, ArtifactSink, ArtifactWriter};
#[cfg(feature = "browser")]
pub use browser::{BrowserConfig, BrowserSession, ChromiumTab};
pub use config::{BrowserKind, RunConfig, Tier};
pub use context::TestContext;
pub use event::{EventLog, InteractionEvent};
pub use locator::Selector;
pub use logging::{init_run_logging, TestCaseLog};
pub use navigation::{NavigationConfig, NavigationMap, NavigationStage, Reveal};
pub use output::{FolderKind, TestCaseDirs, TestRun};
pub use page_object::{
    OnConstruct, PageArgs, PageBlueprint, PageFactory, PageObject, UrlMatcher,
};
pub use pretty::plog;
pub use resolver::resolve;
pub use result::{HeofonError, HeofonResult};
pub use routing::{select_table, AuthMode, PageRegistry, RoutingConfig, RoutingEntry, RoutingTable};
pub use tab::{BrowserTab, ConsoleEntry, Cookie, SameSite, SharedTab, StorageSnapshot};
pub use transition::TransitionOptions;
pub use wait::{poll_until, LoadVerification, WaitOptions, WaitResult};

/// Prelude for writing tests
pub mod prelude {
    pub use super::application::*;
    pub use super::artifacts::*;
    #[cfg(feature = "browser")]
    pub use super::browser::*;
    pub use super::config::*;
    pub use super::context::*;
    pub use super::event::*;
    pub use super::locator::*;
    pub use super::mock::*;
    pub use super::navigation::*;
    pub use super::output::*;
    pub use super::page_object::*;
    pub use super::result::*;
    pub use super::routing::*;
    pub use super::tab::*;
    pub use super::transition::*;
    pub use super::wait::*;
}
