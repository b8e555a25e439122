//! Heofon CLI Library
//!
//! Command-line interface for running Heofon navigation scenarios and
//! inspecting the bundled routing tables.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
mod output;
pub mod routes;
pub mod runner;
pub mod scenarios;

pub use commands::{
    BrowserArg, Cli, ColorArg, Commands, RoutesArgs, RunArgs, ScenarioArg, TierArg, Toggle,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;
pub use runner::{execute, CaseResult, RunSummary, ScenarioRunner, TabSource};
pub use scenarios::{Step, TestCase};
