//! Scenario runner: one numbered output folder, log and tab per test case

use crate::commands::RunArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use crate::scenarios::{self, TestCase, START_PAGE, START_SCREENSHOT};
use heofon::apps::sweetshop;
use heofon::{
    init_run_logging, Application, HeofonResult, LoadVerification, RunConfig, SharedTab,
    TestCaseLog, TestContext, TestRun, WaitOptions,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outcome of one test case
#[derive(Debug, Clone)]
pub struct CaseResult {
    /// Case name
    pub name: String,
    /// Whether every step passed
    pub passed: bool,
    /// Error of the failing step
    pub error: Option<String>,
    /// Pages reached, starting page included
    pub pages: Vec<String>,
    /// Output folder of the case
    pub folder: PathBuf,
    /// Case duration
    pub duration: Duration,
}

/// Outcome of a run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Run output folder
    pub run_dir: PathBuf,
    /// Case results in execution order
    pub results: Vec<CaseResult>,
    /// Total duration
    pub duration: Duration,
}

impl RunSummary {
    /// Number of passed cases
    #[must_use]
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Number of failed cases
    #[must_use]
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.passed).count()
    }

    /// Check if all cases passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }
}

// =============================================================================
// TABS
// =============================================================================

/// Where test cases get their tab from
#[derive(Debug)]
pub enum TabSource {
    /// The scripted Sweet Shop
    DryRun,
    /// A chromium process
    #[cfg(feature = "browser")]
    Chromium(heofon::BrowserSession),
}

impl TabSource {
    /// Pick the source for the run arguments, launching chromium if needed
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a live run without browser support,
    /// or the launch error.
    pub async fn for_args(args: &RunArgs) -> CliResult<Self> {
        if args.dry_run {
            return Ok(Self::DryRun);
        }
        Self::launch(args).await
    }

    #[cfg(feature = "browser")]
    async fn launch(args: &RunArgs) -> CliResult<Self> {
        let mut config = heofon::BrowserConfig::for_kind(args.browser.into());
        if let Some(ref path) = args.chromium_path {
            config = config.with_chromium_path(path.to_string_lossy());
        }
        if args.no_sandbox {
            config = config.with_no_sandbox();
        }
        Ok(Self::Chromium(heofon::BrowserSession::launch(&config).await?))
    }

    #[cfg(not(feature = "browser"))]
    async fn launch(_args: &RunArgs) -> CliResult<Self> {
        Err(CliError::config(
            "built without browser support; rebuild with --features browser or pass --dry-run",
        ))
    }

    async fn open(&self, app: &Application) -> CliResult<SharedTab> {
        match self {
            Self::DryRun => Ok(Arc::new(sweetshop::mock_site(app))),
            #[cfg(feature = "browser")]
            Self::Chromium(session) => Ok(Arc::new(session.new_tab().await?)),
        }
    }

    /// Shut the browser down
    ///
    /// # Errors
    ///
    /// Returns the browser's close error.
    pub async fn close(self) -> CliResult<()> {
        match self {
            Self::DryRun => Ok(()),
            #[cfg(feature = "browser")]
            Self::Chromium(session) => Ok(session.close().await?),
        }
    }
}

// =============================================================================
// RUNNER
// =============================================================================

async fn run_steps(
    app: &Arc<Application>,
    ctx: &Arc<TestContext>,
    tab: &SharedTab,
    case: &TestCase,
    pages: &mut Vec<String>,
) -> HeofonResult<()> {
    let mut page = app.start_with(ctx, tab, START_PAGE).await?;
    pages.push(page.name().to_string());
    let _ = page.save_screenshot(Some(START_SCREENSHOT)).await?;
    for step in &case.steps {
        page = step.take(&mut page).await?;
        pages.push(page.name().to_string());
        let _ = page.save_screenshot(Some(&step.screenshot_label())).await?;
    }
    Ok(())
}

async fn failure_screenshot(ctx: &TestContext, tab: &SharedTab, case: &str) {
    let label = format!("failure {case}");
    match tab.screenshot().await {
        Ok(png) => {
            if let Err(e) = ctx.sink().write_screenshot(&png, &label) {
                tracing::warn!("could not save failure screenshot: {e}");
            }
        }
        Err(e) => tracing::warn!("could not take failure screenshot: {e}"),
    }
}

/// Runs test cases one after another
#[derive(Debug)]
pub struct ScenarioRunner {
    config: CliConfig,
    run_config: RunConfig,
    reporter: ProgressReporter,
}

impl ScenarioRunner {
    /// Create a runner
    #[must_use]
    pub fn new(config: CliConfig, run_config: RunConfig) -> Self {
        let reporter =
            ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
        Self {
            config,
            run_config,
            reporter,
        }
    }

    /// Run configuration handed to every case
    #[must_use]
    pub const fn run_config(&self) -> &RunConfig {
        &self.run_config
    }

    /// Run cases into a fresh run folder
    ///
    /// A failing case is reported and the run moves on to the next one.
    ///
    /// # Errors
    ///
    /// Returns errors that prevent cases from running at all: output folders
    /// that cannot be created, logs that cannot be opened, tabs that cannot be
    /// opened.
    pub async fn run(
        &mut self,
        app: &Arc<Application>,
        run: &TestRun,
        tabs: &TabSource,
        cases: &[TestCase],
    ) -> CliResult<RunSummary> {
        let start = Instant::now();
        let mut summary = RunSummary {
            run_dir: run.dir().to_path_buf(),
            ..RunSummary::default()
        };
        self.reporter.info(&format!(
            "{} test cases on {} ({}, {}), output in {}",
            cases.len(),
            app.domain(),
            self.run_config.tier,
            self.run_config.browser,
            run.dir().display()
        ));
        self.reporter.start_progress(cases.len() as u64, "running");

        for case in cases {
            let result = self.run_case(app, run, tabs, case).await?;
            let pages = result.pages.join(" -> ");
            match result.error {
                None if self.config.verbosity.is_verbose() => {
                    self.reporter.success(&format!("{}: {pages}", result.name));
                }
                None => self.reporter.success(&result.name),
                Some(ref error) => self.reporter.failure(&format!("{}: {error}", result.name)),
            }
            self.reporter.advance(&case.name);
            summary.results.push(result);
        }

        self.reporter.finish();
        summary.duration = start.elapsed();
        self.reporter
            .summary(summary.passed(), summary.failed(), summary.duration);
        Ok(summary)
    }

    async fn run_case(
        &self,
        app: &Arc<Application>,
        run: &TestRun,
        tabs: &TabSource,
        case: &TestCase,
    ) -> CliResult<CaseResult> {
        let start = Instant::now();
        let dirs = run.test_case(&case.name, self.run_config.browser)?;
        let folder = dirs.root().to_path_buf();
        let _log = TestCaseLog::start(&dirs.log_path())?;
        tracing::info!("test case {} starts", case.name);

        let ctx = Arc::new(TestContext::for_test_case(self.run_config.clone(), dirs));
        let tab = tabs.open(app).await?;

        let mut pages = Vec::new();
        let outcome = run_steps(app, &ctx, &tab, case, &mut pages).await;
        let error = match outcome {
            Ok(()) => {
                tracing::info!("test case {} passed", case.name);
                None
            }
            Err(e) => {
                tracing::error!("test case {} failed: {e}", case.name);
                failure_screenshot(&ctx, &tab, &case.name).await;
                Some(e.to_string())
            }
        };

        Ok(CaseResult {
            name: case.name.clone(),
            passed: error.is_none(),
            error,
            pages,
            folder,
            duration: start.elapsed(),
        })
    }
}

/// Run configuration from the command line
#[must_use]
pub fn run_config(args: &RunArgs) -> RunConfig {
    RunConfig::new()
        .with_tier(args.tier.into())
        .with_browser(args.browser.into())
        .with_trace_screenshots(args.tracing.is_on())
        .with_output_root(&args.output)
        .with_verification(LoadVerification::with_wait(
            WaitOptions::new().with_timeout(args.timeout),
        ))
}

/// Execute the `run` command
///
/// # Errors
///
/// Returns setup errors, and [`CliError::CasesFailed`] when any case failed.
pub async fn execute(config: CliConfig, args: &RunArgs) -> CliResult<RunSummary> {
    let run_config = run_config(args);
    let run = TestRun::start(&run_config.output_root)?;
    let _ = init_run_logging(Some(&run.log_path()), config.verbosity.is_verbose())?;

    let app = sweetshop::application(run_config.tier)?;
    let cases = scenarios::cases(args.scenario);
    let tabs = TabSource::for_args(args).await?;

    let mut runner = ScenarioRunner::new(config, run_config);
    let summary = runner.run(&app, &run, &tabs, &cases).await;
    tabs.close().await?;
    let summary = summary?;

    if summary.all_passed() {
        Ok(summary)
    } else {
        Err(CliError::CasesFailed {
            failed: summary.failed(),
            total: summary.results.len(),
        })
    }
}
