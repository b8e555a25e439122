//! Per-test context shared by every page object of one test.

use crate::artifacts::{ArtifactSink, ArtifactWriter};
use crate::config::RunConfig;
use crate::output::TestCaseDirs;
use std::sync::Arc;

/// Configuration and artifact sink of the running test
///
/// Replaces process-wide state: each test builds its own context, so tests
/// that own separate tabs do not share output folders.
#[derive(Debug, Clone)]
pub struct TestContext {
    config: RunConfig,
    sink: Arc<dyn ArtifactSink>,
}

impl TestContext {
    /// Create a context around any sink
    #[must_use]
    pub fn new(config: RunConfig, sink: Arc<dyn ArtifactSink>) -> Self {
        Self { config, sink }
    }

    /// Context writing artifacts into a test case's folders
    #[must_use]
    pub fn for_test_case(config: RunConfig, dirs: TestCaseDirs) -> Self {
        Self::new(config, Arc::new(ArtifactWriter::new(dirs)))
    }

    /// Run configuration
    #[must_use]
    pub const fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Artifact sink
    #[must_use]
    pub fn sink(&self) -> &dyn ArtifactSink {
        self.sink.as_ref()
    }
}
