//! Bounded polling for post-navigation verification.
//!
//! A click that triggers navigation returns before the browser has finished
//! leaving the old document. Verification polls the tab until a condition
//! holds or the timeout elapses; the caller decides which error a timeout maps
//! to.

use crate::result::HeofonResult;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for verification polls (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// LOAD VERIFICATION
// =============================================================================

/// Whether transitions check that the browser left the old page and reached
/// the new one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadVerification {
    /// Verification on or off
    pub enabled: bool,
    /// Poll bounds for both the unload and the load check
    pub wait: WaitOptions,
}

impl Default for LoadVerification {
    fn default() -> Self {
        Self {
            enabled: true,
            wait: WaitOptions::default(),
        }
    }
}

impl LoadVerification {
    /// Verification with custom poll bounds
    #[must_use]
    pub const fn with_wait(wait: WaitOptions) -> Self {
        Self {
            enabled: true,
            wait,
        }
    }

    /// No verification; transitions trust the click
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            wait: WaitOptions::default(),
        }
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a wait operation
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Whether the wait was successful
    pub success: bool,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
}

impl WaitResult {
    /// Create a successful wait result
    #[must_use]
    pub fn success(elapsed: Duration, waited_for: impl Into<String>) -> Self {
        Self {
            success: true,
            elapsed,
            waited_for: waited_for.into(),
        }
    }

    /// Create a timeout wait result
    #[must_use]
    pub fn timeout(elapsed: Duration, waited_for: impl Into<String>) -> Self {
        Self {
            success: false,
            elapsed,
            waited_for: waited_for.into(),
        }
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll an async condition until it holds or the timeout elapses
///
/// The condition is checked at least once. A timeout is reported as an
/// unsuccessful [`WaitResult`], not as an error.
///
/// # Errors
///
/// Propagates the first error the condition itself returns.
pub async fn poll_until<F, Fut>(
    options: &WaitOptions,
    waited_for: &str,
    mut condition: F,
) -> HeofonResult<WaitResult>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = HeofonResult<bool>>,
{
    let start = Instant::now();
    loop {
        if condition().await? {
            return Ok(WaitResult::success(start.elapsed(), waited_for));
        }
        if start.elapsed() >= options.timeout() {
            tracing::debug!("timed out after {:?} waiting for {waited_for}", start.elapsed());
            return Ok(WaitResult::timeout(start.elapsed(), waited_for));
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::HeofonError;
    use std::sync::atomic::{AtomicU32, Ordering};

    mod options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let opts = WaitOptions::new();
            assert_eq!(opts.timeout(), Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS));
            assert_eq!(
                opts.poll_interval(),
                Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)
            );
        }

        #[test]
        fn test_builder() {
            let opts = WaitOptions::new().with_timeout(200).with_poll_interval(5);
            assert_eq!(opts.timeout_ms, 200);
            assert_eq!(opts.poll_interval_ms, 5);
        }

        #[test]
        fn test_verification_enabled_by_default() {
            assert!(LoadVerification::default().enabled);
            assert!(!LoadVerification::disabled().enabled);
        }
    }

    mod poll_tests {
        use super::*;

        #[tokio::test]
        async fn test_succeeds_once_condition_holds() {
            let calls = AtomicU32::new(0);
            let opts = WaitOptions::new().with_timeout(1_000).with_poll_interval(1);
            let result = poll_until(&opts, "third call", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok(n >= 2) }
            })
            .await
            .unwrap();
            assert!(result.success);
            assert_eq!(calls.load(Ordering::SeqCst), 3);
        }

        #[tokio::test]
        async fn test_times_out() {
            let opts = WaitOptions::new().with_timeout(20).with_poll_interval(5);
            let result = poll_until(&opts, "never", || async { Ok(false) })
                .await
                .unwrap();
            assert!(!result.success);
            assert_eq!(result.waited_for, "never");
            assert!(result.elapsed >= Duration::from_millis(20));
        }

        #[tokio::test]
        async fn test_condition_error_propagates() {
            let opts = WaitOptions::new().with_timeout(20).with_poll_interval(5);
            let err = poll_until(&opts, "broken", || async {
                Err(HeofonError::browser("tab closed"))
            })
            .await
            .unwrap_err();
            assert!(matches!(err, HeofonError::Browser { .. }));
        }
    }
}
