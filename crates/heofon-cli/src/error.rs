//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// One or more test cases failed
    #[error("{failed} of {total} test cases failed")]
    CasesFailed {
        /// Failed cases
        failed: usize,
        /// All cases
        total: usize,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Heofon library error
    #[error("Heofon error: {0}")]
    Heofon(#[from] heofon::HeofonError),

    /// JSON output error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CliError::config("no browser");
        assert!(err.to_string().contains("Configuration"));
        assert!(err.to_string().contains("no browser"));
    }

    #[test]
    fn test_cases_failed() {
        let err = CliError::CasesFailed {
            failed: 2,
            total: 6,
        };
        assert_eq!(err.to_string(), "2 of 6 test cases failed");
    }

    #[test]
    fn test_heofon_error_from() {
        let err: CliError = heofon::HeofonError::config("bad routing").into();
        assert!(err.to_string().contains("bad routing"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.to_string().contains("I/O"));
    }
}
