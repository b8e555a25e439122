//! Result and error types for Heofon.

use crate::routing::AuthMode;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for Heofon operations
pub type HeofonResult<T> = Result<T, HeofonError>;

/// Errors that can occur while driving page objects
#[derive(Debug, Error)]
pub enum HeofonError {
    /// Invalid auth mode, malformed routing or navigation data
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// Target page id is not present in the table that was searched
    #[error("Unknown page '{page_id}' in the {table} routing table")]
    UnknownPage {
        /// Page id that was requested
        page_id: String,
        /// Table that was searched
        table: AuthMode,
    },

    /// Navigation label is not in the page's destination map
    #[error("Unknown destination '{label}' from page '{page}'")]
    UnknownDestination {
        /// Destination label that was requested
        label: String,
        /// Name of the page the navigation started from
        page: String,
    },

    /// The browser did not leave the previous page
    #[error("Page unload failed: {errors}")]
    PageUnload {
        /// Collected validation errors
        errors: String,
    },

    /// The browser did not arrive at the expected page
    #[error("Page load failed: {errors}")]
    PageLoad {
        /// Collected validation errors
        errors: String,
    },

    /// No element matched the selector
    #[error("Element not found: {selector}")]
    ElementNotFound {
        /// Selector that matched nothing
        selector: String,
    },

    /// Browser tab operation error
    #[error("Browser error: {message}")]
    Browser {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Writing a diagnostic artifact failed
    #[error("Failed to write artifact {path}: {source}")]
    ArtifactWrite {
        /// File that could not be written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl HeofonError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a browser error
    #[must_use]
    pub fn browser(message: impl Into<String>) -> Self {
        Self::Browser {
            message: message.into(),
        }
    }

    /// Whether this error came from post-navigation verification
    #[must_use]
    pub const fn is_verification_failure(&self) -> bool {
        matches!(self, Self::PageUnload { .. } | Self::PageLoad { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_page_names_id_and_table() {
        let err = HeofonError::UnknownPage {
            page_id: "sweetshop cart page".to_string(),
            table: AuthMode::Auth,
        };
        let msg = err.to_string();
        assert!(msg.contains("sweetshop cart page"));
        assert!(msg.contains("auth"));
    }

    #[test]
    fn test_verification_failure_kinds() {
        assert!(HeofonError::PageLoad {
            errors: String::new()
        }
        .is_verification_failure());
        assert!(HeofonError::PageUnload {
            errors: String::new()
        }
        .is_verification_failure());
        assert!(!HeofonError::config("x").is_verification_failure());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: HeofonError = io.into();
        assert!(matches!(err, HeofonError::Io(_)));
    }
}
