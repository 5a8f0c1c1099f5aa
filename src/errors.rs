//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the fixture fetcher, providing the error types
//! used by all components together with the transient/permanent classification
//! that drives the retry policy.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from transport, cache, parsing, and configuration
//! - **Output**: Structured error types with context
//! - **Error Categories**: Transport, Cache, Parsing, Configuration
//!
//! ## Key Features
//! - Transient vs permanent classification for retry decisions
//! - Automatic conversion from transport and I/O errors
//! - Error category labels for logging

use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, FetchError>;

/// Error types for the fixture fetch pipeline
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level failures (connection reset, DNS, protocol errors)
    #[error("transport error: {details}")]
    Transport { details: String },

    /// The HTTP attempt exceeded the configured timeout
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-success status code
    #[error("HTTP status {status}")]
    HttpStatus { status: u16 },

    /// The server answered 2xx but the body was empty
    #[error("empty response body")]
    EmptyPayload,

    /// The request could not be constructed (malformed URL, bad headers)
    #[error("invalid request: {details}")]
    InvalidRequest { details: String },

    /// Cache read/write failures
    #[error("cache error: {details}")]
    Cache { details: String },

    /// Malformed XML payload
    #[error("failed to parse XML payload: {details}")]
    XmlParse { details: String },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("validation failed for field '{field}': {reason}")]
    ValidationFailed { field: String, reason: String },

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Check whether the error is transient and the request worth retrying.
    ///
    /// Timeouts, connection failures, rate-limit responses, server errors, and
    /// empty bodies are treated as temporary conditions. Client errors and
    /// anything structural (bad URL, bad configuration) short-circuit.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport { .. } | FetchError::Timeout | FetchError::EmptyPayload => true,
            FetchError::HttpStatus { status } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            FetchError::Transport { .. }
            | FetchError::Timeout
            | FetchError::HttpStatus { .. }
            | FetchError::EmptyPayload
            | FetchError::InvalidRequest { .. } => "transport",
            FetchError::Cache { .. } => "cache",
            FetchError::XmlParse { .. } => "parsing",
            FetchError::Config { .. } | FetchError::ValidationFailed { .. } => "configuration",
            FetchError::Io(_) => "io",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_builder() {
            FetchError::InvalidRequest {
                details: err.to_string(),
            }
        } else {
            FetchError::Transport {
                details: err.to_string(),
            }
        }
    }
}

impl From<quick_xml::Error> for FetchError {
    fn from(err: quick_xml::Error) -> Self {
        FetchError::XmlParse {
            details: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(FetchError::Timeout.is_transient());
        assert!(FetchError::EmptyPayload.is_transient());
        assert!(FetchError::Transport {
            details: "connection reset".to_string()
        }
        .is_transient());
        assert!(FetchError::HttpStatus { status: 500 }.is_transient());
        assert!(FetchError::HttpStatus { status: 503 }.is_transient());
        assert!(FetchError::HttpStatus { status: 429 }.is_transient());
    }

    #[test]
    fn test_permanent_classification() {
        assert!(!FetchError::HttpStatus { status: 404 }.is_transient());
        assert!(!FetchError::HttpStatus { status: 400 }.is_transient());
        assert!(!FetchError::InvalidRequest {
            details: "relative URL".to_string()
        }
        .is_transient());
        assert!(!FetchError::Config {
            message: "bad".to_string()
        }
        .is_transient());
        assert!(!FetchError::XmlParse {
            details: "truncated".to_string()
        }
        .is_transient());
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(FetchError::Timeout.category(), "transport");
        assert_eq!(
            FetchError::Cache {
                details: "disk full".to_string()
            }
            .category(),
            "cache"
        );
        assert_eq!(
            FetchError::ValidationFailed {
                field: "max_workers".to_string(),
                reason: "out of range".to_string()
            }
            .category(),
            "configuration"
        );
    }
}
