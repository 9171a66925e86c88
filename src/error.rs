//! Error types for the rate aggregator
//!
//! Ingestion, emission and reset never fail. Errors only surface at the
//! configuration boundary.

use thiserror::Error;

/// Result type alias for rate aggregator operations
pub type Result<T> = std::result::Result<T, RateError>;

/// Main error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RateError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while loading or validating a [`RateConfig`](crate::RateConfig)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Configuration text could not be deserialized
    #[error("Invalid configuration at line {line}, column {column}: {reason}")]
    Parse {
        line: usize,
        column: usize,
        reason: String,
    },

    /// Field is listed both as a rate field and as a bit-rate field
    #[error("Field '{0}' is listed in both rate_fields and bitrate_fields")]
    AmbiguousField(String),

    /// No metric names configured
    #[error("No metric names configured")]
    EmptyMetrics,
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse {
            line: err.line(),
            column: err.column(),
            reason: err.to_string(),
        }
    }
}
