//! Error types for the apitrail SDK
//!
//! Configuration problems are loud and surface at construction time, before
//! any request is served. Sink failures are quiet: they are caught at the
//! dispatch site and the response path never observes them.

use thiserror::Error;

/// Raised while building a [`Config`](crate::Config).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The redaction substitute marker must be a JSON string
    #[error("cleaned substitute must be a string, got {0}")]
    NonStringSubstitute(serde_json::Value),

    /// An environment variable held an unparseable value
    #[error("invalid value {value:?} for {name}")]
    InvalidEnv { name: String, value: String },
}

/// Failure reported by a log sink's persist call.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Network-related errors (connection, DNS, timeout)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Collector answered with a non-success status code
    #[error("record rejected: HTTP {0}")]
    Rejected(reqwest::StatusCode),

    /// Record could not be serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Catch-all for sink-specific failures
    #[error("sink error: {0}")]
    Sink(String),
}

impl SinkError {
    /// Create a sink-specific error from any message
    pub fn message(msg: impl Into<String>) -> Self {
        SinkError::Sink(msg.into())
    }
}
