//! Error types for the lead-finder library.
//!
//! This module provides custom error types using `thiserror` for better error handling
//! and more specific error messages throughout the application.

use thiserror::Error;

/// Errors that can occur in the lead-finder application.
#[derive(Error, Debug)]
pub enum LeadError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors raised while reading configuration sources
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// One or more required configuration sections are absent
    #[error("Missing config sections: {}", .0.join(", "))]
    MissingSections(Vec<String>),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A heuristic pattern failed to compile
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// General error with context
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Result with LeadError
pub type Result<T> = std::result::Result<T, LeadError>;

impl LeadError {
    /// I/O failure that further reads from the same source will repeat.
    ///
    /// Undecodable input (`InvalidData`) only spoils the current line.
    #[must_use]
    pub fn is_persistent_io(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() != std::io::ErrorKind::InvalidData)
    }
}

impl From<anyhow::Error> for LeadError {
    fn from(err: anyhow::Error) -> Self {
        LeadError::Other(err.to_string())
    }
}

/// Failure to deliver an outbound notification.
///
/// Delivery is best-effort: these never invalidate a stored row.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The transport asked us to back off
    #[error("rate limited, retry after {seconds}s")]
    RateLimited {
        /// Seconds the remote side asked to wait
        seconds: u64,
    },

    /// Any other remote failure
    #[error("remote error: {0}")]
    Remote(String),
}
