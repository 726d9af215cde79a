//! Error types for the plan filtering system
//!
//! Policies themselves never fail. These errors cover the edges around
//! them: configuration, reading change sets and exporting metrics.

use thiserror::Error;

/// Result type alias for plan operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the plan filtering system
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors while reading or writing change sets
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Metrics registration or encoding errors
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
