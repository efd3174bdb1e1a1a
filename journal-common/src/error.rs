//! Error types for the journal service.

use thiserror::Error;

/// Result type alias using the journal error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the journal service.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Resource not found. The message is surfaced verbatim as the
    /// response detail.
    #[error("{0}")]
    NotFound(String),

    /// Invalid input or request. The message is surfaced verbatim as the
    /// response detail.
    #[error("{0}")]
    InvalidInput(String),

    /// External service error
    #[error("External service error: {0}")]
    External(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Get HTTP status code for this error.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::InvalidInput(_) => 400,
            _ => 500,
        }
    }
}
