//! Error types for roomcast.

use thiserror::Error;

/// Common error type for roomcast.
#[derive(Error, Debug)]
pub enum RelayError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON encoding error for outbound frames.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for roomcast operations.
pub type Result<T> = std::result::Result<T, RelayError>;
