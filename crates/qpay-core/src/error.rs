//! Error types for the QPay core library.

use thiserror::Error;

/// Core error type for gateway and webhook operations.
#[derive(Error, Debug)]
pub enum QpayError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Request to QPay failed: {0}")]
    Transport(String),

    #[error("QPay API error {status}: {message}")]
    Gateway { status: u16, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<reqwest::Error> for QpayError {
    fn from(err: reqwest::Error) -> Self {
        QpayError::Transport(err.to_string())
    }
}

/// Result type alias for QPay operations.
pub type Result<T> = std::result::Result<T, QpayError>;
