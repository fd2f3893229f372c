//! Error types for the webhook listener.

use std::net::SocketAddr;

use thiserror::Error;

/// Listener startup and serve errors.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind webhook listener to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Webhook listener failed: {0}")]
    Serve(#[from] std::io::Error),
}

/// Result type alias for listener operations.
pub type Result<T> = std::result::Result<T, ServerError>;
