//! QPay webhook listener library.
//!
//! Receives payment notifications, re-verifies each one against the QPay
//! payment check API, and serves the resulting event log as JSON and as a
//! polling dashboard.

pub mod error;
pub mod listener;
pub mod middleware;
pub mod report;
pub mod routes;
pub mod state;

pub use error::{Result, ServerError};
pub use listener::{
    DEFAULT_PORT, Listener, MAX_NOTIFICATION_SIZE, SHUTDOWN_GRACE_PERIOD, router, shutdown_signal,
};
pub use state::{AppState, EventStore};

// Re-export qpay_core for convenience
pub use qpay_core;

// Test utilities are available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
