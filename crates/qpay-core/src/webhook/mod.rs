//! Webhook notification decoding and verification.

pub mod notification;
pub mod verifier;

pub use notification::*;
pub use verifier::*;
