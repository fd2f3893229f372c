//! Data models for the QPay merchant API and the webhook event log.

pub mod invoice;
pub mod payment;
pub mod webhook;

pub use invoice::*;
pub use payment::*;
pub use webhook::*;
