//! QPay Core Library
//!
//! Gateway client, payment models and webhook verification shared by the
//! `qpay` CLI and the local webhook listener.

pub mod client;
pub mod error;
pub mod models;
pub mod webhook;

pub use client::{ClientConfig, PaymentGateway, QPayClient};
pub use error::{QpayError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Production merchant API.
pub const DEFAULT_BASE_URL: &str = "https://merchant.qpay.mn";

/// Sandbox merchant API.
pub const SANDBOX_BASE_URL: &str = "https://merchant-sandbox.qpay.mn";
