//! CLI command implementations.

pub mod config;
pub mod invoice;
pub mod payment;
pub mod setup;
pub mod webhook;

use anyhow::Result;
use qpay_core::QPayClient;

use crate::config as cli_config;

/// Flags shared by every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalOpts {
    /// Print machine-readable JSON.
    pub json: bool,
    /// Talk to the sandbox environment.
    pub sandbox: bool,
}

/// Creates a gateway client from the resolved configuration.
pub fn build_client(opts: GlobalOpts) -> Result<QPayClient> {
    let resolved = cli_config::load(opts.sandbox)?;
    let client = QPayClient::new(resolved.client_config()?)?;
    tracing::debug!("Using QPay API at {}", client.base_url());
    Ok(client)
}
