//! Webhook listener command.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Subcommand;
use qpay_core::webhook::Verifier;
use qpay_server::{DEFAULT_PORT, Listener, report};

use super::{GlobalOpts, build_client};

#[derive(Subcommand)]
pub enum WebhookCommands {
    /// Start a local webhook listener
    Listen {
        /// Port to listen on
        #[arg(default_value_t = DEFAULT_PORT)]
        port: u16,
    },
}

pub async fn handle_webhook_command(opts: GlobalOpts, cmd: WebhookCommands) -> Result<()> {
    match cmd {
        WebhookCommands::Listen { port } => listen(opts, port).await,
    }
}

async fn listen(opts: GlobalOpts, port: u16) -> Result<()> {
    let client = build_client(opts)?;
    let verifier = Verifier::new(Arc::new(client));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = Listener::bind(addr, verifier).await?;
    let port = listener
        .local_addr()
        .context("Failed to read listener address")?
        .port();

    report::print_banner(port);

    let count = listener.serve().await?;
    println!();
    println!("  {}", report::shutdown_summary(count));

    Ok(())
}
