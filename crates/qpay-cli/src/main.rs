use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;

use commands::{
    GlobalOpts,
    config::{ConfigCommands, handle_config_command},
    invoice::{InvoiceCommands, handle_invoice_command},
    payment::{PaymentCommands, handle_payment_command},
    setup::handle_setup,
    webhook::{WebhookCommands, handle_webhook_command},
};

#[derive(Parser)]
#[command(name = "qpay")]
#[command(version = qpay_core::VERSION)]
#[command(about = "CLI tool for the QPay V2 payment API", long_about = None)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Use the sandbox environment
    #[arg(long, global = true)]
    sandbox: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive credential setup
    Setup,

    /// Invoice management
    #[command(subcommand)]
    Invoice(InvoiceCommands),

    /// Payment status
    #[command(subcommand)]
    Payment(PaymentCommands),

    /// Local webhook listener
    #[command(subcommand)]
    Webhook(WebhookCommands),

    /// Show current configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Show version
    Version,
}

async fn run(cli: Cli) -> Result<()> {
    let opts = GlobalOpts {
        json: cli.json,
        sandbox: cli.sandbox,
    };

    match cli.command {
        Commands::Setup => handle_setup()?,
        Commands::Invoice(cmd) => handle_invoice_command(opts, cmd).await?,
        Commands::Payment(cmd) => handle_payment_command(opts, cmd).await?,
        Commands::Webhook(cmd) => handle_webhook_command(opts, cmd).await?,
        Commands::Config { command } => handle_config_command(opts, command)?,
        Commands::Version => println!("qpay-cli v{}", qpay_core::VERSION),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (doesn't override existing env vars)
    let _ = dotenvy::dotenv();

    // Diagnostics go to stderr; command output stays on stdout
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            if json {
                let _ = output::print_json(&serde_json::json!({ "error": format!("{:#}", e) }));
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_invoice_create() {
        let cli = Cli::try_parse_from([
            "qpay", "invoice", "create", "-a", "5000", "-o", "ORD-001", "--json",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Commands::Invoice(InvoiceCommands::Create { amount, order, .. }) => {
                assert_eq!(amount, 5000.0);
                assert_eq!(order.as_deref(), Some("ORD-001"));
            }
            _ => panic!("expected invoice create"),
        }
    }

    #[test]
    fn test_webhook_listen_default_port() {
        let cli = Cli::try_parse_from(["qpay", "webhook", "listen"]).unwrap();
        match cli.command {
            Commands::Webhook(WebhookCommands::Listen { port }) => assert_eq!(port, 4040),
            _ => panic!("expected webhook listen"),
        }

        let cli = Cli::try_parse_from(["qpay", "--sandbox", "webhook", "listen", "8080"]).unwrap();
        assert!(cli.sandbox);
        match cli.command {
            Commands::Webhook(WebhookCommands::Listen { port }) => assert_eq!(port, 8080),
            _ => panic!("expected webhook listen"),
        }
    }

    #[test]
    fn test_invoice_get_requires_id() {
        assert!(Cli::try_parse_from(["qpay", "invoice", "get"]).is_err());
        assert!(Cli::try_parse_from(["qpay", "payment", "check"]).is_err());
    }
}
