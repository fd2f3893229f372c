//! Payment commands.

use anyhow::{Context, Result};
use clap::Subcommand;
use console::style;
use qpay_core::PaymentGateway;
use qpay_core::models::{PaymentCheckRequest, PaymentCheckResponse, PaymentRow};
use serde::Serialize;

use super::{GlobalOpts, build_client};
use crate::output::{print_json, print_key_value};

#[derive(Subcommand)]
pub enum PaymentCommands {
    /// Check payment status for an invoice
    Check {
        /// Invoice ID
        id: String,
    },
}

/// Machine-readable payment check result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentCheckOutput<'a> {
    paid: bool,
    invoice_id: &'a str,
    payments: &'a [PaymentRow],
}

pub async fn handle_payment_command(opts: GlobalOpts, cmd: PaymentCommands) -> Result<()> {
    match cmd {
        PaymentCommands::Check { id } => check_payment(opts, &id).await,
    }
}

async fn check_payment(opts: GlobalOpts, invoice_id: &str) -> Result<()> {
    let client = build_client(opts)?;
    let response = client
        .check_payment(&PaymentCheckRequest::invoice(invoice_id))
        .await
        .with_context(|| format!("Failed to check payment for invoice {}", invoice_id))?;

    if opts.json {
        return print_json(&PaymentCheckOutput {
            paid: response.is_paid(),
            invoice_id,
            payments: &response.rows,
        });
    }

    print_status(invoice_id, &response);
    Ok(())
}

fn print_status(invoice_id: &str, response: &PaymentCheckResponse) {
    match response.rows.first() {
        Some(payment) => {
            print_key_value("Status", &style("PAID").green().bold().to_string());
            print_key_value("Invoice Id", invoice_id);
            print_key_value("Payment Id", payment.payment_id.as_deref().unwrap_or(""));
            print_key_value(
                "Amount",
                &payment.amount.map(|a| a.to_string()).unwrap_or_default(),
            );
            print_key_value("Paid At", payment.paid_date.as_deref().unwrap_or(""));
            print_key_value("Method", payment.payment_method.as_deref().unwrap_or(""));
        }
        None => {
            print_key_value("Status", &style("UNPAID").yellow().bold().to_string());
            print_key_value("Invoice Id", invoice_id);
        }
    }
}
