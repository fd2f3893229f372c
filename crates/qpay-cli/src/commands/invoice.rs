//! Invoice commands.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Subcommand;
use qpay_core::models::{Invoice, InvoiceRequest};
use serde::Serialize;

use super::{GlobalOpts, build_client};
use crate::config;
use crate::output::{print_json, print_key_value, print_object, print_section, print_success};

#[derive(Subcommand)]
pub enum InvoiceCommands {
    /// Create a new invoice
    Create {
        /// Invoice amount
        #[arg(long, short)]
        amount: f64,

        /// Invoice description (defaults to the order number)
        #[arg(long, short)]
        description: Option<String>,

        /// Sender invoice number / order ID
        #[arg(long, short)]
        order: Option<String>,

        /// Merchant invoice code (overrides QPAY_INVOICE_CODE)
        #[arg(long)]
        code: Option<String>,

        /// Callback URL for payment notifications (overrides QPAY_CALLBACK_URL)
        #[arg(long)]
        callback: Option<String>,
    },

    /// Get invoice details
    Get {
        /// Invoice ID
        id: String,
    },

    /// Cancel an invoice
    Cancel {
        /// Invoice ID
        id: String,
    },

    /// List recent invoices
    List,
}

/// Summary of a created invoice.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedInvoice {
    invoice_id: String,
    qr_text: Option<String>,
    #[serde(rename = "qPayShortUrl")]
    short_url: Option<String>,
    amount: f64,
    sender_invoice_no: String,
    urls: String,
}

impl CreatedInvoice {
    fn new(invoice: Invoice, request: &InvoiceRequest) -> Self {
        Self {
            invoice_id: invoice.invoice_id,
            qr_text: invoice.qr_text,
            short_url: invoice.short_url,
            amount: request.amount,
            sender_invoice_no: request.sender_invoice_no.clone(),
            urls: format!("{} bank links", invoice.urls.len()),
        }
    }
}

pub async fn handle_invoice_command(opts: GlobalOpts, cmd: InvoiceCommands) -> Result<()> {
    match cmd {
        InvoiceCommands::Create {
            amount,
            description,
            order,
            code,
            callback,
        } => create_invoice(opts, amount, description, order, code, callback).await,
        InvoiceCommands::Get { id } => get_invoice(opts, &id).await,
        InvoiceCommands::Cancel { id } => cancel_invoice(opts, &id).await,
        InvoiceCommands::List => list_invoices(opts),
    }
}

/// Builds the request from flags and configuration.
fn build_request(
    resolved: &config::ResolvedConfig,
    amount: f64,
    description: Option<String>,
    order: Option<String>,
    code: Option<String>,
    callback: Option<String>,
) -> Result<InvoiceRequest> {
    if !amount.is_finite() || amount <= 0.0 {
        bail!("Amount must be a positive number. Use --amount or -a flag.");
    }

    let invoice_code = code
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| resolved.invoice_code.clone());
    if invoice_code.is_empty() {
        bail!("Invoice code is required. Use --code flag or set QPAY_INVOICE_CODE.");
    }

    let order = order.unwrap_or_else(|| format!("CLI-{}", Utc::now().timestamp_millis()));
    let callback = callback.or_else(|| Some(resolved.callback_url.clone()));

    Ok(InvoiceRequest::simple(invoice_code, order, amount, description, callback))
}

async fn create_invoice(
    opts: GlobalOpts,
    amount: f64,
    description: Option<String>,
    order: Option<String>,
    code: Option<String>,
    callback: Option<String>,
) -> Result<()> {
    let resolved = config::load(opts.sandbox)?;
    let request = build_request(&resolved, amount, description, order, code, callback)?;

    let client = build_client(opts)?;
    let invoice = client
        .create_simple_invoice(&request)
        .await
        .context("Failed to create invoice")?;

    let created = CreatedInvoice::new(invoice, &request);
    if opts.json {
        return print_json(&created);
    }

    println!();
    print_success("Invoice created successfully!");
    println!();
    print_key_value("Invoice Id", &created.invoice_id);
    print_key_value("QR Text", created.qr_text.as_deref().unwrap_or(""));
    print_key_value("QPay Short Url", created.short_url.as_deref().unwrap_or(""));
    print_key_value("Amount", &created.amount.to_string());
    print_key_value("Sender Invoice No", &created.sender_invoice_no);
    print_key_value("Urls", &created.urls);

    Ok(())
}

async fn get_invoice(opts: GlobalOpts, id: &str) -> Result<()> {
    let client = build_client(opts)?;
    let invoice = client
        .get_invoice(id)
        .await
        .with_context(|| format!("Failed to get invoice {}", id))?;

    if opts.json {
        return print_json(&invoice);
    }

    print_section(&format!("Invoice {}", id));
    print_object(&invoice);
    Ok(())
}

async fn cancel_invoice(opts: GlobalOpts, id: &str) -> Result<()> {
    let client = build_client(opts)?;
    client
        .cancel_invoice(id)
        .await
        .with_context(|| format!("Failed to cancel invoice {}", id))?;

    if opts.json {
        return print_json(&serde_json::json!({"cancelled": true, "invoiceId": id}));
    }

    print_success(&format!("Invoice {} cancelled.", id));
    Ok(())
}

fn list_invoices(opts: GlobalOpts) -> Result<()> {
    let message = "Invoice list is not supported by the QPay V2 API. Use invoice IDs from your records.";
    if opts.json {
        return print_json(&serde_json::json!({"message": message}));
    }
    println!("  {}", message);
    Ok(())
}
