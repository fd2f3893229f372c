//! Invoice models.

use serde::{Deserialize, Serialize};

/// Receiver code used when the merchant does not identify the payer.
pub const DEFAULT_RECEIVER_CODE: &str = "terminal";

/// Request body for `POST /v2/invoice` (simple invoice).
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceRequest {
    pub invoice_code: String,
    pub sender_invoice_no: String,
    pub invoice_receiver_code: String,
    pub invoice_description: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

impl InvoiceRequest {
    /// Builds a simple invoice request.
    ///
    /// The gateway requires a description, so the order number is used when
    /// none is given.
    pub fn simple(
        invoice_code: impl Into<String>,
        sender_invoice_no: impl Into<String>,
        amount: f64,
        description: Option<String>,
        callback_url: Option<String>,
    ) -> Self {
        let sender_invoice_no = sender_invoice_no.into();
        Self {
            invoice_code: invoice_code.into(),
            invoice_description: description.unwrap_or_else(|| sender_invoice_no.clone()),
            sender_invoice_no,
            invoice_receiver_code: DEFAULT_RECEIVER_CODE.to_string(),
            amount,
            callback_url: callback_url.filter(|url| !url.is_empty()),
        }
    }
}

/// A created invoice as returned by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(alias = "invoiceId")]
    pub invoice_id: String,
    #[serde(default, alias = "qrText")]
    pub qr_text: Option<String>,
    #[serde(default, rename = "qPay_shortUrl", alias = "qPayShortUrl")]
    pub short_url: Option<String>,
    #[serde(default)]
    pub urls: Vec<BankLink>,
}

/// Deep link into a bank or wallet app for paying an invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankLink {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    pub link: String,
}
