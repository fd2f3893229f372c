//! Re-verification of payment notifications against the gateway.
//!
//! Inbound notifications are unsigned, so their content is never taken as
//! proof of payment. The only authoritative signal is a fresh payment check
//! for the invoice the notification names.

use std::sync::Arc;

use crate::client::PaymentGateway;
use crate::models::{PaymentCheckRequest, PaymentRow};

use super::NotificationBody;

/// Outcome of verifying one notification.
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    /// The notification named no invoice, so nothing was queried.
    Skipped,
    /// The gateway reported at least one payment; the first is kept.
    Paid(PaymentRow),
    /// The gateway reported no payments.
    Unpaid,
    /// The payment check itself failed.
    Failed(String),
}

impl Verification {
    pub fn is_paid(&self) -> bool {
        matches!(self, Verification::Paid(_))
    }
}

/// Verifies notifications with a payment check per invoice.
#[derive(Clone)]
pub struct Verifier {
    gateway: Arc<dyn PaymentGateway>,
}

impl Verifier {
    /// Creates a verifier backed by the given gateway.
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { gateway }
    }

    /// Verifies a decoded notification.
    pub async fn verify(&self, body: &NotificationBody) -> Verification {
        match body.invoice_id() {
            Some(invoice_id) => self.verify_invoice(&invoice_id).await,
            None => {
                tracing::debug!("Notification has no invoice id, skipping verification");
                Verification::Skipped
            }
        }
    }

    /// Checks whether an invoice has been paid.
    pub async fn verify_invoice(&self, invoice_id: &str) -> Verification {
        let request = PaymentCheckRequest::invoice(invoice_id);

        match self.gateway.check_payment(&request).await {
            Ok(response) => match response.rows.into_iter().next() {
                Some(payment) => {
                    tracing::debug!("Invoice {} verified as paid", invoice_id);
                    Verification::Paid(payment)
                }
                None => {
                    tracing::debug!("Invoice {} has no payments", invoice_id);
                    Verification::Unpaid
                }
            },
            Err(e) => {
                tracing::warn!("Payment check for invoice {} failed: {}", invoice_id, e);
                Verification::Failed(e.to_string())
            }
        }
    }
}
