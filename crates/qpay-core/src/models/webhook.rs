//! Webhook event models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::webhook::{NotificationBody, Verification};

use super::PaymentRow;

/// Payment status reported back to the notification sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Unpaid => "unpaid",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One received notification and the outcome of verifying it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    /// Time the notification was received.
    pub timestamp: DateTime<Utc>,
    /// Invoice named by the notification, empty if none.
    pub invoice_id: String,
    pub body: NotificationBody,
    /// True only when the gateway reported a matching payment.
    pub verified: bool,
    pub payment: Option<PaymentRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookEvent {
    /// Builds the event for a notification received at `timestamp`.
    pub fn new(timestamp: DateTime<Utc>, body: NotificationBody, verification: Verification) -> Self {
        let invoice_id = body.invoice_id().unwrap_or_default();
        let (verified, payment, error) = match verification {
            Verification::Paid(row) => (true, Some(row), None),
            Verification::Unpaid | Verification::Skipped => (false, None, None),
            Verification::Failed(message) => (false, None, Some(message)),
        };

        Self {
            timestamp,
            invoice_id,
            body,
            verified,
            payment,
            error,
        }
    }

    pub fn status(&self) -> PaymentStatus {
        if self.verified {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Unpaid
        }
    }
}
