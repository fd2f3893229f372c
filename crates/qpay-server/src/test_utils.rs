//! Test utilities for qpay-server integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use qpay_core::models::{PaymentCheckRequest, PaymentCheckResponse, PaymentRow};
use qpay_core::webhook::Verifier;
use qpay_core::{PaymentGateway, QpayError};

use crate::listener::router;
use crate::state::AppState;

/// Port reported on the dashboard in router-level tests.
pub const TEST_PORT: u16 = 4040;

/// Scripted answer for one invoice.
#[derive(Debug, Clone)]
pub enum GatewayReply {
    Rows(Vec<PaymentRow>),
    TransportError(String),
}

/// Payment gateway that answers from a script and records every request.
///
/// Invoices without a scripted reply have no payments.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    replies: Mutex<HashMap<String, GatewayReply>>,
    requests: Mutex<Vec<PaymentCheckRequest>>,
}

impl ScriptedGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Reports one payment of `amount` for the invoice.
    pub fn paid(&self, invoice_id: &str, amount: f64) {
        let row = PaymentRow {
            payment_id: Some(format!("PAY-{}", invoice_id)),
            amount: Some(amount),
            paid_date: Some("2026-10-18T10:00:00".to_string()),
            payment_method: Some("QPAY".to_string()),
            payment_status: Some("PAID".to_string()),
            ..Default::default()
        };
        self.reply(invoice_id, GatewayReply::Rows(vec![row]));
    }

    /// Makes payment checks for the invoice fail.
    pub fn fail(&self, invoice_id: &str, message: &str) {
        self.reply(invoice_id, GatewayReply::TransportError(message.to_string()));
    }

    pub fn reply(&self, invoice_id: &str, reply: GatewayReply) {
        self.replies
            .lock()
            .unwrap()
            .insert(invoice_id.to_string(), reply);
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<PaymentCheckRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn check_payment(
        &self,
        request: &PaymentCheckRequest,
    ) -> qpay_core::Result<PaymentCheckResponse> {
        self.requests.lock().unwrap().push(request.clone());

        let reply = self.replies.lock().unwrap().get(&request.object_id).cloned();
        match reply {
            Some(GatewayReply::Rows(rows)) => Ok(PaymentCheckResponse {
                count: Some(rows.len() as u64),
                paid_amount: rows.iter().filter_map(|r| r.amount).reduce(|a, b| a + b),
                rows,
            }),
            Some(GatewayReply::TransportError(message)) => Err(QpayError::Transport(message)),
            None => Ok(PaymentCheckResponse::default()),
        }
    }
}

/// Creates the listener router backed by a scripted gateway.
pub fn create_test_app(gateway: Arc<ScriptedGateway>) -> (Router, AppState) {
    let state = AppState::new(Verifier::new(gateway), TEST_PORT);
    (router(state.clone()), state)
}
