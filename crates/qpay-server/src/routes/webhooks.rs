//! Notification ingestion and event log endpoints.

use axum::{Json, body::Bytes, extract::State, response::IntoResponse};
use chrono::Utc;
use qpay_core::models::{PaymentStatus, WebhookEvent};
use qpay_core::webhook::NotificationBody;
use serde::Serialize;

use crate::report;
use crate::state::AppState;

/// Reply sent to the notification sender.
#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub status: PaymentStatus,
}

/// Handler for payment notifications.
///
/// POST / (or any path)
///
/// Always answers 200: undecodable bodies and failed payment checks are
/// recorded on the event rather than reported to the sender.
pub async fn receive_notification(
    State(state): State<AppState>,
    body: Bytes,
) -> Json<NotificationResponse> {
    let timestamp = Utc::now();
    let notification = NotificationBody::decode(&body);

    let verification = state.verifier.verify(&notification).await;
    let event = WebhookEvent::new(timestamp, notification, verification);

    tracing::info!(
        invoice_id = %event.invoice_id,
        verified = event.verified,
        failed = event.error.is_some(),
        "Recorded payment notification"
    );

    let status = event.status();
    let summary = report::event_summary(&event);
    state.events.append(event).await;
    println!("{}", summary);

    Json(NotificationResponse { status })
}

/// List received events, newest first.
///
/// GET /events
pub async fn list_events(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.events.all().await)
}
