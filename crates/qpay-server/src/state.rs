//! Application state for the webhook listener.

use std::collections::VecDeque;
use std::sync::Arc;

use qpay_core::models::WebhookEvent;
use qpay_core::webhook::Verifier;
use tokio::sync::RwLock;

/// In-memory log of received events, newest first.
///
/// Events are only ever prepended, never modified or evicted. Position
/// reflects the order in which verification completed; `timestamp` holds
/// the order of arrival.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Arc<RwLock<VecDeque<WebhookEvent>>>,
}

impl EventStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an event as the most recent one.
    pub async fn append(&self, event: WebhookEvent) {
        self.events.write().await.push_front(event);
    }

    /// Returns all events, newest first.
    pub async fn all(&self) -> Vec<WebhookEvent> {
        self.events.read().await.iter().cloned().collect()
    }

    /// Returns the number of events received.
    pub async fn count(&self) -> usize {
        self.events.read().await.len()
    }
}

/// Shared listener state.
#[derive(Clone)]
pub struct AppState {
    /// Event log for this listener run.
    pub events: EventStore,
    /// Payment verifier.
    pub verifier: Verifier,
    /// Port shown on the dashboard.
    pub port: u16,
}

impl AppState {
    /// Creates state with an empty event log.
    pub fn new(verifier: Verifier, port: u16) -> Self {
        Self {
            events: EventStore::new(),
            verifier,
            port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use qpay_core::webhook::{NotificationBody, Verification};

    fn event(invoice_id: &str) -> WebhookEvent {
        let body = NotificationBody::decode(format!(r#"{{"invoice_id":"{}"}}"#, invoice_id).as_bytes());
        WebhookEvent::new(Utc::now(), body, Verification::Unpaid)
    }

    #[tokio::test]
    async fn test_store_starts_empty() {
        let store = EventStore::new();
        assert_eq!(store.count().await, 0);
        assert!(store.all().await.is_empty());
    }

    #[tokio::test]
    async fn test_newest_first() {
        let store = EventStore::new();
        store.append(event("A")).await;
        store.append(event("B")).await;
        store.append(event("C")).await;

        let ids: Vec<_> = store.all().await.into_iter().map(|e| e.invoice_id).collect();
        assert_eq!(ids, vec!["C", "B", "A"]);
        assert_eq!(store.count().await, 3);
    }

    #[tokio::test]
    async fn test_clones_share_log() {
        let store = EventStore::new();
        let other = store.clone();
        other.append(event("A")).await;
        assert_eq!(store.count().await, 1);
    }
}
