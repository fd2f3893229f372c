//! API integration tests for qpay-server.
//!
//! These tests drive the listener router with a scripted payment gateway.

use std::future::IntoFuture;
use std::sync::Arc;

use axum::http::{Method, StatusCode, header};
use axum_test::TestServer;
use qpay_core::models::ObjectType;
use qpay_server::MAX_NOTIFICATION_SIZE;
use qpay_server::test_utils::{ScriptedGateway, create_test_app};
use serde_json::{Value, json};

/// Helper to create a test server with its gateway.
fn create_server() -> (TestServer, Arc<ScriptedGateway>) {
    let gateway = ScriptedGateway::new();
    let (app, _state) = create_test_app(gateway.clone());
    let server = TestServer::new(app).expect("Failed to create test server");
    (server, gateway)
}

async fn events(server: &TestServer) -> Vec<Value> {
    let response = server.get("/events").await;
    response.assert_status_ok();
    response.json::<Vec<Value>>()
}

// =============================================================================
// Notification Tests
// =============================================================================

mod notifications {
    use super::*;

    #[tokio::test]
    async fn paid_invoice_is_verified() {
        let (server, gateway) = create_server();
        gateway.paid("INV123", 5000.0);

        let response = server.post("/").json(&json!({"invoice_id": "INV123"})).await;

        response.assert_status_ok();
        response.assert_json(&json!({"status": "paid"}));

        let events = events(&server).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["invoiceId"], "INV123");
        assert_eq!(events[0]["verified"], true);
        assert_eq!(events[0]["payment"]["amount"].as_f64(), Some(5000.0));
        assert!(events[0].get("error").is_none());
    }

    #[tokio::test]
    async fn unpaid_invoice_is_not_verified() {
        let (server, gateway) = create_server();

        let response = server.post("/").json(&json!({"invoiceId": "INV999"})).await;

        response.assert_status_ok();
        response.assert_json(&json!({"status": "unpaid"}));

        let events = events(&server).await;
        assert_eq!(events[0]["invoiceId"], "INV999");
        assert_eq!(events[0]["verified"], false);
        assert_eq!(events[0]["payment"], Value::Null);
        assert_eq!(gateway.requests().len(), 1);
    }

    #[tokio::test]
    async fn malformed_body_is_recorded_raw() {
        let (server, gateway) = create_server();

        let response = server.post("/").text("not json").await;

        response.assert_status_ok();
        response.assert_json(&json!({"status": "unpaid"}));

        let events = events(&server).await;
        assert_eq!(events[0]["body"]["raw"], "not json");
        assert_eq!(events[0]["invoiceId"], "");
        assert_eq!(events[0]["verified"], false);
        assert!(gateway.requests().is_empty());
    }

    #[tokio::test]
    async fn gateway_failure_is_recorded() {
        let (server, gateway) = create_server();
        gateway.fail("INV500", "connection reset by peer");

        let response = server.post("/").json(&json!({"invoice_id": "INV500"})).await;

        response.assert_status_ok();
        response.assert_json(&json!({"status": "unpaid"}));

        let events = events(&server).await;
        assert_eq!(events[0]["verified"], false);
        assert_eq!(events[0]["payment"], Value::Null);
        assert_eq!(
            events[0]["error"],
            "Request to QPay failed: connection reset by peer"
        );
    }

    #[tokio::test]
    async fn missing_invoice_id_skips_verification() {
        let (server, gateway) = create_server();

        let response = server.post("/").json(&json!({"payment_status": "PAID"})).await;

        response.assert_status_ok();
        let events = events(&server).await;
        assert_eq!(events[0]["invoiceId"], "");
        assert_eq!(events[0]["verified"], false);
        assert_eq!(events[0]["payment"], Value::Null);
        assert!(events[0].get("error").is_none());
        assert!(gateway.requests().is_empty());
    }

    #[tokio::test]
    async fn one_check_per_notification_scoped_to_invoice() {
        let (server, gateway) = create_server();

        server.post("/").json(&json!({"invoice_id": "A"})).await;
        server.post("/").json(&json!({"invoiceId": "B"})).await;

        let requests = gateway.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].object_type, ObjectType::Invoice);
        assert_eq!(requests[0].object_id, "A");
        assert_eq!(requests[1].object_type, ObjectType::Invoice);
        assert_eq!(requests[1].object_id, "B");
    }

    #[tokio::test]
    async fn post_to_any_path_is_accepted() {
        let (server, gateway) = create_server();
        gateway.paid("INV7", 100.0);

        let response = server
            .post("/qpay/callback")
            .json(&json!({"invoice_id": "INV7"}))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({"status": "paid"}));

        let response = server.post("/events").json(&json!({"invoice_id": "INV7"})).await;
        response.assert_status_ok();

        assert_eq!(events(&server).await.len(), 2);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let (server, gateway) = create_server();

        let body = "x".repeat(MAX_NOTIFICATION_SIZE + 1);
        let response = server.post("/").text(body).await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        assert!(events(&server).await.is_empty());
        assert!(gateway.requests().is_empty());
    }
}

// =============================================================================
// Event Log Tests
// =============================================================================

mod event_log {
    use super::*;

    #[tokio::test]
    async fn empty_on_start() {
        let (server, _gateway) = create_server();

        let response = server.get("/events").await;

        response.assert_status_ok();
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("application/json"));
        assert_eq!(response.json::<Value>(), json!([]));
    }

    #[tokio::test]
    async fn newest_first() {
        let (server, _gateway) = create_server();

        for id in ["FIRST", "SECOND", "THIRD"] {
            server.post("/").json(&json!({"invoice_id": id})).await;
        }

        let ids: Vec<_> = events(&server)
            .await
            .into_iter()
            .map(|e| e["invoiceId"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["THIRD", "SECOND", "FIRST"]);
    }

    #[tokio::test]
    async fn repeated_reads_are_identical() {
        let (server, gateway) = create_server();
        gateway.paid("INV1", 10.0);
        server.post("/").json(&json!({"invoice_id": "INV1"})).await;
        server.post("/").text("plain text").await;

        let first = server.get("/events").await.text();
        let second = server.get("/events").await.text();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn concurrent_notifications_are_all_recorded() {
        let (server, gateway) = create_server();
        gateway.paid("P", 1.0);

        let (a, b) = tokio::join!(
            server.post("/").json(&json!({"invoice_id": "P"})).into_future(),
            server.post("/").json(&json!({"invoice_id": "U"})).into_future(),
        );
        a.assert_status_ok();
        b.assert_status_ok();

        let mut ids: Vec<_> = events(&server)
            .await
            .into_iter()
            .map(|e| e["invoiceId"].as_str().unwrap().to_string())
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["P", "U"]);
    }
}

// =============================================================================
// Dashboard, CORS and Routing Tests
// =============================================================================

mod routing {
    use super::*;

    #[tokio::test]
    async fn dashboard_is_html() {
        let (server, _gateway) = create_server();

        let response = server.get("/").await;

        response.assert_status_ok();
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/html"));
        assert!(response.text().contains("Listening on port 4040."));
    }

    #[tokio::test]
    async fn options_is_empty_with_cors_headers() {
        let (server, _gateway) = create_server();

        let response = server.method(Method::OPTIONS, "/").await;

        response.assert_status_ok();
        assert!(response.as_bytes().is_empty());
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST, GET, OPTIONS");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
    }

    #[tokio::test]
    async fn options_on_unknown_path() {
        let (server, _gateway) = create_server();

        let response = server.method(Method::OPTIONS, "/anything").await;

        response.assert_status_ok();
        assert!(response.as_bytes().is_empty());
    }

    #[tokio::test]
    async fn every_response_has_cors_headers() {
        let (server, _gateway) = create_server();

        for response in [
            server.get("/").await,
            server.get("/events").await,
            server.post("/").text("{}").await,
            server.get("/missing").await,
        ] {
            assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
            assert!(response.headers().contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
            assert!(response.headers().contains_key(header::ACCESS_CONTROL_ALLOW_HEADERS));
        }
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let (server, _gateway) = create_server();

        let response = server.get("/missing").await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.as_bytes().is_empty());

        let response = server.put("/").await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = server.delete("/events").await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn head_is_not_found() {
        let (server, _gateway) = create_server();

        for path in ["/", "/events", "/missing"] {
            let response = server.method(Method::HEAD, path).await;
            response.assert_status(StatusCode::NOT_FOUND);
            assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        }
    }
}
