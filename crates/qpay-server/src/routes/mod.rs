//! HTTP route handlers.

pub mod dashboard;
pub mod webhooks;

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};

use crate::state::AppState;

/// Handler for unmatched requests.
///
/// Notifications may be posted to any path; everything else is 404.
pub async fn fallback(state: State<AppState>, method: Method, body: Bytes) -> Response {
    if method == Method::POST {
        webhooks::receive_notification(state, body).await.into_response()
    } else {
        not_found().await.into_response()
    }
}

/// Empty 404.
pub async fn not_found() -> impl IntoResponse {
    StatusCode::NOT_FOUND
}
