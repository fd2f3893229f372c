//! Listener lifecycle: bind, serve, shut down.

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::time::Duration;

use axum::{Router, extract::DefaultBodyLimit, middleware as axum_mw, routing::get};
use qpay_core::webhook::Verifier;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::error::{Result, ServerError};
use crate::middleware::permissive_cors;
use crate::routes::{self, dashboard, webhooks};
use crate::state::AppState;

/// Port used when none is given.
pub const DEFAULT_PORT: u16 = 4040;

/// Maximum notification body size (1MB).
pub const MAX_NOTIFICATION_SIZE: usize = 1024 * 1024;

/// How long in-flight requests may run after the shutdown signal.
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Builds the listener router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(dashboard::dashboard)
                .head(routes::not_found)
                .post(webhooks::receive_notification)
                .fallback(routes::not_found),
        )
        .route(
            "/events",
            get(webhooks::list_events)
                .head(routes::not_found)
                .post(webhooks::receive_notification)
                .fallback(routes::not_found),
        )
        .fallback(routes::fallback)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum_mw::from_fn(permissive_cors))
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(MAX_NOTIFICATION_SIZE)),
        )
}

/// A bound webhook listener.
pub struct Listener {
    listener: TcpListener,
    state: AppState,
    grace_period: Duration,
}

impl Listener {
    /// Binds the listener. Fails before serving if the address is unavailable.
    pub async fn bind(addr: SocketAddr, verifier: Verifier) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        let port = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { addr, source })?
            .port();

        Ok(Self {
            listener,
            state: AppState::new(verifier, port),
            grace_period: SHUTDOWN_GRACE_PERIOD,
        })
    }

    /// Sets how long in-flight requests may run once shutdown starts.
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Returns the bound address.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Returns the shared state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serves until Ctrl+C (or SIGTERM on Unix). Returns the event count.
    pub async fn serve(self) -> Result<usize> {
        self.serve_with_shutdown(shutdown_signal()).await
    }

    /// Serves until `signal` resolves. Returns the event count.
    ///
    /// New connections stop being accepted once the signal fires. Requests
    /// still in flight after the grace period are abandoned.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<usize>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let events = self.state.events.clone();
        let grace_period = self.grace_period;
        let app = router(self.state);

        let (fired_tx, mut fired_rx) = watch::channel(false);
        let server = axum::serve(self.listener, app)
            .with_graceful_shutdown(async move {
                signal.await;
                let _ = fired_tx.send(true);
            })
            .into_future();

        let deadline = async move {
            let fired = fired_rx.wait_for(|fired| *fired).await.is_ok();
            if !fired {
                std::future::pending::<()>().await;
            }
            tokio::time::sleep(grace_period).await;
        };

        tracing::info!("Webhook listener accepting connections");
        tokio::select! {
            result = server => result?,
            _ = deadline => {
                tracing::warn!(
                    "In-flight requests still running {:?} after shutdown, abandoning them",
                    grace_period
                );
            }
        }

        let count = events.count().await;
        tracing::info!("Webhook listener stopped after {} events", count);
        Ok(count)
    }
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::debug!("Shutdown signal received");
}
