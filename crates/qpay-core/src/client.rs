//! QPay V2 merchant API client.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use url::Url;

use crate::error::{QpayError, Result};
use crate::models::{Invoice, InvoiceRequest, PaymentCheckRequest, PaymentCheckResponse};

/// Request timeout for every gateway call.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Tokens are refreshed this long before the gateway says they expire.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 30;

/// `expires_in` values above this are absolute unix timestamps, not durations.
const EPOCH_THRESHOLD: i64 = 1_000_000_000;

/// Gateway operations the webhook verifier depends on.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Queries the payments recorded against an object.
    async fn check_payment(&self, request: &PaymentCheckRequest) -> Result<PaymentCheckResponse>;
}

/// Connection settings for the merchant API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub username: String,
    pub password: SecretString,
}

impl ClientConfig {
    /// Validates credentials and the base URL.
    pub fn new(base_url: &str, username: &str, password: &str) -> Result<Self> {
        if username.is_empty() || password.is_empty() {
            return Err(QpayError::Configuration(
                "QPay credentials not configured. Run `qpay setup` or set QPAY_USERNAME and QPAY_PASSWORD."
                    .to_string(),
            ));
        }

        let base_url = Url::parse(base_url)
            .map_err(|e| QpayError::Configuration(format!("Invalid QPay base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(QpayError::Configuration(format!(
                "Invalid QPay base URL '{}': not an http(s) URL",
                base_url
            )));
        }

        Ok(Self {
            base_url,
            username: username.to_string(),
            password: SecretString::from(password.to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        let expires_at = match response.expires_in {
            Some(value) if value > EPOCH_THRESHOLD => {
                DateTime::from_timestamp(value, 0).unwrap_or(now)
            }
            Some(value) => now + Duration::seconds(value),
            None => now,
        };

        Self {
            access_token: response.access_token,
            expires_at,
        }
    }

    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(TOKEN_EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// QPay merchant API client.
pub struct QPayClient {
    http: reqwest::Client,
    config: ClientConfig,
    token: Mutex<Option<CachedToken>>,
}

impl QPayClient {
    /// Creates a new client.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(format!("qpay-cli/{}", crate::VERSION))
            .build()
            .map_err(|e| QpayError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            config,
            token: Mutex::new(None),
        })
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    /// Builds the full URL for an API path. Each segment is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                QpayError::Configuration(format!("Invalid QPay base URL '{}'", self.config.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Creates a simple invoice.
    pub async fn create_simple_invoice(&self, request: &InvoiceRequest) -> Result<Invoice> {
        if request.amount <= 0.0 || !request.amount.is_finite() {
            return Err(QpayError::InvalidArgument(format!(
                "Invoice amount must be positive, got {}",
                request.amount
            )));
        }

        let url = self.endpoint(&["v2", "invoice"])?;
        let response = self
            .send_authorized(|token| self.http.post(url.clone()).bearer_auth(token).json(request))
            .await?;
        handle_response(response).await
    }

    /// Fetches invoice details.
    pub async fn get_invoice(&self, invoice_id: &str) -> Result<serde_json::Value> {
        let url = self.endpoint(&["v2", "invoice", invoice_id])?;
        let response = self
            .send_authorized(|token| self.http.get(url.clone()).bearer_auth(token))
            .await?;
        handle_response(response).await
    }

    /// Cancels an unpaid invoice.
    pub async fn cancel_invoice(&self, invoice_id: &str) -> Result<()> {
        let url = self.endpoint(&["v2", "invoice", invoice_id])?;
        let response = self
            .send_authorized(|token| self.http.delete(url.clone()).bearer_auth(token))
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(gateway_error(status, &body))
    }

    /// Sends a request with a bearer token, re-authenticating once on 401.
    async fn send_authorized<F>(&self, build: F) -> Result<reqwest::Response>
    where
        F: Fn(&str) -> reqwest::RequestBuilder,
    {
        let token = self.access_token().await?;
        let response = build(&token).send().await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::debug!("QPay rejected cached token, re-authenticating");
        *self.token.lock().await = None;
        let token = self.access_token().await?;
        Ok(build(&token).send().await?)
    }

    /// Returns a cached access token, requesting a new one when stale.
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref()
            && token.is_fresh(now)
        {
            return Ok(token.access_token.clone());
        }

        let url = self.endpoint(&["v2", "auth", "token"])?;
        let response = self
            .http
            .post(url)
            .basic_auth(&self.config.username, Some(self.config.password.expose_secret()))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(QpayError::Auth(error_message(&body).unwrap_or_else(|| {
                "QPay rejected the merchant credentials".to_string()
            })));
        }

        let token_response: TokenResponse = handle_response(response).await?;
        let token = CachedToken::from_response(token_response, now);
        tracing::debug!("Obtained QPay access token, expires at {}", token.expires_at);

        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }
}

#[async_trait]
impl PaymentGateway for QPayClient {
    async fn check_payment(&self, request: &PaymentCheckRequest) -> Result<PaymentCheckResponse> {
        let url = self.endpoint(&["v2", "payment", "check"])?;
        let response = self
            .send_authorized(|token| self.http.post(url.clone()).bearer_auth(token).json(request))
            .await?;
        handle_response(response).await
    }
}

/// Parses a successful JSON response or maps the failure to a gateway error.
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();

    if status.is_success() {
        response
            .json()
            .await
            .map_err(|e| QpayError::Transport(format!("Failed to parse QPay response: {}", e)))
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(gateway_error(status, &body))
    }
}

fn gateway_error(status: StatusCode, body: &str) -> QpayError {
    QpayError::Gateway {
        status: status.as_u16(),
        message: error_message(body).unwrap_or_else(|| body.trim().to_string()),
    }
}

/// Extracts `message` (or `error`) from a gateway error body.
fn error_message(body: &str) -> Option<String> {
    let parsed: GatewayErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .message
        .filter(|m| !m.is_empty())
        .or(parsed.error.filter(|e| !e.is_empty()))
}
