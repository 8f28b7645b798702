//! HTTP gateway to the remote storefront API.
//!
//! One configured `reqwest` client shared by every component. The gateway
//! attaches the session identifier to each request via the `X-Session-Id`
//! header and, when a bearer credential is set, an `Authorization` header.
//! The credential can be set and cleared at runtime (login/logout); the two
//! identities are allowed to diverge and the server decides how to merge
//! their carts.

use std::sync::{Arc, RwLock};

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{error, instrument};
use url::Url;

use thiserror::Error;

use crate::config::ClientConfig;
use crate::session::SessionProvider;
use crate::storage::StorageError;

/// Header carrying the session identifier.
pub const SESSION_HEADER: &str = "X-Session-Id";

/// Substrings marking a stock-exhausted domain rejection in error payloads.
const STOCK_EXHAUSTED_MARKERS: &[&str] = &["out of stock", "insufficient stock"];

/// Errors that can occur when talking to the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request URL could not be built.
    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    /// Non-success status with an error payload.
    #[error("API error ({status}): {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error payload, or the raw body.
        message: String,
    },

    /// Domain rejection: the requested quantity is not available.
    #[error("Out of stock: {0}")]
    OutOfStock(String),

    /// Rate limited by the server.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Session identity could not be read or created.
    #[error("Session identity error: {0}")]
    Session(#[from] StorageError),
}

/// Error payload shape returned by the storefront API.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    #[serde(alias = "error")]
    message: String,
}

/// Classify a non-success response into an [`ApiError`].
///
/// Stock-exhausted rejections are distinguished from generic failures by
/// inspecting the payload message, so callers can render them as a
/// user-correctable condition.
fn classify_failure(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map_or_else(|_| body.chars().take(200).collect(), |e| e.message);

    let lowered = message.to_lowercase();
    if STOCK_EXHAUSTED_MARKERS.iter().any(|m| lowered.contains(m)) {
        return ApiError::OutOfStock(message);
    }

    ApiError::Status { status, message }
}

// =============================================================================
// HttpGateway
// =============================================================================

/// Shared HTTP client for the storefront API.
///
/// Cheaply cloneable; all clones share the connection pool, base URL, session
/// provider, and bearer credential.
#[derive(Clone)]
pub struct HttpGateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    client: reqwest::Client,
    base_url: Url,
    sessions: Arc<SessionProvider>,
    bearer: RwLock<Option<SecretString>>,
}

impl HttpGateway {
    /// Create a gateway from configuration and a session provider.
    #[must_use]
    pub fn new(config: &ClientConfig, sessions: Arc<SessionProvider>) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                client: reqwest::Client::new(),
                base_url: config.api_base_url.clone(),
                sessions,
                bearer: RwLock::new(config.bearer_token.clone()),
            }),
        }
    }

    /// Replace the bearer credential; `None` clears it.
    pub fn set_bearer(&self, token: Option<SecretString>) {
        let mut bearer = self
            .inner
            .bearer
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *bearer = token;
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Attach session identity and bearer credential, then send.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let session_id = self.inner.sessions.get_or_create()?;

        let mut request = request.header(SESSION_HEADER, session_id.as_str());
        {
            let bearer = self
                .inner
                .bearer
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(token) = bearer.as_ref() {
                request = request.bearer_auth(token.expose_secret());
            }
        }

        Ok(request.send().await?)
    }

    /// Read the response body, mapping failures into the error taxonomy.
    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "storefront API returned non-success status"
            );
            return Err(classify_failure(status.as_u16(), &body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// GET a JSON resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server rejects it, or the
    /// body cannot be parsed as `T`.
    #[instrument(skip(self, params), fields(path = %path))]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let response = self
            .send(self.inner.client.get(url).query(params))
            .await?;
        Self::read_json(response).await
    }

    /// POST a JSON body and parse a JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server rejects it, or the
    /// body cannot be parsed as `T`.
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let response = self.send(self.inner.client.post(url).json(body)).await?;
        Self::read_json(response).await
    }
}
