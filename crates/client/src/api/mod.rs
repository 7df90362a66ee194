//! Backend API client.
//!
//! Plain JSON over HTTP with `reqwest`. Every request carries an
//! `x-request-id` header and, when the client holds one, a bearer token.
//! Catalog reads are cached with `moka` (TTL from [`ApiConfig`]).

mod auth;
mod cache;
mod cart;
mod catalog;
mod orders;

pub use auth::{AuthSession, User};

use std::sync::Arc;

use moka::future::Cache;
use reqwest::header::{HeaderValue, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{Span, debug, error, field, instrument};
use uuid::Uuid;

use crate::config::ApiConfig;
use crate::error::ApiError;

use cache::{CacheKey, CacheValue};

/// Header carrying a per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Maximum number of body characters kept in logs and error messages.
const BODY_PREVIEW_CHARS: usize = 200;

/// Client for the backend API.
///
/// Cheap to clone; clones share the HTTP connection pool, the token and the
/// catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    token: RwLock<Option<SecretString>>,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Error body shape used by the backend.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl ApiClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the HTTP client cannot be built (TLS
    /// backend initialization).
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
                token: RwLock::new(config.token.clone()),
                cache,
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    // =========================================================================
    // Token
    // =========================================================================

    /// Replace the bearer token used for subsequent requests.
    pub async fn set_token(&self, token: SecretString) {
        *self.inner.token.write().await = Some(token);
    }

    /// Drop the bearer token.
    pub async fn clear_token(&self) {
        *self.inner.token.write().await = None;
    }

    /// Whether a bearer token is held.
    pub async fn has_token(&self) -> bool {
        self.inner.token.read().await.is_some()
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'));
        self.inner.client.request(method, url)
    }

    /// Send a request and return the body of a successful response.
    #[instrument(skip_all, fields(method = field::Empty, path = field::Empty, request_id = field::Empty))]
    async fn execute(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let request_id = Uuid::new_v4();
        let mut request = request.header(
            REQUEST_ID_HEADER,
            HeaderValue::from_str(&request_id.to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("invalid")),
        );
        if let Some(token) = self.inner.token.read().await.as_ref() {
            request = request.bearer_auth(token.expose_secret());
        }
        let request = request.build()?;

        let path = request.url().path().to_string();
        let span = Span::current();
        span.record("method", request.method().as_str());
        span.record("path", path.as_str());
        span.record("request_id", field::display(request_id));

        let response = self.inner.client.execute(request).await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if status.is_success() {
            debug!(status = %status, "API request succeeded");
            return Ok(body);
        }

        let message = error_message(&body);
        match status {
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(path)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(ApiError::Unauthorized(message))
            }
            _ => {
                error!(
                    status = %status,
                    body = %preview(&body),
                    "Backend returned non-success status"
                );
                Err(ApiError::Status {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    /// Send a request and decode a JSON response.
    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.execute(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            error!(
                error = %e,
                body = %preview(&body),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }
}

/// Best human-readable message from an error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                "no response body".to_string()
            } else {
                preview(body)
            }
        })
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
