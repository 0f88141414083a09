//! Outbound HTTP for store lookups.
//!
//! Resolvers only ever issue GETs through the [`Transport`] trait, so tests
//! can point them at a mock server or swap in a canned implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};

use crate::error::ScraperError;

const ACCEPT_VALUE: &str =
    "text/html,application/json,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const MAX_REDIRECTS: usize = 10;

/// Status and body of a completed GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET and return whatever the server answered, any status.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] on network failure or timeout.
    async fn get(&self, url: &str) -> Result<FetchResponse, ScraperError>;
}

/// Header and timeout settings shared by every request of a batch.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub request_timeout: Duration,
    pub user_agent: String,
    pub accept_language: String,
}

impl TransportConfig {
    #[must_use]
    pub fn from_app_config(config: &pdpscout_core::AppConfig) -> Self {
        Self {
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            user_agent: config.user_agent.clone(),
            accept_language: config.accept_language.clone(),
        }
    }
}

/// [`Transport`] backed by a pooled `reqwest` client that follows redirects
/// and sends browser-like headers on every request.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns [`ScraperError::ClientBuild`] if a header value is not valid
    /// ASCII, or [`ScraperError::Http`] if the client cannot be constructed.
    pub fn new(config: &TransportConfig) -> Result<Self, ScraperError> {
        let header = |value: &str| {
            HeaderValue::from_str(value)
                .map_err(|e| ScraperError::ClientBuild(format!("invalid header value: {e}")))
        };

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header(&config.user_agent)?);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        headers.insert(ACCEPT_LANGUAGE, header(&config.accept_language)?);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<FetchResponse, ScraperError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(FetchResponse { status, body })
    }
}

async fn try_fetch_text(transport: &dyn Transport, url: &str) -> Result<String, ScraperError> {
    let response = transport.get(url).await?;
    if response.status != 200 {
        return Err(ScraperError::UnexpectedStatus {
            status: response.status,
            url: url.to_owned(),
        });
    }
    if response.body.trim().is_empty() {
        return Err(ScraperError::EmptyBody {
            url: url.to_owned(),
        });
    }
    Ok(response.body)
}

/// GET `url` and return the body only for a non-empty 200 response.
///
/// Failures are logged and swallowed: to a resolver, an unreachable page and
/// a page without a product link are the same thing.
pub(crate) async fn fetch_text(transport: &dyn Transport, url: &str) -> Option<String> {
    match try_fetch_text(transport, url).await {
        Ok(body) => Some(body),
        Err(error) => {
            tracing::debug!(url, error = %error, "fetch failed");
            None
        }
    }
}

/// Like [`fetch_text`], additionally parsing the body as JSON.
pub(crate) async fn fetch_json(transport: &dyn Transport, url: &str) -> Option<serde_json::Value> {
    let body = fetch_text(transport, url).await?;
    match serde_json::from_str(&body) {
        Ok(value) => Some(value),
        Err(source) => {
            let error = ScraperError::Deserialize {
                context: url.to_owned(),
                source,
            };
            tracing::debug!(url, error = %error, "response is not JSON");
            None
        }
    }
}
