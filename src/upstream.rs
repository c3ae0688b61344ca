//! HTTP access to the Frankfurter exchange-rate API

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ServerConfig;
use crate::types::{QueryParams, ServiceError};

/// Boxed future returned by [`HttpTransport::get`]
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<UpstreamResponse, ServiceError>> + Send + 'a>>;

/// Raw response from the upstream service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Issues GET requests on behalf of [`FrankfurterClient`]
pub trait HttpTransport: Send + Sync {
    fn get<'a>(&'a self, url: &'a str, query: &'a QueryParams) -> TransportFuture<'a>;
}

/// Production transport backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Builder: bound every request by `timeout_ms`
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout = Some(Duration::from_millis(timeout_ms));
        self
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport for ReqwestTransport {
    fn get<'a>(&'a self, url: &'a str, query: &'a QueryParams) -> TransportFuture<'a> {
        Box::pin(async move {
            let mut builder = self.client.get(url);
            if !query.is_empty() {
                builder = builder.query(query);
            }
            if let Some(timeout) = self.timeout {
                builder = builder.timeout(timeout);
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    ServiceError::Transport(format!("request timeout: {}", e))
                } else if e.is_connect() {
                    ServiceError::Transport(format!("connection failed: {}", e))
                } else {
                    ServiceError::Transport(format!("request failed: {}", e))
                }
            })?;

            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| {
                ServiceError::Transport(format!("failed to read response body: {}", e))
            })?;

            Ok(UpstreamResponse { status, body })
        })
    }
}

/// A request seen by [`MockTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub query: QueryParams,
}

/// Offline transport that records requests and replays a canned reply
pub struct MockTransport {
    reply: Box<dyn Fn() -> Result<UpstreamResponse, ServiceError> + Send + Sync>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    /// Answer every request with `body` and status 200
    pub fn with_body(body: impl Into<String>) -> Self {
        let body = body.into();
        Self::with_response(move || Ok(UpstreamResponse::ok(body.clone())))
    }

    /// Answer every request with a JSON value
    pub fn with_json(value: Value) -> Self {
        Self::with_body(value.to_string())
    }

    /// Answer every request by calling `reply`
    pub fn with_response<F>(reply: F) -> Self
    where
        F: Fn() -> Result<UpstreamResponse, ServiceError> + Send + Sync + 'static,
    {
        Self {
            reply: Box::new(reply),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fail every request as if the upstream were unreachable
    pub fn unreachable() -> Self {
        Self::with_response(|| Err(ServiceError::Transport("connection refused".to_string())))
    }

    /// Requests made so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        match self.requests.lock() {
            Ok(requests) => requests.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl HttpTransport for MockTransport {
    fn get<'a>(&'a self, url: &'a str, query: &'a QueryParams) -> TransportFuture<'a> {
        let request = RecordedRequest {
            url: url.to_string(),
            query: query.clone(),
        };
        match self.requests.lock() {
            Ok(mut requests) => requests.push(request),
            Err(poisoned) => poisoned.into_inner().push(request),
        }
        let reply = (self.reply)();
        Box::pin(async move { reply })
    }
}

/// Client for the Frankfurter API rooted at a base URL
#[derive(Clone)]
pub struct FrankfurterClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
}

impl FrankfurterClient {
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
        }
    }

    /// Client using reqwest with the configured base URL and timeout
    pub fn from_config(config: &ServerConfig) -> Self {
        let mut transport = ReqwestTransport::new();
        if let Some(timeout_ms) = config.api_timeout_ms {
            transport = transport.with_timeout_ms(timeout_ms);
        }
        Self::new(config.api_url.clone(), Arc::new(transport))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for `path`; absolute URLs are used as given
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url.trim_end_matches('/'), path)
        }
    }

    /// GET `path` and decode the body as JSON.
    ///
    /// The status code is not checked: an upstream error body that is valid
    /// JSON is returned like any other payload.
    pub async fn get(&self, path: &str, query: &QueryParams) -> Result<Value, ServiceError> {
        let url = self.url_for(path);
        debug!(url = %url, params = ?query, "GET upstream");

        let response = self.transport.get(&url, query).await?;
        if !response.is_success() {
            warn!(url = %url, status = response.status, "upstream returned non-success status");
        }

        serde_json::from_str(&response.body).map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

impl std::fmt::Debug for FrankfurterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrankfurterClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
