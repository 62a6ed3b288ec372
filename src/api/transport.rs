//! HTTP transport used by the connector.
//!
//! The connector hands a fully assembled [`OutboundRequest`] to a [`Transport`]
//! and receives the status and parsed body back. The default implementation
//! uses `reqwest`; tests plug in an in-memory transport.

use std::fmt;

use async_trait::async_trait;
use reqwest::{header, redirect, Client, Method};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Maximum number of redirects followed for a single request.
const MAX_REDIRECTS: usize = 10;

/// Errors raised when no response could be obtained.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network or HTTP client error.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// No connection to the host could be established.
    #[error("cannot reach {0}")]
    Unreachable(String),
}

/// One fully assembled outbound call.
#[derive(Clone, PartialEq)]
pub struct OutboundRequest {
    /// The HTTP verb.
    pub method: Method,
    /// The absolute target URL, without query string.
    pub url: String,
    /// Query parameters in insertion order.
    pub query: Vec<(String, String)>,
    /// The complete `Authorization` header value, if any.
    pub authorization: Option<String>,
    /// JSON request body, if any.
    pub body: Option<Value>,
}

impl fmt::Debug for OutboundRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("query", &self.query)
            .field(
                "authorization",
                &self.authorization.as_ref().map(|_| "<redacted>"),
            )
            .field("body", &self.body)
            .finish()
    }
}

/// The status and body of a completed call.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// The HTTP status code.
    pub status: u16,
    /// The parsed JSON body, or `Value::Null` when the body was empty.
    pub body: Value,
}

impl TransportResponse {
    /// Create a response.
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Check whether the status is in `200..=299`.
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// Executes exactly one HTTP request per call.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Send the request and wait for its response.
    async fn execute(
        &self,
        request: OutboundRequest,
    ) -> std::result::Result<TransportResponse, TransportError>;
}

/// The default transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build the transport with redirect following enabled.
    pub fn new() -> std::result::Result<Self, TransportError> {
        let client = Client::builder()
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(
        &self,
        request: OutboundRequest,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .header(header::ACCEPT, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(auth) = &request.authorization {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() {
                TransportError::Unreachable(host_of(&request.url))
            } else {
                TransportError::Http(e)
            }
        })?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        debug!(status, bytes = text.len(), "Received response");

        Ok(TransportResponse::new(status, parse_body(&text)))
    }
}

/// The `host:port` part of `url`, for error messages.
fn host_of(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(parsed) => match (parsed.host_str(), parsed.port_or_known_default()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            _ => url.to_string(),
        },
        Err(_) => url.to_string(),
    }
}

/// Parse a response body as JSON.
///
/// Empty bodies become `null`; non-JSON bodies are kept as a JSON string.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
