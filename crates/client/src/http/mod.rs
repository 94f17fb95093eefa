//! HTTP layer: request/response records and the transport seam.
//!
//! The SDK never talks to `reqwest` directly outside this module. Every
//! operation builds an [`ApiRequest`], hands it to the injected
//! [`Transport`], and pushes the outcome through the classifier gate in
//! [`classify`]. Tests swap the transport for a scripted one; production
//! uses [`ReqwestTransport`].

pub mod builder;
pub mod classify;
pub mod codec;

pub use builder::RequestBuilder;
pub use classify::classify;

use async_trait::async_trait;
use thiserror::Error;

/// HTTP verb used by an [`ApiRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    /// Wire name of the verb.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully-addressed outbound request, ready for any transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// Absolute URL including client-identification query parameters.
    pub url: String,
    pub verb: Verb,
    /// Header name/value pairs, in insertion order.
    pub headers: Vec<(String, String)>,
    /// JSON body, when the operation carries one.
    pub body: Option<String>,
}

impl ApiRequest {
    /// Look up a header by name (case-sensitive; the builder uses canonical
    /// names throughout).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A completed transport exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    /// Raw body text; domain decoding happens after classification.
    pub body: String,
}

impl ApiResponse {
    /// Whether the status code is in the 2xx success range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Failure below the HTTP layer: the exchange produced no response.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Connection could not be established or broke mid-exchange.
    #[error("connection error: {0}")]
    Connection(String),
    /// The request could not be constructed or dispatched at all.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Asynchronous request execution collaborator.
///
/// Implementations own real I/O concerns (pools, timeouts, TLS). The SDK
/// guarantees exactly one `execute` call per dispatched operation and
/// consumes exactly one completion.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Default transport backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with reqwest's default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing client (custom timeouts, proxies, TLS roots).
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let method = match request.verb {
            Verb::Get => reqwest::Method::GET,
            Verb::Post => reqwest::Method::POST,
            Verb::Put => reqwest::Method::PUT,
            Verb::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| TransportError::Connection(err.to_string()))?;

        let status = response.status().as_u16();

        // Read the body as text first so classification and decode errors
        // can report what actually came over the wire.
        let body = response
            .text()
            .await
            .map_err(|err| TransportError::Connection(err.to_string()))?;

        tracing::debug!(status, bytes = body.len(), "received response");

        Ok(ApiResponse { status, body })
    }
}
