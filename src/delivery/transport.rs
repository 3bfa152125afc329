// src/delivery/transport.rs

//! Pluggable transport abstraction.
//!
//! The dispatcher talks to a `Transport` instead of a raw HTTP client, so
//! tests can script responses without a network. Production uses
//! [`HttpTransport`].

use std::future::Future;
use std::pin::Pin;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client;
use thiserror::Error;

use crate::config::EndpointSettings;
use crate::errors::{RelayError, Result};

/// Status and body of a response that was actually received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// No response was received (connect failure, timeout, reset, ...).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Type alias for the boxed future returned by [`Transport::post`].
pub type PostFuture<'a> =
    Pin<Box<dyn Future<Output = std::result::Result<RawResponse, TransportError>> + Send + 'a>>;

/// Trait abstracting how a serialized event reaches the endpoint.
pub trait Transport: Send + Sync {
    /// POST `body` (already-serialized JSON) once.
    fn post(&self, body: String) -> PostFuture<'_>;
}

/// `reqwest`-backed transport used in production.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    url: String,
}

impl HttpTransport {
    /// Build a client with the per-attempt timeout and fixed headers.
    pub fn new(endpoint: &EndpointSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));

        let user_agent = HeaderValue::from_str(&endpoint.user_agent).map_err(|e| {
            RelayError::ConfigError(format!(
                "invalid user_agent '{}': {}",
                endpoint.user_agent, e
            ))
        })?;
        headers.insert(header::USER_AGENT, user_agent);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(endpoint.timeout)
            .build()?;

        Ok(Self {
            client,
            url: endpoint.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for HttpTransport {
    fn post(&self, body: String) -> PostFuture<'_> {
        Box::pin(async move {
            let response = self
                .client
                .post(&self.url)
                .body(body)
                .send()
                .await
                .map_err(|e| TransportError(e.to_string()))?;

            let status = response.status().as_u16();
            // An unreadable body still carries a usable status.
            let body = response.text().await.unwrap_or_default();
            Ok(RawResponse { status, body })
        })
    }
}
