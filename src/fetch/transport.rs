//! HTTP transport seam for the fixtures API.
//!
//! The fetcher only needs "perform a GET, hand back status and body". That
//! capability is behind the [`Transport`] trait so tests can substitute a
//! scripted double while production code uses the reqwest-backed
//! [`HttpTransport`]. Status-range interpretation belongs to the caller; the
//! transport reports whatever the server said.

use crate::errors::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Raw response from one HTTP attempt
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body decoded as UTF-8 text
    pub body: String,
}

impl TransportResponse {
    /// Whether the status code is in the 2xx success range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Capability to perform a single HTTP GET request
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one GET request, returning the status and body, or a transport
    /// error if no response was obtained at all.
    async fn get(&self, url: &str) -> Result<TransportResponse>;
}

/// reqwest-backed transport with a per-attempt timeout
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport whose every attempt is bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sports-fixture-fetcher/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(TransportResponse { status, body })
    }
}
