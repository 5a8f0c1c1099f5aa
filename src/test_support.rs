//! Shared test doubles for the fetch pipeline tests.

use crate::errors::Result;
use crate::fetch::{Transport, TransportResponse};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

type Handler = Box<dyn Fn(&str) -> Result<TransportResponse> + Send + Sync>;

/// Scripted transport double that counts every request it receives.
pub(crate) struct MockTransport {
    handler: Handler,
    /// Total GET requests performed against this transport
    pub calls: AtomicUsize,
}

impl MockTransport {
    /// Respond to every request with the given handler
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&str) -> Result<TransportResponse> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always answer 200 with the given body
    pub fn ok(body: &str) -> Self {
        let body = body.to_string();
        Self::with_handler(move |_| {
            Ok(TransportResponse {
                status: 200,
                body: body.clone(),
            })
        })
    }

    /// Always answer with the given status and body
    pub fn status(status: u16, body: &str) -> Self {
        let body = body.to_string();
        Self::with_handler(move |_| {
            Ok(TransportResponse {
                status,
                body: body.clone(),
            })
        })
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.handler)(url)
    }
}
