//! # Fetch Module
//!
//! ## Purpose
//! Handles retrieval of fixture data from the remote API, shielding every
//! request behind a cache lookup, a rate-limit delay, and a bounded retry
//! policy.
//!
//! ## Input/Output Specification
//! - **Input**: Date keys, API credentials, fetch configuration
//! - **Output**: One `FetchResult` per date, never an escaped error
//! - **Workflow**: Cache lookup → rate limit → retried HTTP attempt → cache write
//!
//! ## Architecture
//! - `transport`: HTTP capability trait and the reqwest implementation
//! - `cache`: Disk-backed payload cache
//! - `retry`: Exponential backoff wrapper
//! - `scheduler`: Bounded worker pool over a date range

pub mod cache;
pub mod retry;
pub mod scheduler;
pub mod transport;

use crate::config::Config;
use crate::errors::{FetchError, Result};
use crate::stats::{StatsCollector, StatsEvent};
use crate::{FetchResult, FetchStatus};
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, error, info};

pub use cache::CacheStore;
pub use retry::RetryPolicy;
pub use scheduler::Scheduler;
pub use transport::{HttpTransport, Transport, TransportResponse};

/// Per-date fetcher combining cache, rate limiting, and retries
pub struct Fetcher {
    config: Arc<Config>,
    transport: Arc<dyn Transport>,
    cache: Arc<CacheStore>,
    retry: RetryPolicy,
    stats: Arc<StatsCollector>,
}

impl Fetcher {
    /// Create a fetcher over the given transport and cache
    pub fn new(
        config: Arc<Config>,
        transport: Arc<dyn Transport>,
        cache: Arc<CacheStore>,
        stats: Arc<StatsCollector>,
    ) -> Self {
        let retry = RetryPolicy::new(config.fetch.retry_attempts, config.retry_base_delay());
        Self {
            config,
            transport,
            cache,
            retry,
            stats,
        }
    }

    /// Fetch fixture data for a single date.
    ///
    /// Never raises past this boundary: every outcome, including exhausted
    /// retries, is reported as a `FetchResult`.
    pub async fn fetch(&self, date: NaiveDate) -> FetchResult {
        if let Some(payload) = self.cache.get(date).await {
            info!("cache hit for {}", date);
            self.stats.record(StatsEvent::CacheHit);
            return FetchResult {
                date,
                status: FetchStatus::CacheHit,
                payload: Some(payload),
                error: None,
            };
        }

        // Rate limiting applies only when we actually go to the network
        let delay = self.config.rate_limit_delay();
        if !delay.is_zero() {
            sleep(delay).await;
        }

        let url = self.request_url(date);
        debug!("fetching {} from {}", date, url);

        match self.retry.run(|| self.attempt(&url)).await {
            Ok(payload) => {
                if let Err(e) = self.cache.put(date, &payload).await {
                    tracing::warn!("failed to cache payload for {}: {}", date, e);
                }
                self.stats.record(StatsEvent::ApiCall);
                info!("successfully fetched data for {}", date);
                FetchResult {
                    date,
                    status: FetchStatus::Fetched,
                    payload: Some(payload),
                    error: None,
                }
            }
            Err(e) => {
                self.stats.record(StatsEvent::Failure);
                error!("all attempts failed for {}: {}", date, e);
                FetchResult {
                    date,
                    status: FetchStatus::Failed,
                    payload: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// One HTTP attempt: success requires a 2xx status and a non-empty body
    async fn attempt(&self, url: &str) -> Result<String> {
        let response = self.transport.get(url).await?;

        if !response.is_success() {
            return Err(FetchError::HttpStatus {
                status: response.status,
            });
        }
        if response.body.trim().is_empty() {
            return Err(FetchError::EmptyPayload);
        }

        Ok(response.body)
    }

    /// Build the per-date request URL. The API takes an inclusive date window;
    /// one date per request keeps cache entries independent.
    fn request_url(&self, date: NaiveDate) -> String {
        let day = date.format("%d %b %Y").to_string();
        format!(
            "{}?ID={}&key={}&data=fixtures&startdate={}&enddate={}&TS=1",
            self.config.api.base_url, self.config.api.school_id, self.config.api.api_key, day, day
        )
    }
}
