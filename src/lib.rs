//! # Sports Fixture Fetcher
//!
//! ## Overview
//! This library fetches sports fixture data for a range of dates from a remote
//! XML API, caches raw responses on disk, retries transient failures with
//! exponential backoff, and consolidates the collected payloads into a single
//! organized XML document with running statistics.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `fetch`: Cache-shielded, rate-limited, retried retrieval of per-date payloads
//! - `consolidate`: Merging per-date XML into one date-sectioned output document
//! - `stats`: Process-wide run counters exposed as an immutable snapshot
//! - `pipeline`: End-to-end orchestration of a fetch run
//! - `config`: Configuration management and validation
//! - `errors`: Centralized error handling and retry classification
//!
//! ## Input/Output Specification
//! - **Input**: An inclusive date range and API credentials
//! - **Output**: One consolidated XML document plus a `RunStatistics` snapshot
//! - **Guarantee**: Per-date failures never abort a run; the document and the
//!   failure counts are always produced
//!
//! ## Usage
//! ```rust,no_run
//! use sports_fixture_fetcher::{Config, FixturePipeline};
//! use chrono::NaiveDate;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config.toml")?;
//!     let pipeline = FixturePipeline::new(config)?;
//!
//!     let start = NaiveDate::from_ymd_opt(2024, 9, 26).ok_or("bad start date")?;
//!     let end = NaiveDate::from_ymd_opt(2024, 12, 12).ok_or("bad end date")?;
//!     let report = pipeline.run(start, end).await?;
//!
//!     println!("fixtures found: {}", report.statistics.total_fixtures);
//!     Ok(())
//! }
//! ```

// Core modules
pub mod config;
pub mod consolidate;
pub mod errors;
pub mod fetch;
pub mod pipeline;
pub mod stats;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenience
pub use config::Config;
pub use consolidate::{ConsolidatedDocument, Consolidator, DateSection};
pub use errors::{FetchError, Result};
pub use fetch::{CacheStore, Fetcher, HttpTransport, RetryPolicy, Scheduler, Transport};
pub use pipeline::{FixturePipeline, RunReport};
pub use stats::{RunStatistics, StatsCollector, StatsEvent};

use chrono::NaiveDate;
use serde::Serialize;

/// Outcome classification for one date's fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FetchStatus {
    /// Payload retrieved from the API
    Fetched,
    /// Payload served from the local cache, no network access
    CacheHit,
    /// All attempts exhausted or a permanent failure occurred
    Failed,
}

/// Result of fetching one date
///
/// Produced by the fetcher for every dispatched date and consumed by the
/// consolidator; not persisted beyond the run.
#[derive(Debug, Clone, Serialize)]
pub struct FetchResult {
    /// The date this result covers
    pub date: NaiveDate,
    /// How the payload was (or was not) obtained
    pub status: FetchStatus,
    /// Raw XML payload, present for `Fetched` and `CacheHit`
    pub payload: Option<String>,
    /// Failure reason, present for `Failed`
    pub error: Option<String>,
}

impl FetchResult {
    /// Whether this date ended in failure
    pub fn is_failed(&self) -> bool {
        self.status == FetchStatus::Failed
    }
}
