//! # Pipeline Module
//!
//! ## Purpose
//! Orchestrates a complete fetch run: expands the date range through the
//! scheduler, consolidates the collected payloads, writes the output document,
//! and finalizes the run statistics.
//!
//! ## Input/Output Specification
//! - **Input**: Validated configuration and an inclusive date range
//! - **Output**: `RunReport` holding the consolidated document and statistics
//! - **Workflow**: Fetch → Consolidate → Write → Snapshot
//!
//! ## Key Features
//! - Per-date failures are contained; a run always produces a best-effort
//!   document and an honest failure count
//! - Fresh statistics per run
//! - Transport injection for tests

use crate::config::Config;
use crate::consolidate::{ConsolidatedDocument, Consolidator};
use crate::errors::Result;
use crate::fetch::{CacheStore, Fetcher, HttpTransport, Scheduler, Transport};
use crate::stats::{RunStatistics, StatsCollector};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;

/// Outcome of one pipeline run
#[derive(Debug)]
pub struct RunReport {
    /// The merged output document
    pub document: ConsolidatedDocument,
    /// Final statistics snapshot for the run
    pub statistics: RunStatistics,
}

/// End-to-end fetch and consolidation pipeline
///
/// Owns the transport, cache, and statistics for its lifetime; dropping the
/// pipeline releases every resource it acquired.
pub struct FixturePipeline {
    config: Arc<Config>,
    cache: Arc<CacheStore>,
    stats: Arc<StatsCollector>,
    scheduler: Scheduler,
    consolidator: Consolidator,
}

impl FixturePipeline {
    /// Build a pipeline using the reqwest-backed HTTP transport
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let transport = Arc::new(HttpTransport::new(config.request_timeout())?);
        Self::with_transport(config, transport)
    }

    /// Build a pipeline over a caller-supplied transport
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);

        let stats = Arc::new(StatsCollector::new());
        let cache = Arc::new(CacheStore::new(config.fetch.cache_dir.clone()));
        let fetcher = Arc::new(Fetcher::new(
            config.clone(),
            transport,
            cache.clone(),
            stats.clone(),
        ));
        let scheduler = Scheduler::new(fetcher, config.fetch.max_workers, stats.clone());
        let consolidator = Consolidator::new(stats.clone());

        Ok(Self {
            config,
            cache,
            stats,
            scheduler,
            consolidator,
        })
    }

    /// Run the full pipeline for an inclusive date range.
    ///
    /// Only an invalid date range or an unwritable output location abort the
    /// run; individual date failures surface through the statistics and as
    /// empty sections in the document.
    pub async fn run(&self, start: NaiveDate, end: NaiveDate) -> Result<RunReport> {
        self.stats.reset();

        let results = self.scheduler.fetch_date_range(start, end).await?;
        let document = self.consolidator.consolidate(&results);

        let output_path = self.config.output_path();
        document.write_to(&output_path).await?;
        info!(
            "consolidated XML saved to {:?} ({} fixtures)",
            output_path, document.total_fixtures
        );

        let statistics = self.stats.snapshot(Some(output_path));
        Ok(RunReport {
            document,
            statistics,
        })
    }

    /// Remove all cached payloads, returning how many entries were deleted
    pub async fn clear_cache(&self) -> Result<usize> {
        self.cache.clear().await
    }

    /// Statistics snapshot outside of a run
    pub fn statistics(&self) -> RunStatistics {
        self.stats.snapshot(None)
    }
}
