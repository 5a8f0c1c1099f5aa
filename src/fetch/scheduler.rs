//! # Scheduler Module
//!
//! ## Purpose
//! Expands an inclusive date range into individual work units and dispatches
//! them across a bounded pool of concurrent fetch workers.
//!
//! ## Input/Output Specification
//! - **Input**: Inclusive start and end dates
//! - **Output**: One `FetchResult` per date, keyed by date
//! - **Concurrency**: At most `max_workers` fetches in flight; completion order
//!   is unconstrained and one date's failure never blocks another's

use crate::errors::{FetchError, Result};
use crate::fetch::Fetcher;
use crate::stats::{StatsCollector, StatsEvent};
use crate::FetchResult;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Bounded worker pool over a date range
pub struct Scheduler {
    fetcher: Arc<Fetcher>,
    max_workers: usize,
    stats: Arc<StatsCollector>,
}

impl Scheduler {
    /// Create a scheduler dispatching to at most `max_workers` concurrent fetches
    pub fn new(fetcher: Arc<Fetcher>, max_workers: usize, stats: Arc<StatsCollector>) -> Self {
        Self {
            fetcher,
            max_workers,
            stats,
        }
    }

    /// Fetch every date in the inclusive range `start..=end`.
    ///
    /// Workers may finish in any order; results are keyed by date so callers
    /// see a deterministic mapping regardless of completion order. With
    /// `max_workers == 1` this degenerates to strict sequential processing.
    pub async fn fetch_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, FetchResult>> {
        if start > end {
            return Err(FetchError::ValidationFailed {
                field: "date_range".to_string(),
                reason: format!("start date {} is after end date {}", start, end),
            });
        }

        let dates = expand_range(start, end);
        info!(
            "fetching data for {} dates ({} to {}) with {} workers",
            dates.len(),
            start,
            end,
            self.max_workers
        );

        let results: Vec<FetchResult> = stream::iter(dates)
            .map(|date| {
                let fetcher = self.fetcher.clone();
                async move { fetcher.fetch(date).await }
            })
            .buffer_unordered(self.max_workers)
            .collect()
            .await;

        let mut by_date = BTreeMap::new();
        for result in results {
            self.stats.record(StatsEvent::DateProcessed);
            by_date.insert(result.date, result);
        }

        let succeeded = by_date.values().filter(|r| !r.is_failed()).count();
        info!("completed fetching, success rate {}/{}", succeeded, by_date.len());

        Ok(by_date)
    }
}

/// Expand an inclusive date range into its individual days
fn expand_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::fetch::CacheStore;
    use crate::test_support::MockTransport;
    use crate::FetchStatus;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn build_scheduler(
        cache_dir: &std::path::Path,
        max_workers: usize,
        transport: Arc<MockTransport>,
    ) -> (Scheduler, Arc<StatsCollector>) {
        let mut config = Config::default();
        config.fetch.cache_dir = cache_dir.to_path_buf();
        config.fetch.delay_between_requests = 0.0;
        config.fetch.retry_base_delay_seconds = 0.001;
        config.fetch.max_workers = max_workers;
        let config = Arc::new(config);

        let cache = Arc::new(CacheStore::new(config.fetch.cache_dir.clone()));
        let stats = Arc::new(StatsCollector::new());
        let fetcher = Arc::new(Fetcher::new(
            config,
            transport,
            cache,
            stats.clone(),
        ));
        (Scheduler::new(fetcher, max_workers, stats.clone()), stats)
    }

    #[test]
    fn test_expand_range_is_inclusive() {
        let days = expand_range(date(2024, 1, 1), date(2024, 1, 5));
        assert_eq!(days.len(), 5);
        assert_eq!(days[0], date(2024, 1, 1));
        assert_eq!(days[4], date(2024, 1, 5));
    }

    #[test]
    fn test_expand_single_day_range() {
        let days = expand_range(date(2024, 1, 1), date(2024, 1, 1));
        assert_eq!(days, vec![date(2024, 1, 1)]);
    }

    #[tokio::test]
    async fn test_inverted_range_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(MockTransport::ok("<fixtures/>"));
        let (scheduler, _) = build_scheduler(dir.path(), 3, transport);

        let err = scheduler
            .fetch_date_range(date(2024, 1, 5), date(2024, 1, 1))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::ValidationFailed { .. }));
    }

    #[tokio::test]
    async fn test_every_date_yields_a_result() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(MockTransport::ok("<fixtures><fixture/></fixtures>"));
        let (scheduler, stats) = build_scheduler(dir.path(), 3, transport);

        let results = scheduler
            .fetch_date_range(date(2024, 1, 1), date(2024, 1, 5))
            .await
            .unwrap();

        assert_eq!(results.len(), 5);
        assert!(results
            .values()
            .all(|r| r.status == FetchStatus::Fetched));
        assert_eq!(stats.snapshot(None).dates_processed, 5);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_block_other_dates() {
        let dir = tempfile::tempdir().unwrap();
        // the API rejects exactly one date in the middle of the range
        let transport = Arc::new(MockTransport::with_handler(|url| {
            if url.contains("03 Jan 2024") {
                Ok(crate::fetch::TransportResponse {
                    status: 404,
                    body: String::new(),
                })
            } else {
                Ok(crate::fetch::TransportResponse {
                    status: 200,
                    body: "<fixtures><fixture/></fixtures>".to_string(),
                })
            }
        }));
        let (scheduler, stats) = build_scheduler(dir.path(), 3, transport);

        let results = scheduler
            .fetch_date_range(date(2024, 1, 1), date(2024, 1, 5))
            .await
            .unwrap();

        assert_eq!(results.len(), 5);
        let failed: Vec<_> = results
            .values()
            .filter(|r| r.status == FetchStatus::Failed)
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].date, date(2024, 1, 3));

        let snapshot = stats.snapshot(None);
        assert_eq!(snapshot.api_calls, 4);
        assert_eq!(snapshot.failed_requests, 1);
        assert_eq!(
            snapshot.api_calls + snapshot.cache_hits + snapshot.failed_requests,
            snapshot.dates_processed
        );
    }

    #[tokio::test]
    async fn test_single_worker_behaves_sequentially() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(MockTransport::ok("<fixtures/>"));
        let (scheduler, _) = build_scheduler(dir.path(), 1, transport);

        let results = scheduler
            .fetch_date_range(date(2024, 1, 1), date(2024, 1, 3))
            .await
            .unwrap();

        let dates: Vec<_> = results.keys().copied().collect();
        assert_eq!(
            dates,
            vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]
        );
    }

    #[tokio::test]
    async fn test_results_are_keyed_in_ascending_date_order() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(MockTransport::ok("<fixtures/>"));
        let (scheduler, _) = build_scheduler(dir.path(), 5, transport);

        let results = scheduler
            .fetch_date_range(date(2024, 2, 27), date(2024, 3, 2))
            .await
            .unwrap();

        let dates: Vec<_> = results.keys().copied().collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
        // leap year: Feb 29 exists in the expansion
        assert!(results.contains_key(&date(2024, 2, 29)));
    }
}
