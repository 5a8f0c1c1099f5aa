//! # Statistics Collection Module
//!
//! ## Purpose
//! Process-wide counters for a fetch run, updated concurrently by fetch workers
//! and the consolidator, exposed as an immutable snapshot.
//!
//! ## Input/Output Specification
//! - **Input**: Counter events recorded by the fetcher, scheduler, and consolidator
//! - **Output**: `RunStatistics` snapshot with the lazily computed cache hit rate
//! - **Concurrency**: Updates are serialized through a lock so concurrent workers
//!   never lose increments

use parking_lot::RwLock;
use serde::Serialize;
use std::path::PathBuf;

/// Counter events recorded during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsEvent {
    /// A date was served from the cache
    CacheHit,
    /// A date was fetched from the API
    ApiCall,
    /// A date failed after retries were exhausted
    Failure,
    /// Fixtures extracted from one date's payload during consolidation
    FixturesFound(usize),
    /// One date finished processing, regardless of outcome
    DateProcessed,
}

#[derive(Debug, Clone, Default)]
struct Counters {
    dates_processed: usize,
    api_calls: usize,
    cache_hits: usize,
    failed_requests: usize,
    total_fixtures: usize,
}

/// Collector for run statistics
///
/// Shared across workers behind an `Arc`; `record` may be called concurrently.
#[derive(Debug, Default)]
pub struct StatsCollector {
    counters: RwLock<Counters>,
}

/// Read-only snapshot of a run's statistics
#[derive(Debug, Clone, Serialize)]
pub struct RunStatistics {
    /// Number of dates processed in the run
    pub dates_processed: usize,
    /// API requests that completed successfully
    pub api_calls: usize,
    /// Dates served from the cache without network access
    pub cache_hits: usize,
    /// Dates that failed after retries were exhausted
    pub failed_requests: usize,
    /// `cache_hits / dates_processed`, 0.0 when no dates were processed
    pub cache_hit_rate: f64,
    /// Total fixture elements found during consolidation
    pub total_fixtures: usize,
    /// Location of the consolidated document, if one was written
    pub output_path: Option<PathBuf>,
}

impl StatsCollector {
    /// Create a new collector with zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a counter event
    pub fn record(&self, event: StatsEvent) {
        let mut counters = self.counters.write();
        match event {
            StatsEvent::CacheHit => counters.cache_hits += 1,
            StatsEvent::ApiCall => counters.api_calls += 1,
            StatsEvent::Failure => counters.failed_requests += 1,
            StatsEvent::FixturesFound(n) => counters.total_fixtures += n,
            StatsEvent::DateProcessed => counters.dates_processed += 1,
        }
    }

    /// Reset all counters for a fresh run
    pub fn reset(&self) {
        *self.counters.write() = Counters::default();
    }

    /// Take a snapshot of the current counters
    ///
    /// The hit rate is computed here rather than stored, so it can never drift
    /// out of sync with the underlying counters.
    pub fn snapshot(&self, output_path: Option<PathBuf>) -> RunStatistics {
        let counters = self.counters.read();
        let cache_hit_rate = if counters.dates_processed == 0 {
            0.0
        } else {
            counters.cache_hits as f64 / counters.dates_processed as f64
        };

        RunStatistics {
            dates_processed: counters.dates_processed,
            api_calls: counters.api_calls,
            cache_hits: counters.cache_hits,
            failed_requests: counters.failed_requests,
            cache_hit_rate,
            total_fixtures: counters.total_fixtures,
            output_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_record_and_snapshot() {
        let stats = StatsCollector::new();
        stats.record(StatsEvent::ApiCall);
        stats.record(StatsEvent::ApiCall);
        stats.record(StatsEvent::CacheHit);
        stats.record(StatsEvent::Failure);
        stats.record(StatsEvent::FixturesFound(7));
        for _ in 0..4 {
            stats.record(StatsEvent::DateProcessed);
        }

        let snapshot = stats.snapshot(None);
        assert_eq!(snapshot.api_calls, 2);
        assert_eq!(snapshot.cache_hits, 1);
        assert_eq!(snapshot.failed_requests, 1);
        assert_eq!(snapshot.total_fixtures, 7);
        assert_eq!(snapshot.dates_processed, 4);
        assert!((snapshot.cache_hit_rate - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_run_has_zero_hit_rate() {
        let stats = StatsCollector::new();
        assert_eq!(stats.snapshot(None).cache_hit_rate, 0.0);
    }

    #[test]
    fn test_reset_clears_counters() {
        let stats = StatsCollector::new();
        stats.record(StatsEvent::ApiCall);
        stats.reset();
        assert_eq!(stats.snapshot(None).api_calls, 0);
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let stats = Arc::new(StatsCollector::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let stats = stats.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..1000 {
                    stats.record(StatsEvent::ApiCall);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(stats.snapshot(None).api_calls, 8000);
    }
}
