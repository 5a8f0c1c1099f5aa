//! # Cache Store Module
//!
//! ## Purpose
//! Disk-backed cache of raw API payloads, one file per date, so repeat runs
//! skip the network entirely for dates already fetched.
//!
//! ## Input/Output Specification
//! - **Input**: A date key and the raw XML payload fetched for it
//! - **Output**: Cached payload on lookup, byte-identical to what was stored
//! - **Storage**: `fixtures_YYYYMMDD.xml` files under the configured cache directory
//!
//! ## Key Features
//! - Deterministic key derivation from the date
//! - Lazy creation of the cache directory on first write
//! - Cache I/O failures degrade to miss behavior instead of failing the run
//! - Same-key writes are serialized (last writer wins)
//! - No expiry: absence is the only invalidation

use crate::errors::{FetchError, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Disk-backed payload cache
pub struct CacheStore {
    cache_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl CacheStore {
    /// Create a store rooted at `cache_dir`. The directory itself is created
    /// lazily on the first write.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Derive the cache key for a date
    pub fn cache_key(date: NaiveDate) -> String {
        format!("fixtures_{}", date.format("%Y%m%d"))
    }

    fn entry_path(&self, date: NaiveDate) -> PathBuf {
        self.cache_dir.join(format!("{}.xml", Self::cache_key(date)))
    }

    /// Look up the cached payload for a date
    ///
    /// Any read failure other than a missing file is logged and reported as a
    /// miss; caching is an optimization, not a correctness dependency.
    pub async fn get(&self, date: NaiveDate) -> Option<String> {
        let path = self.entry_path(date);
        match tokio::fs::read_to_string(&path).await {
            Ok(payload) => {
                debug!("cache hit for {} at {:?}", date, path);
                Some(payload)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("failed to read cache entry {:?}: {}", path, e);
                None
            }
        }
    }

    /// Store a payload for a date, overwriting any previous entry
    pub async fn put(&self, date: NaiveDate, payload: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        tokio::fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| FetchError::Cache {
                details: format!("failed to create cache dir {:?}: {}", self.cache_dir, e),
            })?;

        let path = self.entry_path(date);
        tokio::fs::write(&path, payload)
            .await
            .map_err(|e| FetchError::Cache {
                details: format!("failed to write cache entry {:?}: {}", path, e),
            })?;

        debug!("cached payload for {} at {:?}", date, path);
        Ok(())
    }

    /// Remove all cached entry files, returning how many were deleted
    pub async fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        let mut entries = match tokio::fs::read_dir(&self.cache_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with("fixtures_") && name.ends_with(".xml") {
                tokio::fs::remove_file(entry.path()).await?;
                removed += 1;
            }
        }

        debug!("cleared {} cache entries from {:?}", removed, self.cache_dir);
        Ok(removed)
    }

    /// Root directory of the store
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(CacheStore::cache_key(date(2024, 1, 5)), "fixtures_20240105");
        assert_eq!(CacheStore::cache_key(date(2024, 12, 31)), "fixtures_20241231");
    }

    #[tokio::test]
    async fn test_miss_on_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        assert!(store.get(date(2024, 1, 1)).await.is_none());
    }

    #[tokio::test]
    async fn test_round_trip_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let payload = "<fixtures>\n  <fixture id=\"1\"/>\n</fixtures>";

        store.put(date(2024, 1, 1), payload).await.unwrap();
        let cached = store.get(date(2024, 1, 1)).await.unwrap();

        assert_eq!(cached, payload);
    }

    #[tokio::test]
    async fn test_put_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("deep").join("cache");
        let store = CacheStore::new(&nested);

        store.put(date(2024, 3, 15), "<fixtures/>").await.unwrap();

        assert!(nested.join("fixtures_20240315.xml").exists());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());

        store.put(date(2024, 1, 1), "<old/>").await.unwrap();
        store.put(date(2024, 1, 1), "<new/>").await.unwrap();

        assert_eq!(store.get(date(2024, 1, 1)).await.unwrap(), "<new/>");
    }

    #[tokio::test]
    async fn test_clear_removes_only_cache_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());

        store.put(date(2024, 1, 1), "<a/>").await.unwrap();
        store.put(date(2024, 1, 2), "<b/>").await.unwrap();
        std::fs::write(dir.path().join("consolidated_fixtures.xml"), "<out/>").unwrap();

        let removed = store.clear().await.unwrap();

        assert_eq!(removed, 2);
        assert!(store.get(date(2024, 1, 1)).await.is_none());
        assert!(dir.path().join("consolidated_fixtures.xml").exists());
    }

    #[tokio::test]
    async fn test_clear_on_missing_directory_is_noop() {
        let store = CacheStore::new("/nonexistent/fixture/cache/dir");
        assert_eq!(store.clear().await.unwrap(), 0);
    }
}
