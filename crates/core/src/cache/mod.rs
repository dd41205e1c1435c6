//! Bounded recency cache for generated summaries.
//!
//! Stores raw generated text keyed by (subject, style) in one of two
//! interchangeable backends and evicts the least recently accessed
//! records once a fixed capacity is exceeded. The cache stores raw
//! text, not parsed points; readers run retrieved text through the
//! block parser themselves.
//!
//! Storage failures are never fatal here: the caller's primary flow is
//! displaying a freshly generated summary, and caching it is best
//! effort. Writes report a [`PutOutcome`] instead of raising; read
//! failures degrade to a miss after a warning.

pub mod jsonfile;
pub mod migrations;
pub mod sqlite;
pub mod store;

pub use jsonfile::JsonFileStore;
pub use sqlite::SqliteStore;
pub use store::{CacheRecord, NewRecord, SummaryStore};

use crate::Error;
use crate::config::{AppConfig, Backend};

/// Default maximum number of live records.
pub const DEFAULT_CAPACITY: usize = 100;

/// Outcome of a cache write.
///
/// Callers that only care about their primary flow can ignore this;
/// stricter callers can distinguish a dropped write from a saved one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    /// Record written, nothing evicted.
    Saved,
    /// Record written; this many least-recently-accessed records were
    /// deleted to get back under capacity.
    SavedWithEvictions(u64),
    /// The write failed and the record was dropped.
    Failed(String),
}

/// Recency cache over a pluggable storage backend.
///
/// Owns the storage handle for its lifetime; the backend is selected
/// once at construction. The cache itself holds no locks — atomicity of
/// individual operations is the backend's contract (see
/// [`SummaryStore`]).
pub struct RecencyCache {
    store: Box<dyn SummaryStore>,
    capacity: usize,
}

impl RecencyCache {
    /// Wrap an already-opened store.
    pub fn new(store: impl SummaryStore + 'static, capacity: usize) -> Self {
        Self { store: Box::new(store), capacity }
    }

    /// Open the backend named by the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the SQLite database cannot be opened or
    /// migrated. The JSON backend opens lazily and cannot fail here.
    pub async fn open(config: &AppConfig) -> Result<Self, Error> {
        let store: Box<dyn SummaryStore> = match config.backend {
            Backend::Sqlite => Box::new(SqliteStore::open(&config.db_path).await?),
            Backend::Json => Box::new(JsonFileStore::open(config.store_path.clone())),
        };

        Ok(Self { store, capacity: config.cache_capacity })
    }

    /// Whether a summary is cached for (subject, style).
    ///
    /// Storage failures are logged and read as `false`.
    pub async fn exists(&self, subject_id: &str, style: &str) -> bool {
        match self.store.exists(subject_id, style).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(subject_id, style, error = %e, "cache existence check failed; treating as miss");
                false
            }
        }
    }

    /// Fetch a cached summary, bumping its access stamp.
    ///
    /// Storage failures are logged and read as a miss.
    pub async fn get(&self, subject_id: &str, style: &str) -> Option<CacheRecord> {
        match self.store.get(subject_id, style).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(subject_id, style, error = %e, "cache read failed; treating as miss");
                None
            }
        }
    }

    /// Persist a summary, evicting down to capacity if needed.
    ///
    /// Never raises: a storage failure is logged and reported as
    /// [`PutOutcome::Failed`], and the caller proceeds as though the
    /// save were a no-op.
    pub async fn put(&self, record: &NewRecord) -> PutOutcome {
        match self.store.put(record, self.capacity).await {
            Ok(0) => PutOutcome::Saved,
            Ok(evicted) => {
                tracing::debug!(evicted, capacity = self.capacity, "evicted least recently accessed summaries");
                PutOutcome::SavedWithEvictions(evicted)
            }
            Err(e) => {
                tracing::warn!(
                    subject_id = %record.subject_id,
                    style = %record.style,
                    error = %e,
                    "cache write failed; summary not persisted"
                );
                PutOutcome::Failed(e.to_string())
            }
        }
    }

    /// The most recently accessed summaries, newest first.
    ///
    /// Storage failures are logged and read as an empty list.
    pub async fn list_recent(&self, limit: usize) -> Vec<CacheRecord> {
        match self.store.list_recent(limit).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(limit, error = %e, "cache listing failed; returning no records");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    fn make_record(subject_id: &str) -> NewRecord {
        NewRecord {
            subject_id: subject_id.to_string(),
            style: "concise".to_string(),
            source_url: format!("https://example.com/watch?v={subject_id}"),
            title: "Test Video".to_string(),
            raw_text: "0:00 intro".to_string(),
        }
    }

    /// Store whose every operation fails, for the degradation paths.
    struct BrokenStore;

    #[async_trait]
    impl SummaryStore for BrokenStore {
        async fn exists(&self, _subject_id: &str, _style: &str) -> Result<bool, Error> {
            Err(Error::MigrationFailed("broken".into()))
        }

        async fn get(&self, _subject_id: &str, _style: &str) -> Result<Option<CacheRecord>, Error> {
            Err(Error::MigrationFailed("broken".into()))
        }

        async fn put(&self, _record: &NewRecord, _capacity: usize) -> Result<u64, Error> {
            Err(Error::MigrationFailed("broken".into()))
        }

        async fn list_recent(&self, _limit: usize) -> Result<Vec<CacheRecord>, Error> {
            Err(Error::MigrationFailed("broken".into()))
        }
    }

    #[tokio::test]
    async fn test_put_outcomes() {
        let cache = RecencyCache::new(SqliteStore::open_in_memory().await.unwrap(), 2);

        assert_eq!(cache.put(&make_record("a")).await, PutOutcome::Saved);
        assert_eq!(cache.put(&make_record("b")).await, PutOutcome::Saved);
        assert_eq!(cache.put(&make_record("c")).await, PutOutcome::SavedWithEvictions(1));
    }

    #[tokio::test]
    async fn test_read_failures_degrade_to_miss() {
        let cache = RecencyCache::new(BrokenStore, DEFAULT_CAPACITY);

        assert!(!cache.exists("vid1", "concise").await);
        assert!(cache.get("vid1", "concise").await.is_none());
        assert!(cache.list_recent(5).await.is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_is_reported_not_raised() {
        let cache = RecencyCache::new(BrokenStore, DEFAULT_CAPACITY);

        match cache.put(&make_record("vid1")).await {
            PutOutcome::Failed(reason) => assert!(reason.contains("broken")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
