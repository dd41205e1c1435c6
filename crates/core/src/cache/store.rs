//! Storage capability behind the recency cache.
//!
//! One trait, two interchangeable implementations: the transactional
//! SQLite backend ([`super::SqliteStore`]) and the whole-file JSON
//! backend ([`super::JsonFileStore`]). The backend is chosen at cache
//! construction time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Error;

/// A cached summary record.
///
/// The pair (`subject_id`, `style`) is the cache key and is unique
/// across all live records. `raw_text` holds the unparsed generated
/// text; readers run it through the block parser themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord {
    pub subject_id: String,
    pub style: String,
    pub source_url: String,
    pub title: String,
    pub raw_text: String,
    /// RFC 3339. Set when the key is first written, immutable afterwards.
    pub created_at: String,
    /// RFC 3339. Bumped on every successful read and on every write.
    pub accessed_at: String,
}

/// Caller-supplied fields for a write. Timestamps are stamped by the
/// backend.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub subject_id: String,
    pub style: String,
    pub source_url: String,
    pub title: String,
    pub raw_text: String,
}

/// Persistence operations consumed by [`super::RecencyCache`].
///
/// Each operation must be atomic on the backend's own terms. The SQLite
/// backend runs each call as one transaction, so interleaved callers
/// are safe. The whole-file backend rewrites the entire record set per
/// call; concurrent writers there race read-modify-write cycles and the
/// last writer wins, an accepted limitation of that backend.
#[async_trait]
pub trait SummaryStore: Send + Sync {
    /// Whether a record exists for (`subject_id`, `style`).
    async fn exists(&self, subject_id: &str, style: &str) -> Result<bool, Error>;

    /// Fetch a record, stamping its `accessed_at` to now and persisting
    /// that update before returning.
    async fn get(&self, subject_id: &str, style: &str) -> Result<Option<CacheRecord>, Error>;

    /// Upsert by (`subject_id`, `style`). An existing record keeps its
    /// `created_at`; `accessed_at` is set to now in both cases. After
    /// the write, records are evicted in ascending `accessed_at` order
    /// until at most `capacity` remain. The freshly written record is
    /// never evicted since it carries the newest access stamp.
    ///
    /// Returns the number of evicted records.
    async fn put(&self, record: &NewRecord, capacity: usize) -> Result<u64, Error>;

    /// Records ordered by `accessed_at` descending, truncated to `limit`.
    async fn list_recent(&self, limit: usize) -> Result<Vec<CacheRecord>, Error>;
}
