//! Whole-file JSON storage backend.
//!
//! The entire record set lives in one JSON document. Every mutation
//! reads the file, applies the change in memory, and rewrites the whole
//! document through a temp file + rename, so readers never observe a
//! partial write. Concurrent writers still race whole read-modify-write
//! cycles (last writer wins); that is an accepted limitation of this
//! backend. Use the SQLite backend where concurrent writers matter.

use std::path::PathBuf;

use async_trait::async_trait;

use super::store::{CacheRecord, NewRecord, SummaryStore};
use crate::Error;

/// Summary store kept in a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store backed by the given file path.
    ///
    /// The file is created lazily on the first write; a missing file
    /// reads as an empty record set.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<Vec<CacheRecord>, Error> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn persist(&self, records: &[CacheRecord]) -> Result<(), Error> {
        let bytes = serde_json::to_vec_pretty(records)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Newest-first order. RFC 3339 strings in UTC compare correctly as
/// plain strings, matching the SQL `ORDER BY accessed_at DESC`.
fn sort_by_recency(records: &mut [CacheRecord]) {
    records.sort_by(|a, b| b.accessed_at.cmp(&a.accessed_at));
}

#[async_trait]
impl SummaryStore for JsonFileStore {
    async fn exists(&self, subject_id: &str, style: &str) -> Result<bool, Error> {
        let records = self.load().await?;
        Ok(records
            .iter()
            .any(|r| r.subject_id == subject_id && r.style == style))
    }

    async fn get(&self, subject_id: &str, style: &str) -> Result<Option<CacheRecord>, Error> {
        let mut records = self.load().await?;
        let Some(record) = records
            .iter_mut()
            .find(|r| r.subject_id == subject_id && r.style == style)
        else {
            return Ok(None);
        };

        record.accessed_at = chrono::Utc::now().to_rfc3339();
        let found = record.clone();
        self.persist(&records).await?;

        Ok(Some(found))
    }

    async fn put(&self, record: &NewRecord, capacity: usize) -> Result<u64, Error> {
        let mut records = self.load().await?;
        let now = chrono::Utc::now().to_rfc3339();

        match records
            .iter_mut()
            .find(|r| r.subject_id == record.subject_id && r.style == record.style)
        {
            Some(existing) => {
                // created_at stays from the first write for this key.
                existing.source_url = record.source_url.clone();
                existing.title = record.title.clone();
                existing.raw_text = record.raw_text.clone();
                existing.accessed_at = now;
            }
            None => records.push(CacheRecord {
                subject_id: record.subject_id.clone(),
                style: record.style.clone(),
                source_url: record.source_url.clone(),
                title: record.title.clone(),
                raw_text: record.raw_text.clone(),
                created_at: now.clone(),
                accessed_at: now,
            }),
        }

        let mut evicted = 0u64;
        if records.len() > capacity {
            sort_by_recency(&mut records);
            evicted = (records.len() - capacity) as u64;
            records.truncate(capacity);
        }
        self.persist(&records).await?;

        Ok(evicted)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<CacheRecord>, Error> {
        let mut records = self.load().await?;
        sort_by_recency(&mut records);
        records.truncate(limit);
        Ok(records)
    }
}
