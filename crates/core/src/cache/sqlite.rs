//! Transactional SQLite storage backend.
//!
//! Wraps a tokio-rusqlite connection that runs database operations on a
//! background thread. Opening applies performance pragmas (WAL mode)
//! and runs any pending migrations. Every [`SummaryStore`] operation is
//! one transaction, so interleaved callers never observe partial writes
//! and the unique-key upsert is safe under race.

use std::path::Path;

use async_trait::async_trait;
use tokio_rusqlite::rusqlite;
use tokio_rusqlite::{Connection, params};

use super::migrations;
use super::store::{CacheRecord, NewRecord, SummaryStore};
use crate::Error;

/// SQLite-backed summary store.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies performance pragmas,
    /// and runs any pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    /// Open an in-memory database for testing.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA synchronous=NORMAL;
                 PRAGMA temp_store=MEMORY;
                 PRAGMA foreign_keys=ON;",
            )?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        migrations::run(&conn).await?;

        Ok(Self { conn })
    }
}

fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CacheRecord> {
    Ok(CacheRecord {
        subject_id: row.get(0)?,
        style: row.get(1)?,
        source_url: row.get(2)?,
        title: row.get(3)?,
        raw_text: row.get(4)?,
        created_at: row.get(5)?,
        accessed_at: row.get(6)?,
    })
}

const RECORD_COLUMNS: &str = "subject_id, style, source_url, title, raw_text, created_at, accessed_at";

#[async_trait]
impl SummaryStore for SqliteStore {
    async fn exists(&self, subject_id: &str, style: &str) -> Result<bool, Error> {
        let subject_id = subject_id.to_string();
        let style = style.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let found: bool = conn
                    .query_row(
                        "SELECT EXISTS(
                            SELECT 1 FROM summaries
                            WHERE subject_id = ?1 AND style = ?2
                        )",
                        params![subject_id, style],
                        |row| row.get(0),
                    )
                    .map_err(Error::from)?;

                Ok(found)
            })
            .await
            .map_err(Error::from)
    }

    async fn get(&self, subject_id: &str, style: &str) -> Result<Option<CacheRecord>, Error> {
        let subject_id = subject_id.to_string();
        let style = style.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<Option<CacheRecord>, Error> {
                let tx = conn.transaction().map_err(Error::from)?;

                let touched = tx.execute(
                    "UPDATE summaries SET accessed_at = ?3
                     WHERE subject_id = ?1 AND style = ?2",
                    params![subject_id, style, now],
                )?;
                if touched == 0 {
                    return Ok(None);
                }

                let record = tx.query_row(
                    &format!("SELECT {RECORD_COLUMNS} FROM summaries WHERE subject_id = ?1 AND style = ?2"),
                    params![subject_id, style],
                    record_from_row,
                )?;
                tx.commit().map_err(Error::from)?;

                Ok(Some(record))
            })
            .await
            .map_err(Error::from)
    }

    async fn put(&self, record: &NewRecord, capacity: usize) -> Result<u64, Error> {
        let record = record.clone();
        let now = chrono::Utc::now().to_rfc3339();
        let cap = capacity as i64;
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let tx = conn.transaction().map_err(Error::from)?;

                tx.execute(
                    "INSERT INTO summaries (subject_id, style, source_url, title, raw_text, created_at, accessed_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                     ON CONFLICT(subject_id, style) DO UPDATE SET
                        source_url = excluded.source_url,
                        title = excluded.title,
                        raw_text = excluded.raw_text,
                        accessed_at = excluded.accessed_at",
                    params![
                        record.subject_id,
                        record.style,
                        record.source_url,
                        record.title,
                        record.raw_text,
                        now,
                    ],
                )?;

                let count: i64 = tx.query_row("SELECT COUNT(*) FROM summaries", [], |row| row.get(0))?;
                let mut evicted = 0u64;
                if count > cap {
                    evicted = tx.execute(
                        "DELETE FROM summaries WHERE rowid IN (
                            SELECT rowid FROM summaries ORDER BY accessed_at ASC LIMIT ?1
                        )",
                        params![count - cap],
                    )? as u64;
                }
                tx.commit().map_err(Error::from)?;

                Ok(evicted)
            })
            .await
            .map_err(Error::from)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<CacheRecord>, Error> {
        let limit = limit as i64;
        self.conn
            .call(move |conn| -> Result<Vec<CacheRecord>, Error> {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {RECORD_COLUMNS} FROM summaries ORDER BY accessed_at DESC LIMIT ?1"
                ))?;
                let records = stmt
                    .query_map(params![limit], record_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                Ok(records)
            })
            .await
            .map_err(Error::from)
    }
}
