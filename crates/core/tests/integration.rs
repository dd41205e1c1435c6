//! Integration tests for the summary cache core.
//!
//! Exercises the recency cache end to end against both storage
//! backends, plus the parse-and-persist flow the caller follows.

use std::time::Duration;

use recap_core::cache::{JsonFileStore, SqliteStore};
use recap_core::{NewRecord, PutOutcome, RecencyCache, parse};

fn make_record(subject_id: &str, style: &str, raw_text: &str) -> NewRecord {
    NewRecord {
        subject_id: subject_id.to_string(),
        style: style.to_string(),
        source_url: format!("https://example.com/watch?v={subject_id}"),
        title: format!("Video {subject_id}"),
        raw_text: raw_text.to_string(),
    }
}

/// Let consecutive access stamps differ even on coarse clocks.
async fn tick() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

async fn sqlite_cache(capacity: usize) -> RecencyCache {
    RecencyCache::new(SqliteStore::open_in_memory().await.unwrap(), capacity)
}

fn json_cache(dir: &tempfile::TempDir, capacity: usize) -> RecencyCache {
    RecencyCache::new(JsonFileStore::open(dir.path().join("cache.json")), capacity)
}

async fn check_capacity_invariant(cache: &RecencyCache, capacity: usize) {
    for i in 0..capacity + 5 {
        let outcome = cache.put(&make_record(&format!("vid{i}"), "concise", "0:00 intro")).await;
        assert!(!matches!(outcome, PutOutcome::Failed(_)));

        let live = cache.list_recent(capacity + 10).await;
        assert!(live.len() <= capacity, "live count {} exceeds capacity {capacity}", live.len());
        tick().await;
    }

    // The survivors are exactly the most recently written keys.
    let live = cache.list_recent(capacity + 10).await;
    assert_eq!(live.len(), capacity);
    let newest: Vec<String> = live.iter().map(|r| r.subject_id.clone()).collect();
    for i in 5..capacity + 5 {
        assert!(newest.contains(&format!("vid{i}")));
    }
}

#[tokio::test]
async fn test_capacity_invariant_sqlite() {
    check_capacity_invariant(&sqlite_cache(4).await, 4).await;
}

#[tokio::test]
async fn test_capacity_invariant_json() {
    let dir = tempfile::tempdir().unwrap();
    check_capacity_invariant(&json_cache(&dir, 4), 4).await;
}

async fn check_recently_read_survives_eviction(cache: &RecencyCache) {
    for id in ["a", "b", "c"] {
        cache.put(&make_record(id, "concise", "0:00 intro")).await;
        tick().await;
    }

    // Reading "a" makes "b" the eviction candidate.
    assert!(cache.get("a", "concise").await.is_some());
    tick().await;

    let outcome = cache.put(&make_record("d", "concise", "0:00 intro")).await;
    assert_eq!(outcome, PutOutcome::SavedWithEvictions(1));

    assert!(cache.exists("a", "concise").await);
    assert!(!cache.exists("b", "concise").await);
    assert!(cache.exists("c", "concise").await);
    assert!(cache.exists("d", "concise").await);
}

#[tokio::test]
async fn test_recently_read_survives_eviction_sqlite() {
    check_recently_read_survives_eviction(&sqlite_cache(3).await).await;
}

#[tokio::test]
async fn test_recently_read_survives_eviction_json() {
    let dir = tempfile::tempdir().unwrap();
    check_recently_read_survives_eviction(&json_cache(&dir, 3)).await;
}

async fn check_key_uniqueness(cache: &RecencyCache) {
    cache.put(&make_record("vid1", "concise", "first text")).await;
    let first = cache.get("vid1", "concise").await.unwrap();
    tick().await;

    cache.put(&make_record("vid1", "concise", "second text")).await;

    let live = cache.list_recent(10).await;
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].raw_text, "second text");
    assert_eq!(live[0].created_at, first.created_at);
    assert!(live[0].accessed_at > first.accessed_at);
}

#[tokio::test]
async fn test_key_uniqueness_sqlite() {
    check_key_uniqueness(&sqlite_cache(100).await).await;
}

#[tokio::test]
async fn test_key_uniqueness_json() {
    let dir = tempfile::tempdir().unwrap();
    check_key_uniqueness(&json_cache(&dir, 100)).await;
}

async fn check_get_bumps_access_stamp(cache: &RecencyCache) {
    cache.put(&make_record("vid1", "concise", "0:00 intro")).await;
    let before = chrono::Utc::now().to_rfc3339();
    tick().await;

    let record = cache.get("vid1", "concise").await.unwrap();
    assert!(record.accessed_at >= before);
}

#[tokio::test]
async fn test_get_bumps_access_stamp_sqlite() {
    check_get_bumps_access_stamp(&sqlite_cache(100).await).await;
}

#[tokio::test]
async fn test_get_bumps_access_stamp_json() {
    let dir = tempfile::tempdir().unwrap();
    check_get_bumps_access_stamp(&json_cache(&dir, 100)).await;
}

async fn check_list_recent_order_and_limit(cache: &RecencyCache) {
    for id in ["a", "b", "c", "d"] {
        cache.put(&make_record(id, "concise", "0:00 intro")).await;
        tick().await;
    }
    cache.get("b", "concise").await.unwrap();

    let listed = cache.list_recent(3).await;
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].subject_id, "b");
    for pair in listed.windows(2) {
        assert!(pair[0].accessed_at >= pair[1].accessed_at);
    }
}

#[tokio::test]
async fn test_list_recent_order_and_limit_sqlite() {
    check_list_recent_order_and_limit(&sqlite_cache(100).await).await;
}

#[tokio::test]
async fn test_list_recent_order_and_limit_json() {
    let dir = tempfile::tempdir().unwrap();
    check_list_recent_order_and_limit(&json_cache(&dir, 100)).await;
}

#[tokio::test]
async fn test_parse_and_persist_flow() {
    // The caller's flow: miss, generate, parse for display, persist raw
    // text, then later hit and re-parse the stored text.
    let cache = sqlite_cache(100).await;
    let generated = "0:00 welcome\n2:15 the main argument\n\n\nclosing thoughts";

    assert!(!cache.exists("vid1", "detailed").await);

    let points = parse(generated);
    assert_eq!(points.len(), 3);

    cache.put(&make_record("vid1", "detailed", generated)).await;

    let record = cache.get("vid1", "detailed").await.unwrap();
    assert_eq!(record.raw_text, generated);
    assert_eq!(parse(&record.raw_text), points);
}
