//! In-memory counter store.
//!
//! Suitable for tests and single-instance deployments. Per-key atomicity
//! comes from the map's shard locks: the entry guard is held for the whole
//! record-and-count unit, and the unit never suspends while holding it.

use async_trait::async_trait;
use dashmap::DashMap;

use super::{CounterStore, WindowSnapshot};
use crate::error::Result;

/// Counter store backed by a concurrent in-process map.
///
/// Abandoned keys are purged lazily on their next access rather than by TTL;
/// a multi-instance deployment should use [`super::RedisStore`] instead.
#[derive(Debug, Default)]
pub struct MemoryStore {
    windows: DashMap<String, Vec<f64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently holding entries.
    pub fn key_count(&self) -> usize {
        self.windows.len()
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn record_and_count(
        &self,
        key: &str,
        now_seconds: f64,
        window_seconds: u64,
        record_limit: Option<u64>,
    ) -> Result<WindowSnapshot> {
        let floor = now_seconds - window_seconds as f64;

        let mut entries = self.windows.entry(key.to_string()).or_default();
        entries.retain(|&ts| ts >= floor);

        let in_window = entries.iter().filter(|&&ts| ts <= now_seconds).count() as u64;
        let record = match record_limit {
            None => true,
            Some(limit) => in_window < limit,
        };
        if record {
            // Entries stay sorted by timestamp even if callers hand in
            // out-of-order times.
            let at = entries.partition_point(|&ts| ts <= now_seconds);
            entries.insert(at, now_seconds);
        }

        let window_start = entries.first().copied().unwrap_or(now_seconds);

        Ok(WindowSnapshot {
            count: in_window + 1,
            window_start,
        })
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_count_includes_current_attempt() {
        let store = MemoryStore::new();

        let first = assert_ok!(store.record_and_count("k", 0.0, 60, None).await);
        assert_eq!(first.count, 1);
        assert_eq!(first.window_start, 0.0);

        let second = assert_ok!(store.record_and_count("k", 1.0, 60, None).await);
        assert_eq!(second.count, 2);
        assert_eq!(second.window_start, 0.0);
    }

    #[tokio::test]
    async fn test_entries_outside_window_are_purged() {
        let store = MemoryStore::new();

        store.record_and_count("k", 0.0, 10, None).await.unwrap();
        store.record_and_count("k", 5.0, 10, None).await.unwrap();

        // At t=20.1 both earlier entries have aged out.
        let snapshot = store.record_and_count("k", 20.1, 10, None).await.unwrap();
        assert_eq!(snapshot.count, 1);
        assert_eq!(snapshot.window_start, 20.1);
    }

    #[tokio::test]
    async fn test_duplicate_timestamps_count_independently() {
        let store = MemoryStore::new();

        store.record_and_count("k", 3.0, 60, None).await.unwrap();
        let snapshot = store.record_and_count("k", 3.0, 60, None).await.unwrap();
        assert_eq!(snapshot.count, 2);
    }

    #[tokio::test]
    async fn test_record_limit_skips_recording_over_quota() {
        let store = MemoryStore::new();

        store.record_and_count("k", 0.0, 60, Some(2)).await.unwrap();
        store.record_and_count("k", 1.0, 60, Some(2)).await.unwrap();

        // Over the limit: counted for this decision but not persisted.
        let third = store.record_and_count("k", 2.0, 60, Some(2)).await.unwrap();
        assert_eq!(third.count, 3);

        // Only the two recorded entries remain visible to the next attempt.
        let fourth = store.record_and_count("k", 3.0, 60, Some(2)).await.unwrap();
        assert_eq!(fourth.count, 3);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let store = MemoryStore::new();

        store.record_and_count("a", 0.0, 60, None).await.unwrap();
        let other = store.record_and_count("b", 0.0, 60, None).await.unwrap();
        assert_eq!(other.count, 1);
        assert_eq!(store.key_count(), 2);
    }
}
