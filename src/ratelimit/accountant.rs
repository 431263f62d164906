//! Window accounting against the counter store.

use std::sync::Arc;

use tracing::trace;

use super::key::RateLimitKey;
use crate::error::Result;
use crate::store::{CounterStore, WindowSnapshot};

/// Prefix for limiter keys in the shared store, keeping window state apart
/// from anything else living in the same keyspace.
const KEY_PREFIX: &str = "windgate";

/// Executes the atomic record-and-count unit for a limiter key.
///
/// Holds no mutable state of its own: correctness under concurrency is
/// delegated entirely to the store's per-key atomic execution. The only
/// suspension point on the request path is the store call made here.
pub struct WindowAccountant {
    store: Arc<dyn CounterStore>,
}

impl WindowAccountant {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Record the current attempt and count requests in the trailing window.
    ///
    /// The entry may be recorded even when the caller later times out waiting
    /// for the response; over-counting is the safe failure direction.
    pub async fn record_and_count(
        &self,
        key: &RateLimitKey,
        now_seconds: f64,
        window_seconds: u64,
        record_limit: Option<u64>,
    ) -> Result<WindowSnapshot> {
        let store_key = format!("{}:{}", KEY_PREFIX, key);

        let snapshot = self
            .store
            .record_and_count(&store_key, now_seconds, window_seconds, record_limit)
            .await?;

        trace!(
            key = %key,
            count = snapshot.count,
            window_start = snapshot.window_start,
            "Window accounted"
        );

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::key::derive_key;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_accountant_namespaces_store_keys() {
        let store = Arc::new(MemoryStore::new());
        let accountant = WindowAccountant::new(store.clone());
        let key = derive_key("10.0.0.1", "login").unwrap();

        accountant
            .record_and_count(&key, 0.0, 60, None)
            .await
            .unwrap();

        // The raw digest is not used as the store key directly.
        let raw = store
            .record_and_count(key.as_str(), 0.0, 60, None)
            .await
            .unwrap();
        assert_eq!(raw.count, 1);
        assert_eq!(store.key_count(), 2);
    }
}
