//! Counter store abstraction.
//!
//! The limiter keeps no shared mutable state of its own: all of it lives in a
//! store offering an ordered set per key with remove-range-by-score,
//! add-with-score, count-in-score-range, and expiry, executed atomically as
//! one unit per key.

use async_trait::async_trait;

use crate::error::Result;

mod memory;
mod redis;

pub use self::redis::RedisStore;
pub use memory::MemoryStore;

/// Result of one atomic record-and-count execution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSnapshot {
    /// Entries in the trailing window, including the current attempt.
    pub count: u64,
    /// Timestamp of the oldest entry still inside the window.
    pub window_start: f64,
}

/// A shared, per-key-atomic counting store.
///
/// Implementations must make `record_and_count` indivisible with respect to
/// other concurrent callers on the same key: two concurrent calls must never
/// observe the same pre-increment count. No cross-key ordering is required.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically purge entries with timestamps strictly below
    /// `now_seconds - window_seconds`, record the current attempt at
    /// `now_seconds`, count entries in `[now - window, now]`, and refresh the
    /// key's expiry to `window_seconds`.
    ///
    /// When `record_limit` is set, the attempt is recorded only while the
    /// in-window count is below that limit; the returned count still includes
    /// the current attempt either way, so the caller's decision logic is
    /// unchanged.
    async fn record_and_count(
        &self,
        key: &str,
        now_seconds: f64,
        window_seconds: u64,
        record_limit: Option<u64>,
    ) -> Result<WindowSnapshot>;

    /// Verify the store is reachable.
    async fn health_check(&self) -> Result<()>;
}
