//! Clock abstraction so window arithmetic can be driven deterministically in tests.

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of the current time, in fractional seconds since the Unix epoch.
///
/// Entries are scored by epoch seconds so that every instance sharing one
/// counter store agrees on window boundaries. The value must be monotonic per
/// instance; bounded skew across instances is assumed, not corrected.
pub trait Clock: Send + Sync {
    fn now_seconds(&self) -> f64;
}

/// Wall clock backed by the system time.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_seconds(&self) -> f64 {
        chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }
}

/// Manually advanced clock for tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    micros: AtomicU64,
}

impl ManualClock {
    pub fn new(now_seconds: f64) -> Self {
        Self {
            micros: AtomicU64::new((now_seconds * 1_000_000.0) as u64),
        }
    }

    pub fn set(&self, now_seconds: f64) {
        self.micros
            .store((now_seconds * 1_000_000.0) as u64, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: f64) {
        self.micros
            .fetch_add((seconds * 1_000_000.0) as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_seconds(&self) -> f64 {
        self.micros.load(Ordering::SeqCst) as f64 / 1_000_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_epoch_based() {
        let now = SystemClock.now_seconds();
        // Any plausible wall clock is well past 2020-01-01.
        assert!(now > 1_577_836_800.0);
    }

    #[test]
    fn test_manual_clock_set_and_advance() {
        let clock = ManualClock::new(100.0);
        assert_eq!(clock.now_seconds(), 100.0);

        clock.advance(5.5);
        assert_eq!(clock.now_seconds(), 105.5);

        clock.set(42.0);
        assert_eq!(clock.now_seconds(), 42.0);
    }
}
