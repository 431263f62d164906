//! Admission decision.

use serde::Serialize;

use super::policy::RateLimitPolicy;

/// Outcome of one admission check. Produced fresh per request, never
/// persisted. Serializable so an upstream layer can surface it directly in a
/// rate-limit-exceeded response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Whether the request may proceed.
    pub admitted: bool,
    /// Requests counted in the trailing window, including this attempt.
    pub current_count: u64,
    /// Seconds a rejected caller should wait before retrying. Zero when
    /// admitted.
    pub retry_after_seconds: u64,
}

/// Compare the in-window count against the policy quota.
///
/// The attempt that brings the count exactly to the quota is admitted; the
/// first rejection is the `quota + 1`-th attempt in the window. For rejected
/// attempts the retry hint is the time until the oldest in-window entry ages
/// out, rounded up and clamped at zero.
pub fn decide(
    current_count: u64,
    policy: &RateLimitPolicy,
    now_seconds: f64,
    window_start: f64,
) -> Verdict {
    if current_count > policy.quota() {
        let resets_at = window_start + policy.window_seconds() as f64;
        let retry_after_seconds = (resets_at - now_seconds).ceil().max(0.0) as u64;
        Verdict {
            admitted: false,
            current_count,
            retry_after_seconds,
        }
    } else {
        Verdict {
            admitted: true,
            current_count,
            retry_after_seconds: 0,
        }
    }
}
