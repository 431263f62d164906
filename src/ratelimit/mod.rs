//! Sliding-window rate limiting.

pub mod accountant;
pub mod admission;
pub mod decision;
pub mod key;
pub mod limiter;
pub mod policy;

pub use admission::AdmissionControl;
pub use decision::{decide, Verdict};
pub use key::{derive_key, RateLimitKey};
pub use limiter::SlidingWindowLimiter;
pub use policy::{PolicyRegistry, RateLimitPolicy};
