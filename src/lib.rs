//! Windgate - Distributed Sliding-Window Rate Limiting
//!
//! This crate decides, per (client identity, resource scope) pair, whether a
//! request is admitted against a quota counted over a trailing time window.
//! All shared state lives in an external counter store, so the decision is
//! correct across any number of stateless service instances sharing one
//! store. The upstream request layer supplies identities and attaches
//! transport semantics to the verdict; neither is handled here.

pub mod clock;
pub mod config;
pub mod error;
pub mod ratelimit;
pub mod store;

pub use config::{FailureMode, WindgateConfig};
pub use error::{Result, WindgateError};
pub use ratelimit::{AdmissionControl, SlidingWindowLimiter, Verdict};
pub use store::{CounterStore, MemoryStore, RedisStore};
