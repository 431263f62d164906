//! Core sliding-window limiter implementation.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::accountant::WindowAccountant;
use super::admission::AdmissionControl;
use super::decision::{decide, Verdict};
use super::key::derive_key;
use super::policy::PolicyRegistry;
use crate::clock::{Clock, SystemClock};
use crate::config::{FailureMode, WindgateConfig};
use crate::error::{Result, WindgateError};
use crate::store::CounterStore;

/// Sliding-window rate limiter over a shared counter store.
///
/// The limiter itself is stateless apart from its configuration: every
/// request attempt becomes one atomic store operation, so any number of
/// instances holding a limiter over the same store enforce one shared quota.
pub struct SlidingWindowLimiter {
    accountant: WindowAccountant,
    registry: PolicyRegistry,
    failure_mode: FailureMode,
    count_rejected: bool,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SlidingWindowLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlidingWindowLimiter")
            .field("registry", &self.registry)
            .field("failure_mode", &self.failure_mode)
            .field("count_rejected", &self.count_rejected)
            .finish_non_exhaustive()
    }
}

impl SlidingWindowLimiter {
    /// Create a limiter with the default wall clock, fail-open behavior, and
    /// rejected attempts counting toward the quota.
    pub fn new(store: Arc<dyn CounterStore>, registry: PolicyRegistry) -> Self {
        Self::with_clock(store, registry, Arc::new(SystemClock))
    }

    /// Create a limiter with an injected clock.
    pub fn with_clock(
        store: Arc<dyn CounterStore>,
        registry: PolicyRegistry,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accountant: WindowAccountant::new(store),
            registry,
            failure_mode: FailureMode::Open,
            count_rejected: true,
            clock,
        }
    }

    /// Build a limiter from configuration, validating every scope policy.
    pub fn from_config(config: &WindgateConfig, store: Arc<dyn CounterStore>) -> Result<Self> {
        let registry = config.build_registry()?;
        Ok(Self::new(store, registry)
            .failure_mode(config.failure_mode)
            .count_rejected(config.count_rejected))
    }

    /// Set how store outages are translated into verdicts.
    pub fn failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    /// Set whether rejected attempts still cost quota.
    ///
    /// When `false`, over-quota attempts are observed but not recorded, so a
    /// burst of rejections does not keep the window saturated.
    pub fn count_rejected(mut self, count_rejected: bool) -> Self {
        self.count_rejected = count_rejected;
        self
    }

    /// Translate a store outage into a verdict per the configured failure
    /// mode. Never silent: every occurrence is logged with the mode taken.
    fn degraded_verdict(&self, scope: &str, policy_window: u64, reason: &str) -> Verdict {
        match self.failure_mode {
            FailureMode::Open => {
                warn!(scope = scope, reason = reason, "Counter store unavailable, failing open");
                Verdict {
                    admitted: true,
                    current_count: 0,
                    retry_after_seconds: 0,
                }
            }
            FailureMode::Closed => {
                warn!(scope = scope, reason = reason, "Counter store unavailable, failing closed");
                Verdict {
                    admitted: false,
                    current_count: 0,
                    retry_after_seconds: policy_window,
                }
            }
        }
    }
}

#[async_trait]
impl AdmissionControl for SlidingWindowLimiter {
    async fn check_and_record(
        &self,
        client_identity: &str,
        resource_scope: &str,
    ) -> Result<Verdict> {
        let policy = self
            .registry
            .get(resource_scope)
            .ok_or_else(|| WindgateError::UnknownScope(resource_scope.to_string()))?;

        let key = derive_key(client_identity, resource_scope)?;
        let now = self.clock.now_seconds();
        let record_limit = if self.count_rejected {
            None
        } else {
            Some(policy.quota())
        };

        match self
            .accountant
            .record_and_count(&key, now, policy.window_seconds(), record_limit)
            .await
        {
            Ok(snapshot) => {
                let verdict = decide(snapshot.count, policy, now, snapshot.window_start);
                debug!(
                    scope = resource_scope,
                    admitted = verdict.admitted,
                    count = verdict.current_count,
                    "Admission decided"
                );
                Ok(verdict)
            }
            Err(WindgateError::StoreUnavailable(reason)) => Ok(self.degraded_verdict(
                resource_scope,
                policy.window_seconds(),
                &reason,
            )),
            Err(e) => Err(e),
        }
    }
}
