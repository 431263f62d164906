//! Rate limit policies and the per-scope registry.

use std::collections::HashMap;

use crate::error::{Result, WindgateError};

/// Immutable quota configuration bound to one protected resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    scope: String,
    quota: u64,
    window_seconds: u64,
}

impl RateLimitPolicy {
    /// Create a policy, validating its constraints.
    ///
    /// Violations fail here, at configuration load, never at request time.
    pub fn new(scope: impl Into<String>, quota: u64, window_seconds: u64) -> Result<Self> {
        let scope = scope.into();
        if scope.is_empty() {
            return Err(WindgateError::InvalidPolicy(
                "Scope name cannot be empty".to_string(),
            ));
        }
        if quota == 0 {
            return Err(WindgateError::InvalidPolicy(format!(
                "Quota must be at least 1 for scope '{}'",
                scope
            )));
        }
        if window_seconds == 0 {
            return Err(WindgateError::InvalidPolicy(format!(
                "Window must be at least 1 second for scope '{}'",
                scope
            )));
        }

        Ok(Self {
            scope,
            quota,
            window_seconds,
        })
    }

    /// The resource scope this policy protects.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Maximum admitted requests per window.
    pub fn quota(&self) -> u64 {
        self.quota
    }

    /// Length of the trailing window.
    pub fn window_seconds(&self) -> u64 {
        self.window_seconds
    }
}

/// Maps resource scopes to their policies. Built once at startup.
#[derive(Debug, Default)]
pub struct PolicyRegistry {
    policies: HashMap<String, RateLimitPolicy>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a policy, returning the one it replaced, if any.
    pub fn register(&mut self, policy: RateLimitPolicy) -> Option<RateLimitPolicy> {
        self.policies.insert(policy.scope().to_string(), policy)
    }

    /// Look up the policy for a resource scope.
    pub fn get(&self, scope: &str) -> Option<&RateLimitPolicy> {
        self.policies.get(scope)
    }

    /// Number of registered policies.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_policy() {
        let policy = RateLimitPolicy::new("login", 5, 60).unwrap();
        assert_eq!(policy.scope(), "login");
        assert_eq!(policy.quota(), 5);
        assert_eq!(policy.window_seconds(), 60);
    }

    #[test]
    fn test_zero_quota_is_rejected() {
        let err = RateLimitPolicy::new("login", 0, 60).unwrap_err();
        assert!(matches!(err, WindgateError::InvalidPolicy(_)));
    }

    #[test]
    fn test_zero_window_is_rejected() {
        let err = RateLimitPolicy::new("login", 5, 0).unwrap_err();
        assert!(matches!(err, WindgateError::InvalidPolicy(_)));
    }

    #[test]
    fn test_empty_scope_is_rejected() {
        let err = RateLimitPolicy::new("", 5, 60).unwrap_err();
        assert!(matches!(err, WindgateError::InvalidPolicy(_)));
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = PolicyRegistry::new();
        assert!(registry.is_empty());

        registry.register(RateLimitPolicy::new("login", 5, 60).unwrap());
        registry.register(RateLimitPolicy::new("upload", 10, 3600).unwrap());

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("login").unwrap().quota(), 5);
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn test_registering_same_scope_replaces() {
        let mut registry = PolicyRegistry::new();
        registry.register(RateLimitPolicy::new("login", 5, 60).unwrap());
        let replaced = registry.register(RateLimitPolicy::new("login", 10, 60).unwrap());

        assert_eq!(replaced.unwrap().quota(), 5);
        assert_eq!(registry.get("login").unwrap().quota(), 10);
    }
}
