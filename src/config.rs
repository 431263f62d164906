//! Configuration management for Windgate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, WindgateError};
use crate::ratelimit::{PolicyRegistry, RateLimitPolicy};

/// Main configuration for the limiter. Loaded once at process start; there is
/// no hot-reload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindgateConfig {
    /// Counter store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// How requests are treated when the counter store is unreachable
    #[serde(default)]
    pub failure_mode: FailureMode,

    /// Whether rejected attempts still cost quota
    #[serde(default = "default_count_rejected")]
    pub count_rejected: bool,

    /// Map of resource scope name to its quota policy
    #[serde(default)]
    pub scopes: HashMap<String, ScopePolicy>,
}

impl Default for WindgateConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            failure_mode: FailureMode::default(),
            count_rejected: default_count_rejected(),
            scopes: HashMap::new(),
        }
    }
}

/// Counter store connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store URL (e.g., "redis://localhost:6379")
    #[serde(default = "default_store_url")]
    pub url: String,

    /// Maximum number of pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Connection establishment timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Per-command timeout in seconds
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout(),
            command_timeout_secs: default_command_timeout(),
        }
    }
}

fn default_store_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_max_connections() -> usize {
    50
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_command_timeout() -> u64 {
    2
}

fn default_count_rejected() -> bool {
    true
}

/// How the limiter treats a request when the counter store cannot be reached.
/// The choice is explicit configuration; the event is always logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// Admit the request; favors availability.
    #[default]
    Open,
    /// Reject the request; favors strict quota enforcement.
    Closed,
}

/// Quota policy for one resource scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopePolicy {
    /// Maximum admitted requests per window
    pub quota: u64,
    /// Length of the trailing window in seconds
    pub window_seconds: u64,
}

impl WindgateConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &str) -> Result<Self> {
        info!(path = path, "Loading rate limit configuration");
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| WindgateError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Validate every scope policy and build the registry.
    ///
    /// An invalid policy fails here, at startup, never at request time.
    pub fn build_registry(&self) -> Result<PolicyRegistry> {
        let mut registry = PolicyRegistry::new();
        for (scope, policy) in &self.scopes {
            registry.register(RateLimitPolicy::new(
                scope.clone(),
                policy.quota,
                policy.window_seconds,
            )?);
        }
        info!(scopes = registry.len(), "Rate limit policies registered");
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WindgateConfig::default();
        assert_eq!(config.store.url, "redis://localhost:6379");
        assert_eq!(config.store.max_connections, 50);
        assert_eq!(config.failure_mode, FailureMode::Open);
        assert!(config.count_rejected);
        assert!(config.scopes.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
store:
  url: redis://cache.internal:6379
  max_connections: 10
failure_mode: closed
count_rejected: false
scopes:
  login:
    quota: 5
    window_seconds: 60
  upload:
    quota: 100
    window_seconds: 3600
"#;
        let config = WindgateConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.store.url, "redis://cache.internal:6379");
        assert_eq!(config.store.max_connections, 10);
        // Unspecified store fields keep their defaults.
        assert_eq!(config.store.connect_timeout_secs, 5);
        assert_eq!(config.failure_mode, FailureMode::Closed);
        assert!(!config.count_rejected);
        assert_eq!(config.scopes.len(), 2);
        assert_eq!(config.scopes["login"].quota, 5);
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let err = WindgateConfig::from_yaml("scopes: [unclosed").unwrap_err();
        assert!(matches!(err, WindgateError::Config(_)));
    }

    #[test]
    fn test_build_registry() {
        let yaml = r#"
scopes:
  login:
    quota: 5
    window_seconds: 60
"#;
        let config = WindgateConfig::from_yaml(yaml).unwrap();
        let registry = config.build_registry().unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("login").unwrap().window_seconds(), 60);
    }

    #[test]
    fn test_zero_quota_fails_at_load() {
        let yaml = r#"
scopes:
  login:
    quota: 0
    window_seconds: 60
"#;
        let config = WindgateConfig::from_yaml(yaml).unwrap();
        let err = config.build_registry().unwrap_err();
        assert!(matches!(err, WindgateError::InvalidPolicy(_)));
    }
}
