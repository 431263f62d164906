//! Redis-backed counter store.
//!
//! One sorted set per limiter key, scored by fractional epoch seconds. The
//! purge-record-count-expire unit runs as a server-side Lua script, so it is
//! indivisible with respect to every other caller on the same key regardless
//! of how many service instances share the store. Members carry a random
//! suffix so simultaneous attempts at the identical timestamp remain distinct
//! set members and are counted independently.

use std::time::Duration;

use async_trait::async_trait;
use deadpool::managed::{PoolConfig, Timeouts};
use deadpool_redis::{Config as PoolSettings, Pool, Runtime};
use redis::{Script, Value};
use tracing::{debug, error, info};
use uuid::Uuid;

use super::{CounterStore, WindowSnapshot};
use crate::config::StoreConfig;
use crate::error::{Result, WindgateError};

const SLIDING_WINDOW_SCRIPT: &str = include_str!("../../scripts/sliding_window.lua");

/// Counter store client over a pooled Redis connection.
pub struct RedisStore {
    pool: Pool,
    script: Script,
    command_timeout: Duration,
}

impl RedisStore {
    /// Create the connection pool and verify the server is reachable.
    ///
    /// The pool is the explicit store-client handle for the process: opened
    /// once at startup, handed to the limiter, dropped at shutdown.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        info!(url = %config.url, "Connecting to Redis counter store");

        let mut settings = PoolSettings::from_url(config.url.clone());
        let mut pool_config = PoolConfig::new(config.max_connections);
        pool_config.timeouts = Timeouts {
            wait: Some(Duration::from_secs(config.connect_timeout_secs)),
            create: Some(Duration::from_secs(config.connect_timeout_secs)),
            recycle: None,
        };
        settings.pool = Some(pool_config);

        let pool = settings.create_pool(Some(Runtime::Tokio1)).map_err(|e| {
            WindgateError::StoreUnavailable(format!("Failed to create connection pool: {}", e))
        })?;

        let store = Self {
            pool,
            script: Script::new(SLIDING_WINDOW_SCRIPT),
            command_timeout: Duration::from_secs(config.command_timeout_secs),
        };
        store.health_check().await?;

        info!(
            max_connections = config.max_connections,
            "Redis counter store ready"
        );
        Ok(store)
    }

    /// Parse the script response: `[count, oldest_timestamp]`.
    fn parse_snapshot(values: &[Value]) -> Result<WindowSnapshot> {
        if values.len() != 2 {
            return Err(WindgateError::StoreUnavailable(format!(
                "Invalid script response length: {}",
                values.len()
            )));
        }

        let count = match &values[0] {
            Value::Int(v) if *v >= 0 => *v as u64,
            other => {
                return Err(WindgateError::StoreUnavailable(format!(
                    "Invalid count value in script response: {:?}",
                    other
                )))
            }
        };

        let window_start = match &values[1] {
            Value::BulkString(bytes) => std::str::from_utf8(bytes)
                .map_err(|e| {
                    WindgateError::StoreUnavailable(format!(
                        "Invalid UTF-8 in window start: {}",
                        e
                    ))
                })?
                .parse::<f64>()
                .map_err(|e| {
                    WindgateError::StoreUnavailable(format!(
                        "Failed to parse window start: {}",
                        e
                    ))
                })?,
            other => {
                return Err(WindgateError::StoreUnavailable(format!(
                    "Invalid window start value in script response: {:?}",
                    other
                )))
            }
        };

        Ok(WindowSnapshot {
            count,
            window_start,
        })
    }
}

#[async_trait]
impl CounterStore for RedisStore {
    async fn record_and_count(
        &self,
        key: &str,
        now_seconds: f64,
        window_seconds: u64,
        record_limit: Option<u64>,
    ) -> Result<WindowSnapshot> {
        let mut conn = self.pool.get().await.map_err(|e| {
            error!("Failed to get Redis connection: {}", e);
            WindgateError::StoreUnavailable(format!("Connection pool: {}", e))
        })?;

        let floor = now_seconds - window_seconds as f64;
        let member = format!("{}-{}", now_seconds, Uuid::new_v4());

        debug!(
            key = key,
            now = now_seconds,
            window = window_seconds,
            "Executing sliding window script"
        );

        let mut invocation = self.script.key(key);
        invocation
            .arg(floor)
            .arg(now_seconds)
            .arg(member)
            .arg(window_seconds)
            .arg(record_limit.unwrap_or(0));

        let values: Vec<Value> =
            tokio::time::timeout(self.command_timeout, invocation.invoke_async(&mut *conn))
                .await
                .map_err(|_| {
                    error!("Sliding window script timed out for key '{}'", key);
                    WindgateError::StoreUnavailable("Command timed out".to_string())
                })?
                .map_err(|e| {
                    error!("Script execution failed: {}", e);
                    WindgateError::StoreUnavailable(format!("Script execution: {}", e))
                })?;

        Self::parse_snapshot(&values)
    }

    async fn health_check(&self) -> Result<()> {
        let mut conn = self.pool.get().await.map_err(|e| {
            WindgateError::StoreUnavailable(format!("Connection pool: {}", e))
        })?;

        let response: String = redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(|e| WindgateError::StoreUnavailable(format!("PING failed: {}", e)))?;

        if response != "PONG" {
            return Err(WindgateError::StoreUnavailable(format!(
                "Unexpected PING response: {}",
                response
            )));
        }

        Ok(())
    }
}
