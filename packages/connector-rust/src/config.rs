//! Connector configuration.

use std::time::Duration;

use serde::Deserialize;

/// Error returned when a configuration value is out of range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Tunables for the operation execution core.
///
/// Loading is left to the embedder; every field has a default so partial
/// documents deserialize cleanly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    /// Identifier prefixed to connector log lines. A UUID is generated when empty.
    pub sdk_context_id: String,
    /// Refresh cadence of the connection pool in milliseconds. The readiness
    /// gate waits at most half of it.
    pub receive_conn_interval_ms: u64,
    /// Sleep between readiness polls in milliseconds.
    pub ready_poll_step_ms: u64,
    /// Timeout for requests that do not carry their own, in milliseconds.
    pub default_timeout_ms: u64,
    /// Dump wire requests and replies as JSON at DEBUG level.
    pub log_wire_messages: bool,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            sdk_context_id: String::new(),
            receive_conn_interval_ms: 1000,
            ready_poll_step_ms: 10,
            default_timeout_ms: 1000,
            log_wire_messages: true,
        }
    }
}

impl ConnectorConfig {
    /// Checks that every interval and timeout is non-zero.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.receive_conn_interval_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "receive_conn_interval_ms cannot be 0".into(),
            ));
        }
        if self.ready_poll_step_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "ready_poll_step_ms cannot be 0".into(),
            ));
        }
        if self.default_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "default_timeout_ms cannot be 0".into(),
            ));
        }
        Ok(())
    }

    /// Upper bound on how long an operation waits for the pool to become ready.
    #[must_use]
    pub fn ready_window(&self) -> Duration {
        Duration::from_millis(self.receive_conn_interval_ms / 2)
    }

    #[must_use]
    pub fn ready_poll_step(&self) -> Duration {
        Duration::from_millis(self.ready_poll_step_ms)
    }

    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }
}
