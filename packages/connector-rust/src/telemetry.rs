//! Log subscriber setup for applications embedding the connector.
//!
//! The connector itself only emits `tracing` events; installing a subscriber
//! is left to the host process. This helper covers the common case.

use tracing_subscriber::EnvFilter;

/// Installing the global subscriber failed.
#[derive(Debug, thiserror::Error)]
#[error("failed to install tracing subscriber: {0}")]
pub struct TelemetryError(String);

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive` (for example `"discovery_connector=info"`).
///
/// # Errors
///
/// Returns `TelemetryError` if a global subscriber is already installed.
pub fn init_tracing(default_directive: &str) -> Result<(), TelemetryError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| TelemetryError(e.to_string()))
}
