//! Discovery Connector: executes register, deregister, heartbeat and client-report
//! calls over pooled connections with health feedback to the pool.

pub mod config;
pub mod error;
pub mod network;
pub mod service;
pub mod telemetry;
pub mod traits;

#[cfg(test)]
mod test_support;

pub use config::{ConfigError, ConnectorConfig};
pub use error::ConnectorError;
pub use network::{ConnectionLease, RunContext};
pub use service::{Connector, RequestContext};
pub use traits::{ConnectionManager, NamingClient, PoolError, PooledConnection, TransportError};
