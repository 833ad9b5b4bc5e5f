use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use discovery_core::messages::{Client, ClientReply, Instance, InstanceReply};
use discovery_core::{ClientInfo, ClusterType, ConnectionId, ErrorCode, OpKey};

use crate::service::correlator::RequestContext;

/// Failure to obtain a connection from the pool.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("no available connection in {cluster} cluster")]
    Exhausted { cluster: ClusterType },
    #[error("failed to dial {address}: {reason}")]
    Dial { address: String, reason: String },
    #[error("connection pool closed")]
    Closed,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure of a transport call on an acquired connection.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("deadline exceeded after {timeout_ms}ms")]
    DeadlineExceeded { timeout_ms: u64 },
    #[error("transport unavailable: {0}")]
    Unavailable(String),
    #[error("transport status {code}: {message}")]
    Status { code: i32, message: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Pool of backend connections, shared by all operations.
///
/// Implementations own connection selection, health scoring and readiness.
/// Every method may be called concurrently from many tasks; the connector
/// takes no lock around any of them.
#[async_trait]
pub trait ConnectionManager: Send + Sync {
    /// Acquire a connection for `op_key` from the given cluster.
    ///
    /// `op_key` is a routing hint: different operations may be balanced
    /// across different connection subsets of the same cluster.
    async fn get_connection(
        &self,
        op_key: OpKey,
        cluster: ClusterType,
    ) -> Result<Arc<dyn PooledConnection>, PoolError>;

    /// The call on `conn_id` completed and the connection is healthy.
    fn report_success(&self, conn_id: &ConnectionId, code: ErrorCode, elapsed: Duration);

    /// The call on `conn_id` failed in a way attributable to the connection or server.
    fn report_fail(&self, conn_id: &ConnectionId, code: ErrorCode, elapsed: Duration);

    /// Whether the discovery channel has usable connections.
    fn is_ready(&self) -> bool;

    /// What the pool has observed about the local client.
    fn client_info(&self) -> ClientInfo;
}

/// A connection handed out by the pool.
pub trait PooledConnection: Send + Sync {
    /// Identifier stable across acquire and release.
    fn id(&self) -> &ConnectionId;

    /// Naming-service client bound to this connection.
    fn client(&self) -> &dyn NamingClient;

    /// Return the connection to the pool.
    fn release(&self, op_key: OpKey);
}

/// Remote naming-service calls carried by a connection.
///
/// Encoding and decoding of the wire schema belong to the implementation.
#[async_trait]
pub trait NamingClient: Send + Sync {
    async fn register_instance(
        &self,
        ctx: &RequestContext,
        request: Instance,
    ) -> Result<InstanceReply, TransportError>;

    async fn deregister_instance(
        &self,
        ctx: &RequestContext,
        request: Instance,
    ) -> Result<InstanceReply, TransportError>;

    async fn heartbeat(
        &self,
        ctx: &RequestContext,
        request: Instance,
    ) -> Result<InstanceReply, TransportError>;

    async fn report_client(
        &self,
        ctx: &RequestContext,
        request: Client,
    ) -> Result<ClientReply, TransportError>;
}
