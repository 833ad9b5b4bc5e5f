//! Scoped leasing of pooled connections.
//!
//! A `ConnectionLease` is the only way the executors hold a connection.
//! Release happens in `Drop`, so it runs exactly once on every exit path:
//! normal return, early `?` return, a dropped future, or a panic unwinding
//! through the executor.

use std::fmt;
use std::sync::Arc;

use discovery_core::{ClusterType, ConnectionId, OpKey};
use tracing::debug;

use crate::error::ConnectorError;
use crate::traits::{ConnectionManager, NamingClient, PooledConnection};

/// Exclusive use of one pooled connection for the duration of a call.
pub struct ConnectionLease {
    conn: Arc<dyn PooledConnection>,
    op_key: OpKey,
}

impl ConnectionLease {
    /// Acquires a connection for `op_key` from `cluster`.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::Network` if the pool cannot provide a
    /// connection. No health signal is emitted in that case because there is
    /// no connection to attribute it to.
    pub async fn acquire(
        pool: &dyn ConnectionManager,
        op_key: OpKey,
        cluster: ClusterType,
    ) -> Result<Self, ConnectorError> {
        let conn = pool
            .get_connection(op_key, cluster)
            .await
            .map_err(|source| ConnectorError::Network { op_key, source })?;
        debug!(op_key = %op_key, conn_id = %conn.id(), "connection leased");
        Ok(Self { conn, op_key })
    }

    #[must_use]
    pub fn conn_id(&self) -> &ConnectionId {
        self.conn.id()
    }

    #[must_use]
    pub fn op_key(&self) -> OpKey {
        self.op_key
    }

    /// Naming-service client of the leased connection.
    #[must_use]
    pub fn client(&self) -> &dyn NamingClient {
        self.conn.client()
    }
}

impl Drop for ConnectionLease {
    fn drop(&mut self) {
        self.conn.release(self.op_key);
    }
}

impl fmt::Debug for ConnectionLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionLease")
            .field("conn_id", self.conn.id())
            .field("op_key", &self.op_key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockPool;

    #[tokio::test]
    async fn drop_releases_exactly_once() {
        let pool = MockPool::ready();
        let lease = ConnectionLease::acquire(&pool, OpKey::RegisterInstance, ClusterType::Discover)
            .await
            .unwrap();
        assert_eq!(lease.conn_id(), &ConnectionId::new("conn-1"));
        assert_eq!(pool.acquired(), 1);
        assert_eq!(pool.released(), 0);

        drop(lease);
        assert_eq!(pool.released(), 1);
        assert_eq!(pool.released_op_keys(), vec![OpKey::RegisterInstance]);
    }

    #[tokio::test]
    async fn acquire_failure_is_network_error_without_health_signal() {
        let pool = MockPool::ready();
        pool.fail_acquire();

        let err = ConnectionLease::acquire(&pool, OpKey::ReportClient, ClusterType::Discover)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ConnectorError::Network {
                op_key: OpKey::ReportClient,
                ..
            }
        ));
        assert_eq!(pool.released(), 0);
        assert!(pool.signals().is_empty());
    }

    #[tokio::test]
    async fn release_runs_during_unwind() {
        let pool = Arc::new(MockPool::ready());
        let lease = ConnectionLease::acquire(pool.as_ref(), OpKey::InstanceHeartbeat, ClusterType::HealthCheck)
            .await
            .unwrap();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _lease = lease;
            panic!("encoding blew up");
        }));
        assert!(result.is_err());
        assert_eq!(pool.released(), 1);
    }

    #[tokio::test]
    async fn cluster_is_forwarded_to_pool() {
        let pool = MockPool::ready();
        let _lease = ConnectionLease::acquire(&pool, OpKey::InstanceHeartbeat, ClusterType::HealthCheck)
            .await
            .unwrap();
        assert_eq!(
            pool.acquire_requests(),
            vec![(OpKey::InstanceHeartbeat, ClusterType::HealthCheck)]
        );
    }
}
