//! Operation executors.
//!
//! Every operation runs the same pipeline on the calling task:
//!
//! 1. **Readiness**: wait for the pool (bounded), fail fast on shutdown
//! 2. **Lease**: acquire a connection scoped to the operation key
//! 3. **Correlate**: build the request context and encode the request
//! 4. **Transport**: invoke the remote call under the request deadline
//! 5. **Classify**: map the result code, emit one health signal, release
//!
//! Nothing is retried here; retry policy belongs to the caller.

use std::sync::Arc;
use std::time::Duration;

use discovery_core::messages::ServerReply;
use discovery_core::{
    ErrorCode, Headers, InstanceDeregisterRequest, InstanceHeartbeatRequest,
    InstanceRegisterRequest, InstanceRegisterResponse, ReportClientRequest, ReportClientResponse,
    ValidationError,
};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, error, info, warn, Level};

use super::classify::{Outcome, ResponseClassifier};
use super::correlator::RequestCorrelator;
use super::operation::{DeregisterCall, HeartbeatCall, RegisterCall, RemoteCall, ReportClientCall};
use super::readiness::ReadinessGate;
use crate::config::{ConfigError, ConnectorConfig};
use crate::error::ConnectorError;
use crate::network::{ConnectionLease, RunContext};
use crate::traits::{ConnectionManager, TransportError};

/// Reply that passed classification.
#[derive(Debug)]
pub(crate) struct Settled<R> {
    reply: R,
    outcome: Outcome,
}

/// Executes register, deregister, heartbeat and report-client calls.
pub struct Connector {
    config: ConnectorConfig,
    pool: Arc<dyn ConnectionManager>,
    run: RunContext,
    gate: ReadinessGate,
    correlator: RequestCorrelator,
}

impl Connector {
    /// Creates a connector over `pool`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `config` fails validation.
    pub fn new(
        config: ConnectorConfig,
        pool: Arc<dyn ConnectionManager>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let run = RunContext::new(&config.sdk_context_id);
        let gate = ReadinessGate::new(
            Arc::clone(&pool),
            run.clone(),
            config.ready_window(),
            config.ready_poll_step(),
        );
        Ok(Self {
            config,
            pool,
            run,
            gate,
            correlator: RequestCorrelator::new(),
        })
    }

    #[must_use]
    pub fn run_context(&self) -> &RunContext {
        &self.run
    }

    /// Signals shutdown and waits up to `drain_timeout` for in-flight operations.
    ///
    /// Returns `true` if every in-flight operation finished in time.
    pub async fn destroy(&self, drain_timeout: Duration) -> bool {
        self.run.destroy();
        let drained = self.run.wait_for_drain(drain_timeout).await;
        info!(
            sdk_context = self.run.context_id(),
            drained,
            in_flight = self.run.in_flight_count(),
            "connector destroyed"
        );
        drained
    }

    /// Registers an instance.
    ///
    /// An instance that is already registered is reported with `existed = true`.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError` per the connector error taxonomy.
    pub async fn register_instance(
        &self,
        req: &InstanceRegisterRequest,
        headers: Option<&Headers>,
    ) -> Result<InstanceRegisterResponse, ConnectorError> {
        let summary = req.to_string();
        let settled = self
            .execute(RegisterCall, req.timeout, headers, &summary, |_| req.to_wire())
            .await?;
        Ok(InstanceRegisterResponse {
            instance_id: settled.reply.instance_id().to_string(),
            existed: settled.outcome == Outcome::IdempotentSuccess,
        })
    }

    /// Deregisters an instance. Deregistering an unknown instance succeeds.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError` per the connector error taxonomy.
    pub async fn deregister_instance(
        &self,
        req: &InstanceDeregisterRequest,
    ) -> Result<(), ConnectorError> {
        let summary = req.to_string();
        self.execute(DeregisterCall, req.timeout, None, &summary, |_| req.to_wire())
            .await?;
        Ok(())
    }

    /// Reports a heartbeat. Any code other than execute-success is an error.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError`; server-answered failures carry the original
    /// server code and message.
    pub async fn heartbeat(&self, req: &InstanceHeartbeatRequest) -> Result<(), ConnectorError> {
        let summary = req.to_string();
        let result = self
            .execute(HeartbeatCall, req.timeout, None, &summary, |_| req.to_wire())
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                if err.server_code().is_some() {
                    error!(sdk_context = self.run.context_id(), error = %err, "heartbeat rejected");
                }
                Err(err)
            }
        }
    }

    /// Reports the local client. An empty host defaults to the pool's local address.
    ///
    /// The persistence callback runs once on success; its failure is logged
    /// and does not fail the report.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError` per the connector error taxonomy.
    pub async fn report_client(
        &self,
        req: &ReportClientRequest,
    ) -> Result<ReportClientResponse, ConnectorError> {
        let summary = req.to_string();
        let settled = self
            .execute(ReportClientCall, req.timeout, None, &summary, |pool| {
                let host = if req.host.is_empty() {
                    pool.client_info().ip_string()
                } else {
                    req.host.clone()
                };
                req.to_wire(&host)
            })
            .await?;

        if let Some(persist) = &req.persist_handler {
            if let Err(err) = persist(&settled.reply) {
                error!(
                    sdk_context = self.run.context_id(),
                    error = %err,
                    "fail to persist client report response"
                );
            }
        }
        Ok(ReportClientResponse::from_reply(&settled.reply))
    }

    /// Runs one remote call through the pipeline.
    ///
    /// The lease is released when this function returns or unwinds, whichever
    /// path it takes. A health signal is emitted only once the call has
    /// reached the transport.
    async fn execute<C, F>(
        &self,
        call: C,
        timeout: Option<Duration>,
        headers: Option<&Headers>,
        summary: &str,
        encode: F,
    ) -> Result<Settled<C::Reply>, ConnectorError>
    where
        C: RemoteCall,
        F: FnOnce(&dyn ConnectionManager) -> Result<C::Request, ValidationError>,
    {
        let _in_flight = self.run.in_flight_guard();
        self.gate.wait_ready().await?;

        let op_key = C::OP_KEY;
        let start = Instant::now();
        let lease = ConnectionLease::acquire(self.pool.as_ref(), op_key, op_key.cluster()).await?;

        let timeout = timeout.unwrap_or_else(|| self.config.default_timeout());
        let ctx = self.correlator.build_context(op_key, timeout, headers);
        let request = encode(self.pool.as_ref())
            .map_err(|source| ConnectorError::InvalidArgument { op_key, source })?;
        self.log_wire("request to send", &request, &ctx.request_id, &lease);

        let sent = tokio::time::timeout(ctx.timeout, call.send(lease.client(), &ctx, request)).await;
        let elapsed = start.elapsed();
        let reply = match sent {
            Ok(Ok(reply)) => reply,
            Ok(Err(source)) => {
                return Err(self.rpc_failure(&lease, &ctx.request_id, summary, elapsed, source));
            }
            Err(_elapsed) => {
                let source = TransportError::DeadlineExceeded {
                    timeout_ms: u64::try_from(ctx.timeout.as_millis()).unwrap_or(u64::MAX),
                };
                return Err(self.rpc_failure(&lease, &ctx.request_id, summary, elapsed, source));
            }
        };
        self.log_wire("response recv", &reply, &ctx.request_id, &lease);

        let outcome = ResponseClassifier::for_op(op_key).settle(
            self.pool.as_ref(),
            lease.conn_id(),
            reply.code(),
            reply.info(),
            elapsed,
            summary,
        )?;
        Ok(Settled { reply, outcome })
    }

    /// Reports a failed transport call against the leased connection.
    fn rpc_failure(
        &self,
        lease: &ConnectionLease,
        request_id: &str,
        summary: &str,
        elapsed: Duration,
        source: TransportError,
    ) -> ConnectorError {
        self.pool
            .report_fail(lease.conn_id(), ErrorCode::RpcError, elapsed);
        warn!(
            sdk_context = self.run.context_id(),
            op_key = %lease.op_key(),
            conn_id = %lease.conn_id(),
            request_id,
            error = %source,
            "fail to send request"
        );
        ConnectorError::Rpc {
            op_key: lease.op_key(),
            request: summary.to_string(),
            request_id: request_id.to_string(),
            conn_id: lease.conn_id().clone(),
            source,
        }
    }

    fn log_wire<T: Serialize>(&self, what: &str, message: &T, request_id: &str, lease: &ConnectionLease) {
        if !self.config.log_wire_messages || !tracing::enabled!(Level::DEBUG) {
            return;
        }
        let json = serde_json::to_string(message).unwrap_or_default();
        debug!(
            op_key = %lease.op_key(),
            conn_id = %lease.conn_id(),
            request_id,
            message = %json,
            "{what}"
        );
    }
}
