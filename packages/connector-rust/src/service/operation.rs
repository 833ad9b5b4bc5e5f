//! Typed remote calls driven by the operation pipeline.
//!
//! Each call binds an operation key to its wire request/reply types and to
//! the `NamingClient` method that carries it. Adding an operation means one
//! `RemoteCall` impl plus a row in the idempotent-code table.

use async_trait::async_trait;
use discovery_core::messages::{Client, ClientReply, Instance, InstanceReply, ServerReply};
use discovery_core::OpKey;
use serde::Serialize;

use super::correlator::RequestContext;
use crate::traits::{NamingClient, TransportError};

/// One remote operation as seen by the pipeline.
#[async_trait]
pub trait RemoteCall: Send + Sync {
    /// Wire request sent to the server.
    type Request: Serialize + Send + 'static;
    /// Wire reply returned by the server.
    type Reply: ServerReply + Serialize + Send + 'static;

    /// Operation category; selects cluster, lease scope and id sequence.
    const OP_KEY: OpKey;

    /// Sends `request` over `client`.
    async fn send(
        &self,
        client: &dyn NamingClient,
        ctx: &RequestContext,
        request: Self::Request,
    ) -> Result<Self::Reply, TransportError>;
}

#[derive(Debug, Clone, Copy)]
pub struct RegisterCall;

#[async_trait]
impl RemoteCall for RegisterCall {
    type Request = Instance;
    type Reply = InstanceReply;
    const OP_KEY: OpKey = OpKey::RegisterInstance;

    async fn send(
        &self,
        client: &dyn NamingClient,
        ctx: &RequestContext,
        request: Instance,
    ) -> Result<InstanceReply, TransportError> {
        client.register_instance(ctx, request).await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeregisterCall;

#[async_trait]
impl RemoteCall for DeregisterCall {
    type Request = Instance;
    type Reply = InstanceReply;
    const OP_KEY: OpKey = OpKey::DeregisterInstance;

    async fn send(
        &self,
        client: &dyn NamingClient,
        ctx: &RequestContext,
        request: Instance,
    ) -> Result<InstanceReply, TransportError> {
        client.deregister_instance(ctx, request).await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HeartbeatCall;

#[async_trait]
impl RemoteCall for HeartbeatCall {
    type Request = Instance;
    type Reply = InstanceReply;
    const OP_KEY: OpKey = OpKey::InstanceHeartbeat;

    async fn send(
        &self,
        client: &dyn NamingClient,
        ctx: &RequestContext,
        request: Instance,
    ) -> Result<InstanceReply, TransportError> {
        client.heartbeat(ctx, request).await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReportClientCall;

#[async_trait]
impl RemoteCall for ReportClientCall {
    type Request = Client;
    type Reply = ClientReply;
    const OP_KEY: OpKey = OpKey::ReportClient;

    async fn send(
        &self,
        client: &dyn NamingClient,
        ctx: &RequestContext,
        request: Client,
    ) -> Result<ClientReply, TransportError> {
        client.report_client(ctx, request).await
    }
}
