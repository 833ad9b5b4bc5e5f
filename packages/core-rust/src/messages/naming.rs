//! Wire messages exchanged with the naming service.
//!
//! Field names serialize as `camelCase` to match the server's JSON schema.
//! Optional fields are omitted when unset so the server applies its own
//! defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Location, RunMode};

/// Common accessors for a server reply envelope.
pub trait ServerReply {
    /// Six-digit server result code.
    fn code(&self) -> u32;

    /// Human-readable message accompanying the code.
    fn info(&self) -> &str;
}

/// Heartbeat-based health check settings for an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    /// Seconds the server waits for a heartbeat before marking the instance unhealthy.
    pub ttl: u32,
}

/// Instance as carried on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub namespace: String,
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_token: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isolate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_health_check: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check: Option<HealthCheck>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// Reply to register, deregister and heartbeat calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceReply {
    pub code: u32,
    #[serde(default)]
    pub info: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<Instance>,
}

impl InstanceReply {
    /// Server-assigned instance id, empty if the reply carries none.
    #[must_use]
    pub fn instance_id(&self) -> &str {
        self.instance
            .as_ref()
            .and_then(|i| i.id.as_deref())
            .unwrap_or_default()
    }
}

impl ServerReply for InstanceReply {
    fn code(&self) -> u32 {
        self.code
    }

    fn info(&self) -> &str {
        &self.info
    }
}

/// Client type reported to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientType {
    #[default]
    Sdk,
    Agent,
}

impl ClientType {
    /// Run mode implied by the client type.
    #[must_use]
    pub fn run_mode(self) -> RunMode {
        match self {
            ClientType::Sdk => RunMode::NoAgent,
            ClientType::Agent => RunMode::WithAgent,
        }
    }
}

/// Client record as carried on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub host: String,
    #[serde(rename = "type")]
    pub client_type: ClientType,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// Reply to a report-client call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientReply {
    pub code: u32,
    #[serde(default)]
    pub info: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<Client>,
}

impl ServerReply for ClientReply {
    fn code(&self) -> u32 {
        self.code
    }

    fn info(&self) -> &str {
        &self.info
    }
}
