//! Caller-facing request and response types.
//!
//! Requests validate themselves while being converted into wire messages;
//! `Display` renders the one-line summary used in error messages.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::messages::{Client, ClientReply, ClientType, HealthCheck, Instance};
use crate::types::{Location, RunMode};

/// Upper bound for an instance weight.
pub const MAX_WEIGHT: u32 = 10_000;

/// A request failed validation while being encoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("port must be greater than 0")]
    InvalidPort,
    #[error("weight {weight} exceeds maximum {max}")]
    WeightOutOfRange { weight: u32, max: u32 },
    #[error("ttl must be greater than 0")]
    InvalidTtl,
    #[error("instance must be identified by instance_id or host and port")]
    MissingInstanceIdentity,
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

// ---------------------------------------------------------------------------
// Register
// ---------------------------------------------------------------------------

/// Registers a service instance.
#[derive(Debug, Clone, Default)]
pub struct InstanceRegisterRequest {
    pub namespace: String,
    pub service: String,
    pub service_token: Option<String>,
    pub host: String,
    pub port: u32,
    pub protocol: Option<String>,
    pub version: Option<String>,
    pub weight: Option<u32>,
    pub priority: Option<u32>,
    pub metadata: BTreeMap<String, String>,
    pub healthy: Option<bool>,
    pub isolate: Option<bool>,
    /// Heartbeat TTL in seconds. Enables server-side health checking when set.
    pub ttl: Option<u32>,
    pub location: Option<Location>,
    /// Per-call timeout. The connector default applies when `None`.
    pub timeout: Option<Duration>,
}

impl InstanceRegisterRequest {
    /// Validates the request and converts it into its wire form.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if identity fields are missing, the port is
    /// zero, the weight exceeds [`MAX_WEIGHT`] or the TTL is zero.
    pub fn to_wire(&self) -> Result<Instance, ValidationError> {
        require(&self.namespace, "namespace")?;
        require(&self.service, "service")?;
        require(&self.host, "host")?;
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if let Some(weight) = self.weight {
            if weight > MAX_WEIGHT {
                return Err(ValidationError::WeightOutOfRange {
                    weight,
                    max: MAX_WEIGHT,
                });
            }
        }
        if self.ttl == Some(0) {
            return Err(ValidationError::InvalidTtl);
        }

        Ok(Instance {
            id: None,
            namespace: self.namespace.clone(),
            service: self.service.clone(),
            service_token: non_empty(self.service_token.as_deref()),
            host: self.host.clone(),
            port: Some(self.port),
            protocol: non_empty(self.protocol.as_deref()),
            version: non_empty(self.version.as_deref()),
            weight: self.weight,
            priority: self.priority,
            healthy: self.healthy,
            isolate: self.isolate,
            enable_health_check: self.ttl.map(|_| true),
            health_check: self.ttl.map(|ttl| HealthCheck { ttl }),
            metadata: self.metadata.clone(),
            location: self.location.clone().filter(|l| !l.is_empty()),
        })
    }
}

impl fmt::Display for InstanceRegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{namespace={}, service={}, host={}, port={}}}",
            self.namespace, self.service, self.host, self.port
        )
    }
}

/// Result of a successful registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceRegisterResponse {
    pub instance_id: String,
    /// `true` when the instance was already registered.
    pub existed: bool,
}

// ---------------------------------------------------------------------------
// Deregister / Heartbeat
// ---------------------------------------------------------------------------

/// Identifies an already-registered instance.
///
/// Shared by deregister and heartbeat: the instance is addressed either by
/// its server-assigned id or by host and port.
#[derive(Debug, Clone, Default)]
pub struct InstanceIdentity {
    pub namespace: String,
    pub service: String,
    pub service_token: Option<String>,
    pub instance_id: Option<String>,
    pub host: String,
    pub port: u32,
    pub timeout: Option<Duration>,
}

impl InstanceIdentity {
    /// Validates the identity and converts it into its wire form.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if namespace or service is empty, or if
    /// neither an instance id nor a host and port are given.
    pub fn to_wire(&self) -> Result<Instance, ValidationError> {
        require(&self.namespace, "namespace")?;
        require(&self.service, "service")?;
        let id = non_empty(self.instance_id.as_deref());
        if id.is_none() && (self.host.is_empty() || self.port == 0) {
            return Err(ValidationError::MissingInstanceIdentity);
        }

        Ok(Instance {
            id,
            namespace: self.namespace.clone(),
            service: self.service.clone(),
            service_token: non_empty(self.service_token.as_deref()),
            host: self.host.clone(),
            port: (self.port > 0).then_some(self.port),
            ..Instance::default()
        })
    }
}

impl fmt::Display for InstanceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{namespace={}, service={}, id={}, host={}, port={}}}",
            self.namespace,
            self.service,
            self.instance_id.as_deref().unwrap_or_default(),
            self.host,
            self.port
        )
    }
}

/// Deregisters an instance.
pub type InstanceDeregisterRequest = InstanceIdentity;

/// Reports a heartbeat for an instance.
pub type InstanceHeartbeatRequest = InstanceIdentity;

// ---------------------------------------------------------------------------
// ReportClient
// ---------------------------------------------------------------------------

/// Callback that persists a successful report-client reply.
///
/// Failures are logged by the connector and never fail the report.
pub type PersistHandler = Arc<dyn Fn(&ClientReply) -> anyhow::Result<()> + Send + Sync>;

/// Reports the local client to the server.
#[derive(Clone, Default)]
pub struct ReportClientRequest {
    /// Client address. Defaults to the connection's local address when empty.
    pub host: String,
    pub version: String,
    pub client_type: ClientType,
    pub timeout: Option<Duration>,
    pub persist_handler: Option<PersistHandler>,
}

impl ReportClientRequest {
    /// Converts the request into its wire form using `host` as the client address.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Empty` if `host` is empty.
    pub fn to_wire(&self, host: &str) -> Result<Client, ValidationError> {
        require(host, "host")?;
        Ok(Client {
            host: host.to_string(),
            client_type: self.client_type,
            version: self.version.clone(),
            location: None,
        })
    }
}

impl fmt::Debug for ReportClientRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportClientRequest")
            .field("host", &self.host)
            .field("version", &self.version)
            .field("client_type", &self.client_type)
            .field("timeout", &self.timeout)
            .field("persist_handler", &self.persist_handler.is_some())
            .finish()
    }
}

impl fmt::Display for ReportClientRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{host={}, version={}}}", self.host, self.version)
    }
}

/// What the server knows about the reporting client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportClientResponse {
    pub mode: RunMode,
    pub version: String,
    pub region: String,
    pub zone: String,
    pub campus: String,
}

impl ReportClientResponse {
    /// Builds the response from a server reply. Missing fields stay empty.
    #[must_use]
    pub fn from_reply(reply: &ClientReply) -> Self {
        let Some(client) = reply.client.as_ref() else {
            return Self::default();
        };
        let location = client.location.clone().unwrap_or_default();
        Self {
            mode: client.client_type.run_mode(),
            version: client.version.clone(),
            region: location.region,
            zone: location.zone,
            campus: location.campus,
        }
    }
}
