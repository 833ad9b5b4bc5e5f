use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Extra headers propagated with a request, keyed by header name.
///
/// Uses `BTreeMap` so the outgoing header order is deterministic.
pub type Headers = BTreeMap<String, String>;

/// Category of a synchronous remote operation.
///
/// Selects the target cluster, scopes connection leasing in the pool and
/// owns an independent request-id sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpKey {
    RegisterInstance,
    DeregisterInstance,
    InstanceHeartbeat,
    ReportClient,
}

impl OpKey {
    /// Number of operation categories.
    pub const COUNT: usize = 4;

    /// All operation categories, in `index()` order.
    pub const ALL: [OpKey; Self::COUNT] = [
        OpKey::RegisterInstance,
        OpKey::DeregisterInstance,
        OpKey::InstanceHeartbeat,
        OpKey::ReportClient,
    ];

    /// Dense index, used for per-operation counters.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            OpKey::RegisterInstance => 0,
            OpKey::DeregisterInstance => 1,
            OpKey::InstanceHeartbeat => 2,
            OpKey::ReportClient => 3,
        }
    }

    /// Cluster whose connection pool serves this operation.
    ///
    /// Heartbeats go to the health-check cluster; everything else goes to
    /// the discovery cluster.
    #[must_use]
    pub fn cluster(self) -> ClusterType {
        match self {
            OpKey::InstanceHeartbeat => ClusterType::HealthCheck,
            _ => ClusterType::Discover,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OpKey::RegisterInstance => "RegisterInstance",
            OpKey::DeregisterInstance => "DeregisterInstance",
            OpKey::InstanceHeartbeat => "InstanceHeartbeat",
            OpKey::ReportClient => "ReportClient",
        }
    }
}

impl fmt::Display for OpKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend cluster a connection is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClusterType {
    /// The discovery (naming) cluster.
    Discover,
    /// The health-check cluster that receives heartbeats.
    HealthCheck,
}

impl fmt::Display for ClusterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterType::Discover => f.write_str("discover"),
            ClusterType::HealthCheck => f.write_str("healthcheck"),
        }
    }
}

/// Stable identifier of a pooled connection, used to attribute health signals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub String);

impl ConnectionId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Information the pool has observed about the local client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    /// Local address of the transport connection, if one has been established.
    pub local_address: Option<IpAddr>,
}

impl ClientInfo {
    /// Local address rendered as a string, empty when unknown.
    #[must_use]
    pub fn ip_string(&self) -> String {
        self.local_address
            .map(|ip| ip.to_string())
            .unwrap_or_default()
    }
}

/// Deployment mode the server reports back for a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunMode {
    /// The SDK talks to the backend directly, without a local agent.
    #[default]
    NoAgent,
    /// Calls are proxied through a local agent.
    WithAgent,
}

/// Geographic location of an instance or client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub region: String,
    pub zone: String,
    pub campus: String,
}

impl Location {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.region.is_empty() && self.zone.is_empty() && self.campus.is_empty()
    }
}
