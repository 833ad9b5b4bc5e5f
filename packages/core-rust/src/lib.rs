//! Discovery Core: operation keys, server result codes, request/response models and wire schemas.

pub mod codes;
pub mod messages;
pub mod model;
pub mod types;

pub use codes::{result_code, ErrorCode};
pub use messages::{ClientReply, InstanceReply, ServerReply};
pub use model::{
    InstanceDeregisterRequest, InstanceHeartbeatRequest, InstanceIdentity,
    InstanceRegisterRequest, InstanceRegisterResponse, PersistHandler, ReportClientRequest,
    ReportClientResponse, ValidationError,
};
pub use types::{ClientInfo, ClusterType, ConnectionId, Headers, Location, OpKey, RunMode};
