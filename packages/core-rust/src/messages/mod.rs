//! Wire message schemas for the discovery backend.

pub mod naming;

pub use naming::{
    Client, ClientReply, ClientType, HealthCheck, Instance, InstanceReply, ServerReply,
};
