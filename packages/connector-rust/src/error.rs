//! Error taxonomy for connector operations.
//!
//! Each variant tells the caller who is at fault and whether a retry can
//! help. Variants raised after a connection was acquired name that
//! connection so failures can be diagnosed without inspecting the pool.

use discovery_core::{ConnectionId, ErrorCode, OpKey, ValidationError};

use crate::traits::{PoolError, TransportError};

/// Errors returned by connector operations.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// The SDK is shutting down. Not retryable.
    #[error("invalid state: {message}")]
    InvalidState { message: String },

    /// The request failed validation while being encoded.
    #[error("invalid argument for {op_key}: {source}")]
    InvalidArgument {
        op_key: OpKey,
        #[source]
        source: ValidationError,
    },

    /// No connection could be acquired.
    #[error("fail to get connection, opKey {op_key}: {source}")]
    Network {
        op_key: OpKey,
        #[source]
        source: PoolError,
    },

    /// A connection was acquired but the transport call failed.
    #[error("fail to send {op_key} request {request}, reqID {request_id}, connID {conn_id}: {source}")]
    Rpc {
        op_key: OpKey,
        request: String,
        request_id: String,
        conn_id: ConnectionId,
        #[source]
        source: TransportError,
    },

    /// The server reported an internal fault.
    #[error("fail to {op_key}, request {request}, server code {server_code}, reason {server_info}, connID {conn_id}")]
    ServerException {
        op_key: OpKey,
        request: String,
        server_code: u32,
        server_info: String,
        conn_id: ConnectionId,
    },

    /// The server rejected the request.
    #[error("fail to {op_key}, request {request}, server code {server_code}, reason {server_info}, connID {conn_id}")]
    ServerUserError {
        op_key: OpKey,
        request: String,
        server_code: u32,
        server_info: String,
        conn_id: ConnectionId,
    },
}

impl ConnectorError {
    /// SDK error code for this error. Acquisition and transport failures are
    /// both network-class.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            ConnectorError::InvalidState { .. } => ErrorCode::InvalidState,
            ConnectorError::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            ConnectorError::Network { .. } | ConnectorError::Rpc { .. } => ErrorCode::NetworkError,
            ConnectorError::ServerException { .. } => ErrorCode::ServerException,
            ConnectorError::ServerUserError { .. } => ErrorCode::ServerUserError,
        }
    }

    /// Whether retrying the same request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ConnectorError::Network { .. }
                | ConnectorError::Rpc { .. }
                | ConnectorError::ServerException { .. }
        )
    }

    /// Whether the transport call hit its deadline.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ConnectorError::Rpc {
                source: TransportError::DeadlineExceeded { .. },
                ..
            }
        )
    }

    /// Result code returned by the server, if the server answered.
    #[must_use]
    pub fn server_code(&self) -> Option<u32> {
        match self {
            ConnectorError::ServerException { server_code, .. }
            | ConnectorError::ServerUserError { server_code, .. } => Some(*server_code),
            _ => None,
        }
    }

    /// Message returned by the server, if the server answered.
    #[must_use]
    pub fn server_info(&self) -> Option<&str> {
        match self {
            ConnectorError::ServerException { server_info, .. }
            | ConnectorError::ServerUserError { server_info, .. } => Some(server_info),
            _ => None,
        }
    }

    /// Connection the failed call ran on, if one was acquired.
    #[must_use]
    pub fn conn_id(&self) -> Option<&ConnectionId> {
        match self {
            ConnectorError::Rpc { conn_id, .. }
            | ConnectorError::ServerException { conn_id, .. }
            | ConnectorError::ServerUserError { conn_id, .. } => Some(conn_id),
            _ => None,
        }
    }
}
