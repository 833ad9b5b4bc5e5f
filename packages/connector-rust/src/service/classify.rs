//! Response classification and health feedback.
//!
//! Turns a server result code into an [`Outcome`], then reports exactly one
//! health signal for the connection the call ran on. Only a server-internal
//! fault penalizes the connection; a business rejection means the
//! connection itself worked.

use std::time::Duration;

use discovery_core::result_code::{
    CMDB_NOT_FIND_HOST, EXECUTE_SUCCESS, EXISTED_RESOURCE, NOT_FOUND_RESOURCE,
};
use discovery_core::{ConnectionId, ErrorCode, OpKey};

use crate::error::ConnectorError;
use crate::traits::ConnectionManager;

/// Classified result of a server reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The goal state already held on the server.
    IdempotentSuccess,
    /// The server rejected the request; the connection is healthy.
    UserError,
    /// The server reported an internal fault.
    ServerError,
}

impl Outcome {
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Success | Outcome::IdempotentSuccess)
    }
}

/// Result code each operation accepts as an idempotent success.
const IDEMPOTENT_SUCCESS_CODES: [(OpKey, Option<u32>); OpKey::COUNT] = [
    (OpKey::RegisterInstance, Some(EXISTED_RESOURCE)),
    (OpKey::DeregisterInstance, Some(NOT_FOUND_RESOURCE)),
    (OpKey::InstanceHeartbeat, None),
    (OpKey::ReportClient, Some(CMDB_NOT_FIND_HOST)),
];

/// Idempotent-success code of `op_key`, if it has one.
#[must_use]
pub fn idempotent_success_code(op_key: OpKey) -> Option<u32> {
    IDEMPOTENT_SUCCESS_CODES
        .iter()
        .find(|(op, _)| *op == op_key)
        .and_then(|(_, code)| *code)
}

/// Classifies server replies for one operation.
#[derive(Debug, Clone, Copy)]
pub struct ResponseClassifier {
    op_key: OpKey,
    idempotent_code: Option<u32>,
}

impl ResponseClassifier {
    #[must_use]
    pub fn for_op(op_key: OpKey) -> Self {
        Self {
            op_key,
            idempotent_code: idempotent_success_code(op_key),
        }
    }

    /// Maps a server result code to an outcome.
    #[must_use]
    pub fn classify(&self, code: u32) -> Outcome {
        if code == EXECUTE_SUCCESS {
            Outcome::Success
        } else if self.idempotent_code == Some(code) {
            Outcome::IdempotentSuccess
        } else if ErrorCode::from_server_code(code) == ErrorCode::ServerError {
            Outcome::ServerError
        } else {
            Outcome::UserError
        }
    }

    /// Classifies a reply, emits its health signal and builds the caller error.
    ///
    /// `request` is the one-line request summary used in the error message.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::ServerException` for server faults and
    /// `ConnectorError::ServerUserError` for rejections. Both carry the
    /// server code and message.
    pub fn settle(
        &self,
        pool: &dyn ConnectionManager,
        conn_id: &ConnectionId,
        code: u32,
        info: &str,
        elapsed: Duration,
        request: &str,
    ) -> Result<Outcome, ConnectorError> {
        let outcome = self.classify(code);
        let code_type = ErrorCode::from_server_code(code);

        match outcome {
            Outcome::ServerError => {
                pool.report_fail(conn_id, ErrorCode::ServerError, elapsed);
                Err(ConnectorError::ServerException {
                    op_key: self.op_key,
                    request: request.to_string(),
                    server_code: code,
                    server_info: info.to_string(),
                    conn_id: conn_id.clone(),
                })
            }
            Outcome::UserError => {
                pool.report_success(conn_id, code_type, elapsed);
                Err(ConnectorError::ServerUserError {
                    op_key: self.op_key,
                    request: request.to_string(),
                    server_code: code,
                    server_info: info.to_string(),
                    conn_id: conn_id.clone(),
                })
            }
            Outcome::Success | Outcome::IdempotentSuccess => {
                pool.report_success(conn_id, code_type, elapsed);
                Ok(outcome)
            }
        }
    }
}
