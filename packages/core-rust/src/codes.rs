//! Server result codes and the SDK error-code vocabulary.
//!
//! The server answers every call with a six-digit result code. The leading
//! three digits select the code *type*, which is what the SDK reports to the
//! connection pool and uses to decide whether the remote side is at fault.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Named server result codes.
pub mod result_code {
    pub const EXECUTE_SUCCESS: u32 = 200_000;
    pub const BAD_REQUEST: u32 = 400_000;
    pub const EXISTED_RESOURCE: u32 = 400_201;
    pub const NOT_FOUND_RESOURCE: u32 = 400_202;
    pub const CMDB_NOT_FIND_HOST: u32 = 404_001;
    pub const EXECUTE_EXCEPTION: u32 = 500_000;
    pub const STORE_LAYER_EXCEPTION: u32 = 500_001;
}

/// SDK-wide error codes.
///
/// Codes below 2000 describe SDK-side conditions; codes from 2000 up describe
/// what happened on the wire or on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    Success,
    InvalidArgument,
    InvalidState,
    ServerUserError,
    NetworkError,
    ServerException,
    ServerError,
    RpcError,
    InvalidRequest,
    Unauthorized,
    RequestLimit,
    CmdbNotFound,
    UnknownServerError,
}

impl ErrorCode {
    /// Stable numeric value of the code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        match self {
            ErrorCode::Success => 0,
            ErrorCode::InvalidArgument => 1001,
            ErrorCode::InvalidState => 1005,
            ErrorCode::ServerUserError => 1006,
            ErrorCode::NetworkError => 1007,
            ErrorCode::ServerException => 1016,
            ErrorCode::ServerError => 2002,
            ErrorCode::RpcError => 2003,
            ErrorCode::InvalidRequest => 2006,
            ErrorCode::Unauthorized => 2007,
            ErrorCode::RequestLimit => 2008,
            ErrorCode::CmdbNotFound => 2009,
            ErrorCode::UnknownServerError => 2100,
        }
    }

    /// Maps a server result code to its code type.
    #[must_use]
    pub fn from_server_code(code: u32) -> Self {
        match code / 1000 {
            200 => ErrorCode::Success,
            400 => ErrorCode::InvalidRequest,
            401 => ErrorCode::Unauthorized,
            403 | 429 => ErrorCode::RequestLimit,
            404 => ErrorCode::CmdbNotFound,
            500 => ErrorCode::ServerError,
            _ => ErrorCode::UnknownServerError,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}({})", self.as_i32())
    }
}
