//! Request correlation ids and per-call request contexts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use discovery_core::{Headers, OpKey};
use tokio::time::Instant;

/// Header carrying the correlation id of a request.
pub const REQUEST_ID_HEADER: &str = "request-id";

/// Per-call context handed to the transport.
///
/// Built fresh for every call and dropped when the call completes, which
/// also releases the deadline.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub op_key: OpKey,
    pub request_id: String,
    pub timeout: Duration,
    pub deadline: Instant,
    /// Caller headers plus [`REQUEST_ID_HEADER`].
    pub headers: Headers,
}

impl RequestContext {
    /// Time left until the deadline, zero once it has passed.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

/// Produces correlation ids and request contexts.
///
/// Ids increase monotonically within each operation kind and exist only to
/// tie log lines and traces together; they carry no idempotency or ordering
/// meaning.
#[derive(Debug, Default)]
pub struct RequestCorrelator {
    sequences: [AtomicU64; OpKey::COUNT],
}

impl RequestCorrelator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next correlation id for `op_key`: the operation's prefix digit followed
    /// by its sequence number, starting at 1.
    pub fn next_request_id(&self, op_key: OpKey) -> String {
        let seq = self.sequences[op_key.index()].fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{seq}", prefix(op_key))
    }

    /// Builds a deadline-bound context carrying a fresh correlation id and the caller headers.
    pub fn build_context(
        &self,
        op_key: OpKey,
        timeout: Duration,
        headers: Option<&Headers>,
    ) -> RequestContext {
        let request_id = self.next_request_id(op_key);
        let mut headers = headers.cloned().unwrap_or_default();
        headers.insert(REQUEST_ID_HEADER.to_string(), request_id.clone());
        RequestContext {
            op_key,
            request_id,
            timeout,
            deadline: Instant::now() + timeout,
            headers,
        }
    }
}

fn prefix(op_key: OpKey) -> char {
    match op_key {
        OpKey::RegisterInstance => '1',
        OpKey::DeregisterInstance => '2',
        OpKey::InstanceHeartbeat => '3',
        OpKey::ReportClient => '4',
    }
}
