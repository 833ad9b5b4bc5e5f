//! Operation execution.
//!
//! 1. **Readiness** (`readiness`): bounded wait for the connection pool
//! 2. **Correlation** (`correlator`): request ids and per-call contexts
//! 3. **Operations** (`operation`): typed remote calls per operation key
//! 4. **Classification** (`classify`): result codes to outcomes and health signals
//! 5. **Executors** (`executor`): the `Connector` driving all of the above

pub mod classify;
pub mod correlator;
pub mod executor;
pub mod operation;
pub mod readiness;

pub use classify::{idempotent_success_code, Outcome, ResponseClassifier};
pub use correlator::{RequestContext, RequestCorrelator, REQUEST_ID_HEADER};
pub use executor::Connector;
pub use operation::{DeregisterCall, HeartbeatCall, RegisterCall, RemoteCall, ReportClientCall};
pub use readiness::{Readiness, ReadinessGate};
