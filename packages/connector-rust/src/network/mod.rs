//! Connection leasing and run-context lifecycle.

pub mod connection;
pub mod shutdown;

pub use connection::ConnectionLease;
pub use shutdown::{InFlightGuard, RunContext};
