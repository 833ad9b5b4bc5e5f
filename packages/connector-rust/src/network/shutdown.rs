//! SDK run context: shutdown signal and in-flight operation tracking.
//!
//! The shutdown signal is a `watch` channel so every waiter observes the
//! transition, and in-flight operations are counted with RAII guards.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

/// Process-wide run context of one SDK instance.
///
/// Cloning is cheap; all clones share the same signal and counter.
#[derive(Debug, Clone)]
pub struct RunContext {
    context_id: Arc<str>,
    shutdown_signal: Arc<watch::Sender<bool>>,
    in_flight: Arc<AtomicU64>,
}

impl RunContext {
    /// Creates a live context with the given id, or a random UUID when `context_id` is empty.
    #[must_use]
    pub fn new(context_id: &str) -> Self {
        let id = if context_id.is_empty() {
            uuid::Uuid::new_v4().to_string()
        } else {
            context_id.to_string()
        };
        let (tx, _rx) = watch::channel(false);
        Self {
            context_id: Arc::from(id),
            shutdown_signal: Arc::new(tx),
            in_flight: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Identifier used to tag log lines of this SDK instance.
    #[must_use]
    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    /// Returns a receiver that observes the shutdown transition.
    #[must_use]
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_signal.subscribe()
    }

    /// Marks the context destroyed and wakes every waiter.
    pub fn destroy(&self) {
        self.shutdown_signal.send_replace(true);
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        *self.shutdown_signal.borrow()
    }

    /// Creates an RAII guard that counts one in-flight operation.
    #[must_use]
    pub fn in_flight_guard(&self) -> InFlightGuard {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    #[must_use]
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Waits for in-flight operations to finish, up to `timeout`.
    ///
    /// Returns `true` if the counter reached zero in time.
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if self.in_flight.load(Ordering::Relaxed) == 0 {
                return true;
            }

            if tokio::time::Instant::now() >= deadline {
                return false;
            }

            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

/// Decrements the in-flight counter when dropped, including on unwind.
#[derive(Debug)]
pub struct InFlightGuard {
    in_flight: Arc<AtomicU64>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}
