//! Readiness gate in front of every operation.
//!
//! Gives the pool a bounded grace window to finish its initial connection
//! setup without blocking callers indefinitely at startup.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::ConnectorError;
use crate::network::RunContext;
use crate::traits::ConnectionManager;

/// How a readiness wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The pool is ready and this caller logged the one-time readiness notice.
    Announced,
    /// The pool is ready; the notice had already been logged.
    Ready,
    /// The window elapsed before the pool became ready.
    WindowElapsed,
}

/// Waits for the connection pool to report readiness.
pub struct ReadinessGate {
    pool: Arc<dyn ConnectionManager>,
    run: RunContext,
    window: Duration,
    step: Duration,
    announced: AtomicBool,
}

impl ReadinessGate {
    /// `window` bounds each wait; `step` is the sleep between polls.
    #[must_use]
    pub fn new(
        pool: Arc<dyn ConnectionManager>,
        run: RunContext,
        window: Duration,
        step: Duration,
    ) -> Self {
        Self {
            pool,
            run,
            window,
            step,
            announced: AtomicBool::new(false),
        }
    }

    /// Polls the pool until it is ready or the window elapses.
    ///
    /// An elapsed window is not an error: the caller proceeds and a pool that
    /// is truly not ready surfaces as a connection-acquisition failure.
    /// Exactly one caller per gate ever receives [`Readiness::Announced`].
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::InvalidState` as soon as the run context is
    /// destroyed, including while sleeping between polls.
    pub async fn wait_ready(&self) -> Result<Readiness, ConnectorError> {
        let deadline = Instant::now() + self.window;
        let mut shutdown = self.run.shutdown_receiver();

        loop {
            if *shutdown.borrow_and_update() {
                return Err(ConnectorError::InvalidState {
                    message: "SDK context has been destroyed".to_string(),
                });
            }
            if Instant::now() >= deadline {
                debug!(
                    sdk_context = self.run.context_id(),
                    window_ms = u64::try_from(self.window.as_millis()).unwrap_or(u64::MAX),
                    "discover service not ready within window, proceeding"
                );
                return Ok(Readiness::WindowElapsed);
            }
            if self.pool.is_ready() {
                if self
                    .announced
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
                {
                    info!(
                        sdk_context = self.run.context_id(),
                        "waitDiscover: discover service is ready"
                    );
                    return Ok(Readiness::Announced);
                }
                return Ok(Readiness::Ready);
            }

            tokio::select! {
                () = tokio::time::sleep(self.step) => {}
                _ = shutdown.changed() => {}
            }
        }
    }

    /// Whether the one-time readiness notice has been logged.
    #[must_use]
    pub fn has_announced(&self) -> bool {
        self.announced.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::Barrier;

    use super::*;
    use crate::test_support::MockPool;

    fn gate(pool: &Arc<MockPool>, run: &RunContext) -> ReadinessGate {
        ReadinessGate::new(
            Arc::clone(pool) as Arc<dyn ConnectionManager>,
            run.clone(),
            Duration::from_millis(500),
            Duration::from_millis(10),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn ready_pool_passes_immediately() {
        let pool = Arc::new(MockPool::ready());
        let run = RunContext::new("sdk-test");
        let gate = gate(&pool, &run);

        let start = Instant::now();
        assert_eq!(gate.wait_ready().await.unwrap(), Readiness::Announced);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(pool.ready_polls(), 1);
        assert!(gate.has_announced());

        assert_eq!(gate.wait_ready().await.unwrap(), Readiness::Ready);
    }

    // The gate proceeds optimistically when the window elapses; callers see
    // the acquisition failure instead of a readiness error.
    #[tokio::test(start_paused = true)]
    async fn window_elapses_without_error() {
        let pool = Arc::new(MockPool::not_ready());
        let run = RunContext::new("sdk-test");
        let gate = gate(&pool, &run);

        let start = Instant::now();
        assert_eq!(gate.wait_ready().await.unwrap(), Readiness::WindowElapsed);
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(500));
        assert!(waited < Duration::from_millis(520));
        assert!(pool.ready_polls() >= 50);
        assert!(!gate.has_announced());
    }

    #[tokio::test(start_paused = true)]
    async fn becomes_ready_mid_wait() {
        let pool = Arc::new(MockPool::not_ready());
        let run = RunContext::new("sdk-test");
        let gate = gate(&pool, &run);

        let flipper = Arc::clone(&pool);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            flipper.set_ready(true);
        });

        let start = Instant::now();
        assert_eq!(gate.wait_ready().await.unwrap(), Readiness::Announced);
        assert!(start.elapsed() < Duration::from_millis(200));
        assert!(gate.has_announced());
    }

    #[tokio::test(start_paused = true)]
    async fn destroyed_context_fails_immediately() {
        let pool = Arc::new(MockPool::ready());
        let run = RunContext::new("sdk-test");
        run.destroy();
        let gate = gate(&pool, &run);

        let err = gate.wait_ready().await.unwrap_err();
        assert!(matches!(err, ConnectorError::InvalidState { .. }));
        assert_eq!(pool.ready_polls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn destroy_interrupts_sleeping_waiter() {
        let pool = Arc::new(MockPool::not_ready());
        let run = RunContext::new("sdk-test");
        let gate = Arc::new(gate(&pool, &run));

        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.wait_ready().await })
        };
        tokio::time::sleep(Duration::from_millis(30)).await;
        run.destroy();

        let result = waiter.await.unwrap();
        assert!(matches!(result, Err(ConnectorError::InvalidState { .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_callers_announce_once() {
        const CALLERS: usize = 16;
        let pool = Arc::new(MockPool::ready());
        let run = RunContext::new("sdk-test");
        let gate = Arc::new(gate(&pool, &run));
        let start_line = Arc::new(Barrier::new(CALLERS));

        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let start_line = Arc::clone(&start_line);
                tokio::spawn(async move {
                    start_line.wait().await;
                    gate.wait_ready().await
                })
            })
            .collect();

        let mut announced = 0;
        let mut ready = 0;
        for handle in handles {
            match handle.await.unwrap().unwrap() {
                Readiness::Announced => announced += 1,
                Readiness::Ready => ready += 1,
                Readiness::WindowElapsed => panic!("ready pool must not exhaust the window"),
            }
        }
        assert_eq!(announced, 1);
        assert_eq!(ready, CALLERS - 1);
        assert!(gate.has_announced());
    }
}
