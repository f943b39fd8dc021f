//! Event Loop Bridge.
//!
//! Blocking callers (webhook requests on the blocking pool, `main` during startup and shutdown)
//! drive async work on one process-wide [`ExecutionContext`]: a current-thread tokio runtime that
//! is created lazily and replaced only once it has been closed. The lock guards the
//! create-or-reuse decision only; the work itself runs outside it, so concurrent callers share
//! the context through `Runtime::block_on`.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info};

/// One shared cooperative scheduler.
pub struct ExecutionContext {
    id: u64,
    runtime: Option<Runtime>,
    closed: AtomicBool,
}

impl ExecutionContext {
    fn new(id: u64) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .thread_name("dbot-bridge")
            .build()
            .context("Failed to build shared execution context")?;
        Ok(Self {
            id,
            runtime: Some(runtime),
            closed: AtomicBool::new(false),
        })
    }

    /// Sequence number of this context (1 for the first one created).
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Marks the context closed. Work already running on it finishes; the next bridge call
    /// installs a fresh context.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn block_on<F: Future>(&self, work: F) -> Result<F::Output> {
        let runtime = self
            .runtime
            .as_ref()
            .context("Execution context has no runtime")?;
        Ok(runtime.block_on(work))
    }
}

impl Drop for ExecutionContext {
    fn drop(&mut self) {
        // The last holder may be a thread inside another runtime; a blocking shutdown would panic there.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Single-slot, lock-guarded holder of the current [`ExecutionContext`].
#[derive(Default)]
pub struct EventLoopBridge {
    current: Mutex<Option<Arc<ExecutionContext>>>,
    created: AtomicU64,
}

impl EventLoopBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current context, creating one if none exists or the existing one is closed.
    pub fn current_context(&self) -> Result<Arc<ExecutionContext>> {
        let mut slot = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(ctx) = slot.as_ref().filter(|ctx| !ctx.is_closed()) {
            return Ok(ctx.clone());
        }
        let id = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        let ctx = Arc::new(ExecutionContext::new(id)?);
        if let Some(old) = slot.replace(ctx.clone()) {
            info!(old = old.id(), new = id, "Execution context was closed, replaced");
        } else {
            debug!(id, "Execution context created");
        }
        Ok(ctx)
    }

    /// Runs `work` to completion on the shared context and returns its output.
    ///
    /// Must be called from a blocking thread (never from inside an async task). A failure
    /// inside `work` is part of its output and leaves the context in place.
    pub fn run_to_completion<F: Future>(&self, work: F) -> Result<F::Output> {
        let ctx = self.current_context()?;
        ctx.block_on(work)
    }

    /// Number of contexts installed so far.
    pub fn contexts_created(&self) -> u64 {
        self.created.load(Ordering::SeqCst)
    }

    /// Closes the current context, if any.
    pub fn close(&self) {
        let slot = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(ctx) = slot.as_ref() {
            ctx.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    /// **Test: N simultaneous first callers install exactly one context.**
    #[test]
    fn test_concurrent_first_calls_create_one_context() {
        const CALLERS: usize = 16;
        let bridge = Arc::new(EventLoopBridge::new());
        let barrier = Arc::new(Barrier::new(CALLERS));

        let handles: Vec<_> = (0..CALLERS)
            .map(|i| {
                let bridge = bridge.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    let ctx = bridge.current_context().unwrap();
                    let doubled = bridge
                        .run_to_completion(async move {
                            tokio::time::sleep(Duration::from_millis(5)).await;
                            i * 2
                        })
                        .unwrap();
                    assert_eq!(doubled, i * 2);
                    ctx.id()
                })
            })
            .collect();

        let ids: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ids.iter().all(|id| *id == 1));
        assert_eq!(bridge.contexts_created(), 1);
    }

    /// **Test: a closed context is replaced instead of failing the next call.**
    #[test]
    fn test_closed_context_is_replaced() {
        let bridge = EventLoopBridge::new();
        assert_eq!(bridge.run_to_completion(async { 1 }).unwrap(), 1);
        let first = bridge.current_context().unwrap();

        first.close();
        assert!(first.is_closed());

        assert_eq!(bridge.run_to_completion(async { 2 }).unwrap(), 2);
        let second = bridge.current_context().unwrap();
        assert_eq!(second.id(), 2);
        assert!(!second.is_closed());
        assert_eq!(bridge.contexts_created(), 2);
    }

    /// **Test: failing work propagates to the caller and the context stays installed.**
    #[test]
    fn test_failed_work_keeps_context() {
        let bridge = EventLoopBridge::new();
        let result: Result<()> = bridge
            .run_to_completion(async { Err(anyhow::anyhow!("handler blew up")) })
            .unwrap();
        assert!(result.is_err());

        bridge.run_to_completion(async {}).unwrap();
        assert_eq!(bridge.contexts_created(), 1);
    }

    #[test]
    fn test_bridge_close_marks_current_context() {
        let bridge = EventLoopBridge::new();
        bridge.close();
        assert_eq!(bridge.contexts_created(), 0);

        let ctx = bridge.current_context().unwrap();
        bridge.close();
        assert!(ctx.is_closed());
    }
}
