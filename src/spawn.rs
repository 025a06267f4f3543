//! Host concurrency substrate
//!
//! The queue never owns worker threads. It hands every task to a [`Spawn`]
//! implementation together with the caller's priority hint.

use std::fmt;
use std::future::Future;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Opaque scheduling hint passed through to the spawner untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(u8);

impl Priority {
    pub const BACKGROUND: Priority = Priority(9);
    pub const LOW: Priority = Priority(17);
    pub const MEDIUM: Priority = Priority(21);
    pub const HIGH: Priority = Priority(25);

    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Spawns independently executing futures.
pub trait Spawn: Send + Sync + 'static {
    /// Starts `future` and returns a handle to its output.
    ///
    /// Must not block or suspend: the queue calls this while it holds its
    /// registry lock.
    fn spawn<F>(&self, priority: Option<Priority>, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static;
}

/// Spawns onto a tokio runtime.
///
/// Tokio has no task priorities, so the hint is recorded on the
/// `spawn` span the future runs in.
#[derive(Debug, Clone, Default)]
pub struct TokioSpawn {
    handle: Option<Handle>,
}

impl TokioSpawn {
    /// Uses whichever runtime is current at spawn time.
    ///
    /// # Panics
    ///
    /// Spawning panics when called outside a tokio runtime, as
    /// [`tokio::spawn`] does.
    pub fn new() -> Self {
        Self::default()
    }

    /// Always spawns onto the given runtime.
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle: Some(handle),
        }
    }
}

impl Spawn for TokioSpawn {
    fn spawn<F>(&self, priority: Option<Priority>, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let span = tracing::debug_span!("spawn", priority = priority.map(Priority::get));
        let future = future.instrument(span);
        match &self.handle {
            Some(handle) => handle.spawn(future),
            None => tokio::spawn(future),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_is_passed_verbatim() {
        assert_eq!(Priority::new(42).get(), 42);
        assert_eq!(Priority::HIGH.to_string(), "25");
    }

    #[tokio::test]
    async fn test_tokio_spawn_runs_future() {
        let spawner = TokioSpawn::new();
        let handle = spawner.spawn(Some(Priority::LOW), async { 7 });
        assert_eq!(handle.await.unwrap(), 7);
    }

    #[test]
    fn test_tokio_spawn_with_handle_outside_runtime_context() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .build()
            .unwrap();
        let spawner = TokioSpawn::with_handle(runtime.handle().clone());

        // Not inside block_on, so only the captured handle can spawn this.
        let handle = spawner.spawn(None, async { "done" });
        assert_eq!(runtime.block_on(handle).unwrap(), "done");
    }
}
