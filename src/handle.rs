//! Caller-facing handles to queued tasks

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};

/// Process-wide unique identifier of a submitted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Ways a task can terminate without producing its operation's output.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task panicked: {0}")]
    Panicked(String),

    #[error("task was cancelled before completion")]
    Cancelled,
}

impl From<JoinError> for TaskError {
    fn from(err: JoinError) -> Self {
        if err.is_cancelled() {
            return TaskError::Cancelled;
        }
        let payload = err.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        TaskError::Panicked(message)
    }
}

/// Handle to a task submitted to an [`AsyncQueue`](crate::AsyncQueue).
///
/// Awaiting the handle yields the operation's output. Fallible submissions
/// produce a `TaskHandle<Result<T, E>>`, so an operation error is only ever
/// seen by whoever awaits this handle.
///
/// A panic inside the task is re-raised in the awaiting caller. Use
/// [`join`](TaskHandle::join) to observe it as a [`TaskError`] instead.
///
/// Dropping the handle does not cancel the task.
pub struct TaskHandle<T> {
    id: TaskId,
    inner: JoinHandle<T>,
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(id: TaskId, inner: JoinHandle<T>) -> Self {
        Self { id, inner }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Returns `true` once the task has terminated.
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Waits for the task, reporting panics and runtime cancellation as errors.
    pub async fn join(self) -> Result<T, TaskError> {
        self.inner.await.map_err(TaskError::from)
    }
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("finished", &self.inner.is_finished())
            .finish()
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let id = self.id;
        match Pin::new(&mut self.inner).poll(cx) {
            Poll::Ready(Ok(value)) => Poll::Ready(value),
            Poll::Ready(Err(err)) if err.is_panic() => {
                std::panic::resume_unwind(err.into_panic())
            }
            Poll::Ready(Err(err)) => {
                panic!("{id} terminated without producing a result: {err}")
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
