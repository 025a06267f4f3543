//! Dependency-ordered async task queue
//!
//! Every submission is checked against the tasks that are still pending at
//! that moment. The ones its metadata depends on become its prerequisites,
//! and the new task's operation only starts after all of them terminated.
//! Tasks without a relationship run concurrently.
//!
//! The pending registry is a plain `Vec` behind one mutex. The lock is held
//! for the O(pending) dependency scan plus an insert, and for the removal at
//! the end of each task, never across an `.await`. Every submission scans the
//! whole registry, so very large pending sets serialize submitters on this
//! lock.

use futures::future::{join_all, BoxFuture};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace, Instrument};

use crate::dependency::{DependencyTracker, Serial};
use crate::handle::{TaskHandle, TaskId};
use crate::spawn::{Priority, Spawn, TokioSpawn};
use crate::waitable::{completion, CompletionSignal, Waitable};

const DEFAULT_NAME: &str = "async-queue";

/// A task that has been submitted but whose operation has not finished yet
struct PendingEntry<M> {
    id: TaskId,
    metadata: M,
    waitable: Box<dyn Waitable>,
}

type Registry<M> = Mutex<Vec<PendingEntry<M>>>;

fn lock<M>(registry: &Registry<M>) -> MutexGuard<'_, Vec<PendingEntry<M>>> {
    // Entries are only pushed or removed whole, a poisoned Vec is still valid.
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Removes a task's entry and signals its termination when dropped.
///
/// Lives inside the spawned future, so it runs on normal completion, on
/// panic unwind and when the runtime drops the task.
struct Deregister<M> {
    id: TaskId,
    queue: Arc<str>,
    registry: Arc<Registry<M>>,
    _signal: CompletionSignal,
}

impl<M> Drop for Deregister<M> {
    fn drop(&mut self) {
        let remaining = {
            let mut entries = lock(&self.registry);
            if let Some(pos) = entries.iter().position(|entry| entry.id == self.id) {
                entries.swap_remove(pos);
            }
            entries.len()
        };
        debug!("{}: {} finished, {} still pending", self.queue, self.id, remaining);
        // `_signal` drops after this, releasing dependents.
    }
}

/// Runs async operations concurrently unless their metadata says otherwise.
///
/// `M` decides ordering through [`DependencyTracker`]. With [`Serial`] as
/// metadata the queue becomes a FIFO that runs one operation at a time.
///
/// ```no_run
/// use local_async_queue::{AsyncQueue, Serial};
///
/// # async fn demo() {
/// let queue: AsyncQueue<Serial> = AsyncQueue::new();
/// let first = queue.submit_serial(None, || async { 1 });
/// let second = queue.submit_serial(None, || async { 2 });
/// assert_eq!(first.await + second.await, 3);
/// # }
/// ```
pub struct AsyncQueue<M, S = TokioSpawn> {
    name: Arc<str>,
    registry: Arc<Registry<M>>,
    spawner: Arc<S>,
}

impl<M, S> Clone for AsyncQueue<M, S> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            registry: Arc::clone(&self.registry),
            spawner: Arc::clone(&self.spawner),
        }
    }
}

impl<M> AsyncQueue<M, TokioSpawn> {
    /// Creates a queue that spawns onto the current tokio runtime.
    pub fn new() -> Self {
        Self::with_spawner(TokioSpawn::new())
    }
}

impl<M> Default for AsyncQueue<M, TokioSpawn> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, S> AsyncQueue<M, S> {
    /// Creates a queue that hands its tasks to `spawner`.
    pub fn with_spawner(spawner: S) -> Self {
        Self {
            name: Arc::from(DEFAULT_NAME),
            registry: Arc::new(Mutex::new(Vec::new())),
            spawner: Arc::new(spawner),
        }
    }

    /// Sets the name used in log events and task spans.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Arc::from(name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of submitted tasks whose operation has not finished yet.
    pub fn pending_count(&self) -> usize {
        lock(&self.registry).len()
    }

    /// Returns `true` if no submitted task is pending.
    pub fn is_idle(&self) -> bool {
        self.pending_count() == 0
    }
}

impl<M, S> AsyncQueue<M, S>
where
    M: DependencyTracker + Send + 'static,
    S: Spawn,
{
    /// Schedules `operation` and returns a handle to its output.
    ///
    /// The operation starts once every task pending right now whose metadata
    /// [`is_dependency`](DependencyTracker::is_dependency) of `metadata` has
    /// terminated, successfully or not. Tasks submitted later never become
    /// prerequisites of this one.
    ///
    /// Returns immediately. `priority` goes to the spawner as is.
    ///
    /// The operation is expected not to fail: a panic inside it is re-raised
    /// in whoever awaits the returned handle.
    pub fn submit<T, F, Fut>(
        &self,
        priority: Option<Priority>,
        metadata: M,
        operation: F,
    ) -> TaskHandle<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let id = TaskId::next();
        let (signal, completion) = completion();

        let dependencies: Vec<BoxFuture<'static, ()>> = {
            let mut entries = lock(&self.registry);
            let dependencies: Vec<_> = entries
                .iter()
                .filter(|entry| entry.metadata.is_dependency(&metadata))
                .map(|entry| entry.waitable.wait())
                .collect();
            entries.push(PendingEntry {
                id,
                metadata,
                waitable: Box::new(completion),
            });
            dependencies
        };

        debug!(
            "{}: submitted {} with {} dependencies",
            self.name,
            id,
            dependencies.len()
        );

        let guard = Deregister {
            id,
            queue: Arc::clone(&self.name),
            registry: Arc::clone(&self.registry),
            _signal: signal,
        };
        let span = tracing::debug_span!("queued_task", queue = %self.name, task = %id);
        let inner = self.spawner.spawn(
            priority,
            async move {
                let _guard = guard;
                join_all(dependencies).await;
                trace!("dependencies satisfied, running");
                let output = operation().await;
                trace!("operation finished");
                output
            }
            .instrument(span),
        );

        TaskHandle::new(id, inner)
    }

    /// Schedules a fallible `operation`.
    ///
    /// Ordering is the same as [`submit`](AsyncQueue::submit). The
    /// operation's error is only delivered through the returned handle; it
    /// does not stop dependent tasks from running.
    pub fn submit_fallible<T, E, F, Fut>(
        &self,
        priority: Option<Priority>,
        metadata: M,
        operation: F,
    ) -> TaskHandle<Result<T, E>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        self.submit(priority, metadata, operation)
    }
}

impl<S: Spawn> AsyncQueue<Serial, S> {
    /// [`submit`](AsyncQueue::submit) for serial queues, which need no metadata.
    pub fn submit_serial<T, F, Fut>(&self, priority: Option<Priority>, operation: F) -> TaskHandle<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.submit(priority, Serial, operation)
    }

    /// [`submit_fallible`](AsyncQueue::submit_fallible) for serial queues.
    pub fn submit_serial_fallible<T, E, F, Fut>(
        &self,
        priority: Option<Priority>,
        operation: F,
    ) -> TaskHandle<Result<T, E>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        self.submit_fallible(priority, Serial, operation)
    }
}
