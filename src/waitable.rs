//! Result-blind termination handles
//!
//! The pending registry stores tasks of unrelated result types side by side.
//! All a dependent needs from a prerequisite is "has it terminated yet", so
//! tasks are erased down to [`Waitable`] before they are registered.

use futures::future::BoxFuture;
use tokio::sync::watch;

/// Something that can be waited on until it has terminated.
///
/// The returned future resolves once the underlying computation is done,
/// whether it succeeded, failed or panicked. The outcome itself is never
/// exposed.
pub trait Waitable: Send + Sync {
    /// Returns a future that resolves when the computation has terminated.
    ///
    /// The future owns everything it needs, so it can be created under a
    /// lock and polled after the lock is released.
    fn wait(&self) -> BoxFuture<'static, ()>;
}

/// Creates a linked signal/handle pair.
///
/// The [`Completion`] side terminates when the [`CompletionSignal`] is
/// dropped, including when it is dropped during a panic unwind.
pub fn completion() -> (CompletionSignal, Completion) {
    let (tx, rx) = watch::channel(false);
    (CompletionSignal { tx }, Completion { rx })
}

/// Producer half of a completion pair, owned by the running task.
#[derive(Debug)]
pub struct CompletionSignal {
    tx: watch::Sender<bool>,
}

impl Drop for CompletionSignal {
    fn drop(&mut self) {
        self.tx.send_replace(true);
    }
}

/// Waiting half of a completion pair. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct Completion {
    rx: watch::Receiver<bool>,
}

impl Completion {
    /// Returns `true` if the linked task has already terminated.
    pub fn is_terminated(&self) -> bool {
        *self.rx.borrow()
    }
}

impl Waitable for Completion {
    fn wait(&self) -> BoxFuture<'static, ()> {
        let mut rx = self.rx.clone();
        Box::pin(async move {
            // A closed channel also means the producer is gone.
            let _ = rx.wait_for(|done| *done).await;
        })
    }
}
