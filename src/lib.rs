//! # Local Async Queue
//!
//! An in-process task queue that runs async operations concurrently unless
//! the caller declares that one must wait for another.
//!
//! ## Key Features
//!
//! - **Partial ordering**: metadata on each task decides, through
//!   [`DependencyTracker`], which pending tasks it has to wait for
//! - **Serial mode**: [`Serial`] metadata turns the queue into a FIFO that
//!   runs one operation at a time
//! - **Non-blocking submission**: submitting returns a [`TaskHandle`] at once;
//!   only awaiting the handle suspends
//! - **Error isolation**: a failed or panicking task still releases its
//!   dependents, and its error is only visible through its own handle

pub mod dependency;
pub mod handle;
pub mod mock;
pub mod queue;
pub mod spawn;
pub mod waitable;

pub use dependency::{DependencyTracker, Serial};
pub use handle::{TaskError, TaskHandle, TaskId};
pub use mock::{generate_mock_jobs, Job, Resource};
pub use queue::AsyncQueue;
pub use spawn::{Priority, Spawn, TokioSpawn};
pub use waitable::{Completion, Waitable};
