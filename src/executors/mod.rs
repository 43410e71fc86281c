//! Executors: where the asynchronous bus runs handler bodies.
//!
//! ## Contents
//! - [`Executor`], [`Job`] the submit-only worker pool abstraction
//! - [`WorkerPool`], [`WorkerPoolConfig`] fixed OS-thread pool over a crossbeam queue
//! - `TokioExecutor` tokio blocking-pool adapter (feature `tokio`, on by default)

mod executor;
mod pool;
#[cfg(feature = "tokio")]
mod runtime;

pub use executor::{Executor, Job};
pub use pool::{WorkerPool, WorkerPoolConfig};
#[cfg(feature = "tokio")]
pub use runtime::TokioExecutor;
