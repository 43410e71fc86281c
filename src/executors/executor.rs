//! # Executor trait.
//!
//! The asynchronous bus does not own threads; it hands one [`Job`] per matched
//! handler to an [`Executor`]. Pool sizing and queueing are the executor's
//! business.
//!
//! ## Contract
//! - `submit` must not run the job on the calling thread.
//! - A job that panics must not take the executor down.
//! - `submit` fails with [`BusError::ExecutorRejected`] when the executor knows
//!   it can no longer accept work.
//! - An accepted job is either run or dropped. The bus reports a dropped
//!   delivery to its observers, so dropping is never silent.

use std::sync::Arc;

use crate::error::BusError;

/// Unit of work submitted by the asynchronous bus.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Task-executing worker pool abstraction.
pub trait Executor: Send + Sync + 'static {
    /// Schedules `job` to run on a worker.
    fn submit(&self, job: Job) -> Result<(), BusError>;

    /// Returns the executor name used in logs and errors.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<X: Executor + ?Sized> Executor for Arc<X> {
    fn submit(&self, job: Job) -> Result<(), BusError> {
        (**self).submit(job)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
