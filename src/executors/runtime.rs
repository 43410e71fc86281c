//! # TokioExecutor: run handler jobs on a tokio runtime's blocking pool.
//!
//! Handler bodies are synchronous and may block, so jobs go through
//! [`Handle::spawn_blocking`] rather than `spawn`. The runtime stays owned by
//! the caller; the executor only keeps a [`Handle`].

use tokio::runtime::Handle;

use crate::error::BusError;

use super::executor::{Executor, Job};

/// [`Executor`] backed by a tokio runtime handle.
#[derive(Clone, Debug)]
pub struct TokioExecutor {
    handle: Handle,
}

impl TokioExecutor {
    /// Wraps an explicit runtime handle.
    #[must_use]
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Captures the handle of the runtime the caller is running in.
    ///
    /// Fails with `ExecutorRejected` outside a tokio runtime.
    pub fn current() -> Result<Self, BusError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| BusError::ExecutorRejected {
                executor: "TokioExecutor",
                reason: e.to_string(),
            })
    }
}

impl Executor for TokioExecutor {
    fn submit(&self, job: Job) -> Result<(), BusError> {
        // A runtime that has shut down drops the job unrun; the bus reports that.
        drop(self.handle.spawn_blocking(job));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "TokioExecutor"
    }
}
