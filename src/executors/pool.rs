//! # WorkerPool: fixed set of worker threads over a shared queue.
//!
//! ## Architecture
//! ```text
//! submit(job) ──► [crossbeam queue] ──► worker 1 ──► catch_unwind(job)
//!                  (bounded or not)  ├─► worker 2 ──► catch_unwind(job)
//!                                    └─► worker N ──► catch_unwind(job)
//! ```
//!
//! ## Rules
//! - Jobs run in FIFO order of submission, spread over all workers.
//! - A panicking job is logged; the worker keeps serving the queue.
//! - With a bounded queue, `submit` blocks while the queue is full.
//! - `shutdown` closes the queue, lets workers drain it, then joins them.
//!   Submitting afterwards fails with `ExecutorRejected`.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, error};

use crate::error::{BusError, panic_message};

use super::executor::{Executor, Job};

/// Worker pool settings.
///
/// ## Sentinel values
/// - `threads = 0` → one worker per available CPU
/// - `queue_capacity = 0` → unbounded queue
#[derive(Clone, Debug)]
pub struct WorkerPoolConfig {
    /// Number of worker threads.
    pub threads: usize,

    /// Maximum number of queued jobs.
    pub queue_capacity: usize,

    /// Thread name prefix; workers are named `{thread_name}-{index}`.
    pub thread_name: String,
}

impl WorkerPoolConfig {
    /// Returns the worker count with the `0` sentinel resolved.
    #[inline]
    pub fn threads_resolved(&self) -> usize {
        if self.threads == 0 {
            thread::available_parallelism().map_or(1, |n| n.get())
        } else {
            self.threads
        }
    }

    /// Returns the queue bound as an `Option`.
    ///
    /// - `None` → unbounded
    /// - `Some(n)` → at most `n` queued jobs
    #[inline]
    pub fn queue_bound(&self) -> Option<usize> {
        if self.queue_capacity == 0 {
            None
        } else {
            Some(self.queue_capacity)
        }
    }
}

impl Default for WorkerPoolConfig {
    /// - `threads = 0` (available parallelism)
    /// - `queue_capacity = 0` (unbounded)
    /// - `thread_name = "typebus-worker"`
    fn default() -> Self {
        Self {
            threads: 0,
            queue_capacity: 0,
            thread_name: "typebus-worker".to_string(),
        }
    }
}

/// Fixed-size thread pool implementing [`Executor`].
pub struct WorkerPool {
    sender: Mutex<Option<Sender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    threads: usize,
}

impl WorkerPool {
    /// Creates a pool with `threads` workers and an unbounded queue.
    pub fn new(threads: usize) -> Result<Self, BusError> {
        Self::with_config(WorkerPoolConfig {
            threads,
            ..WorkerPoolConfig::default()
        })
    }

    /// Creates a pool from a full configuration and starts its workers.
    pub fn with_config(cfg: WorkerPoolConfig) -> Result<Self, BusError> {
        let threads = cfg.threads_resolved();
        let (tx, rx) = match cfg.queue_bound() {
            Some(cap) => crossbeam_channel::bounded::<Job>(cap),
            None => crossbeam_channel::unbounded::<Job>(),
        };

        let mut workers = Vec::with_capacity(threads);
        for index in 0..threads {
            let name = format!("{}-{index}", cfg.thread_name);
            let rx = rx.clone();
            let spawned = thread::Builder::new()
                .name(name.clone())
                .spawn(move || work(&name, rx));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    // Close the queue so already-started workers exit.
                    drop(tx);
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(BusError::WorkerSpawn(e));
                }
            }
        }
        debug!(threads, queue = ?cfg.queue_bound(), "worker pool started");

        Ok(Self {
            sender: Mutex::new(Some(tx)),
            workers: Mutex::new(workers),
            threads,
        })
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// True once [`shutdown`](Self::shutdown) has been called.
    pub fn is_shutdown(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Closes the queue and waits for workers to finish queued jobs.
    ///
    /// Idempotent. When called from one of the pool's own workers, that worker
    /// is not joined (it exits once its current job returns).
    pub fn shutdown(&self) {
        drop(self.sender.lock().take());

        let workers: Vec<JoinHandle<()>> = std::mem::take(&mut *self.workers.lock());
        let me = thread::current().id();
        for handle in workers {
            if handle.thread().id() == me {
                continue;
            }
            let _ = handle.join();
        }
    }
}

impl Executor for WorkerPool {
    fn submit(&self, job: Job) -> Result<(), BusError> {
        let sender = self.sender.lock().clone();
        let Some(sender) = sender else {
            return Err(BusError::ExecutorRejected {
                executor: self.name(),
                reason: "worker pool is shut down".to_string(),
            });
        };
        sender.send(job).map_err(|_| BusError::ExecutorRejected {
            executor: self.name(),
            reason: "worker queue closed".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "WorkerPool"
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn work(name: &str, rx: Receiver<Job>) {
    for job in rx.iter() {
        if let Err(panic) = catch_unwind(AssertUnwindSafe(job)) {
            error!(worker = name, panic = %panic_message(panic.as_ref()), "job panicked");
        }
    }
    debug!(worker = name, "worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_config_sentinels() {
        let cfg = WorkerPoolConfig::default();
        assert!(cfg.threads_resolved() >= 1);
        assert_eq!(cfg.queue_bound(), None);

        let cfg = WorkerPoolConfig {
            threads: 3,
            queue_capacity: 16,
            ..WorkerPoolConfig::default()
        };
        assert_eq!(cfg.threads_resolved(), 3);
        assert_eq!(cfg.queue_bound(), Some(16));
    }

    #[test]
    fn test_jobs_run_off_caller_thread() {
        let pool = WorkerPool::new(2).expect("pool");
        let caller = thread::current().id();
        let (tx, rx) = crossbeam_channel::unbounded();
        for _ in 0..4 {
            let tx = tx.clone();
            pool.submit(Box::new(move || {
                let _ = tx.send(thread::current().id());
            }))
            .expect("submit");
        }
        for _ in 0..4 {
            let id = rx.recv_timeout(Duration::from_secs(5)).expect("job ran");
            assert_ne!(id, caller);
        }
    }

    #[test]
    fn test_panicking_job_does_not_kill_worker() {
        let pool = WorkerPool::new(1).expect("pool");
        let done = Arc::new(AtomicUsize::new(0));

        pool.submit(Box::new(|| panic!("job blew up"))).expect("submit");
        let counter = Arc::clone(&done);
        pool.submit(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
        .expect("submit");

        pool.shutdown();
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_shutdown_drains_then_rejects() {
        let pool = WorkerPool::with_config(WorkerPoolConfig {
            threads: 1,
            queue_capacity: 8,
            thread_name: "drain".into(),
        })
        .expect("pool");
        let done = Arc::new(AtomicUsize::new(0));
        for _ in 0..5 {
            let counter = Arc::clone(&done);
            pool.submit(Box::new(move || {
                thread::sleep(Duration::from_millis(5));
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .expect("submit");
        }

        pool.shutdown();
        assert_eq!(done.load(Ordering::SeqCst), 5, "queued jobs must drain");
        assert!(pool.is_shutdown());

        let err = pool.submit(Box::new(|| {})).unwrap_err();
        assert_eq!(err.as_label(), "bus_executor_rejected");
        pool.shutdown();
    }
}
