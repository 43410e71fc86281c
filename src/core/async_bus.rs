//! # AsyncEventBus: delivery on an executor.
//!
//! [`AsyncEventBus::post`] resolves the handlers for an event and submits **one
//! job per handler** to the configured [`Executor`], then returns. Handler bodies
//! never run on the posting thread.
//!
//! ## Architecture
//! ```text
//! post(event) ──► resolve ──► [h1, h2, h3]
//!                   │
//!                   └─► Arc<event> shared by all jobs
//!                         ├──► submit(job h1) ──► worker ──► guard(h1) ──► h1(&event)
//!                         ├──► submit(job h2) ──► worker ──► guard(h2) ──► h2(&event)
//!                         └──► submit(job h3) ──► worker ──► guard(h3) ──► h3(&event)
//! ```
//!
//! ## Rules
//! - No ordering between different handlers; they may run in parallel.
//! - Exclusive handlers are still serialized (one in-flight invocation each).
//! - Handler errors and panics are caught on the worker and reported to the
//!   observers; they never reach the caller and never kill a worker.
//! - If the executor rejects a job, `post` stops submitting and returns the
//!   rejection; jobs already submitted still run.
//! - A job dropped without running (rejected, or discarded by a runtime that
//!   shut down) is reported to the observers as `FailureCause::Abandoned`.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::error::BusError;
use crate::events::{Event, TypeKey};
use crate::executors::{Executor, Job};
use crate::subscribers::{Subscribe, Subscription};

use super::config::BusConfig;
use super::dispatcher::Dispatcher;
use super::resolver::Matched;

/// Event bus delivering on a worker pool.
///
/// Cheap to clone; clones share registrations and the executor.
#[derive(Clone)]
pub struct AsyncEventBus {
    core: Arc<Dispatcher>,
    executor: Arc<dyn Executor>,
}

impl AsyncEventBus {
    /// Creates a bus with the default configuration over `executor`.
    pub fn new(executor: impl Executor) -> Self {
        Self::with_config(BusConfig::default(), executor)
    }

    /// Creates a bus from an explicit configuration.
    ///
    /// `cfg.on_failure` has no effect here: failures only reach the observers.
    pub fn with_config(cfg: BusConfig, executor: impl Executor) -> Self {
        Self {
            core: Arc::new(Dispatcher::new(cfg)),
            executor: Arc::new(executor),
        }
    }

    /// Bus name used in logs and failure reports.
    pub fn identifier(&self) -> &str {
        self.core.identifier()
    }

    /// Registers every handler declared by `S` for this object.
    pub fn register<S: Subscribe>(&self, subscriber: &Arc<S>) -> Result<(), BusError> {
        self.core.register(subscriber)
    }

    /// Removes every handler of this object.
    ///
    /// Jobs already submitted for this object still run.
    pub fn unregister<S: Subscribe>(&self, subscriber: &Arc<S>) -> Result<(), BusError> {
        self.core.unregister(subscriber)
    }

    /// Submits one delivery job per matching handler and returns.
    pub fn post<E: Event>(&self, event: E) -> Result<(), BusError> {
        let matched = self.core.resolve::<E>();
        if matched.is_empty() {
            return Ok(());
        }

        let event = Arc::new(event);
        for m in matched {
            let subscriber = m.subscription.subscriber();
            let method = m.subscription.method();
            let delivery = Delivery {
                core: Arc::clone(&self.core),
                matched: m,
                event: Arc::clone(&event),
                executor: self.executor.name(),
                ran: false,
            };

            let job: Job = Box::new(move || delivery.run());
            self.executor.submit(job).inspect_err(|e| {
                warn!(
                    bus = %self.core.identifier(),
                    executor = self.executor.name(),
                    subscriber,
                    method,
                    error = %e,
                    "delivery job rejected"
                );
            })?;
        }
        Ok(())
    }

    /// True if this exact object is registered.
    pub fn is_registered<S: Subscribe>(&self, subscriber: &Arc<S>) -> bool {
        self.core.is_registered(subscriber)
    }

    /// Number of registered objects.
    pub fn subscriber_count(&self) -> usize {
        self.core.subscriber_count()
    }

    /// Subscriptions declared for parameter type `T`, in registration order.
    pub fn subscriptions_for<T: ?Sized + 'static>(&self) -> Vec<Arc<Subscription>> {
        self.core.subscriptions_for::<T>()
    }

    /// Parameter types with at least one subscription, sorted by name.
    pub fn registered_types(&self) -> Vec<TypeKey> {
        self.core.registered_types()
    }

    /// True if posting an `E` would reach at least one handler.
    pub fn has_subscribers<E: Event>(&self) -> bool {
        self.core.has_subscribers::<E>()
    }

    /// Types an `E` is delivered as, in dispatch order.
    pub fn assignable_types<E: Event>(&self) -> Vec<TypeKey> {
        self.core.assignable_types::<E>()
    }
}

/// One handler invocation travelling through the executor.
///
/// Reports itself as abandoned if dropped before `run`.
struct Delivery<E: Event> {
    core: Arc<Dispatcher>,
    matched: Matched,
    event: Arc<E>,
    executor: &'static str,
    ran: bool,
}

impl<E: Event> Delivery<E> {
    fn run(mut self) {
        self.ran = true;
        self.core.invoke_isolated(&self.matched, self.event.as_ref());
    }
}

impl<E: Event> Drop for Delivery<E> {
    fn drop(&mut self) {
        if !self.ran {
            self.core
                .abandoned(&self.matched, self.event.as_ref(), self.executor);
        }
    }
}

impl fmt::Debug for AsyncEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncEventBus")
            .field("identifier", &self.identifier())
            .field("executor", &self.executor.name())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
