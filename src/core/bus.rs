//! # EventBus: synchronous delivery.
//!
//! [`EventBus::post`] resolves the handlers for an event and invokes them one
//! after another **on the calling thread**. It returns once every matched
//! handler has run (or the [`FailurePolicy`] stopped delivery).
//!
//! ## Rules
//! - Handler order: the event's own type first, then its declared supertypes in
//!   declaration order, then [`AnyEvent`](crate::AnyEvent); registration order
//!   within one type.
//! - No match is not an error: the event is dropped (logged at `debug`).
//! - Exclusive handlers are serialized across all threads posting to this bus.
//! - Handler errors follow the failure policy. Handler panics unwind out of
//!   `post`. Both are reported to the observers first.
//! - No cancellation: a handler that blocks stalls the publishing thread.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use typebus::{Event, EventBus, Handlers, HandlerResult, Subscribe};
//!
//! #[derive(Debug)]
//! struct Deposit { cents: u64 }
//! impl Event for Deposit {}
//!
//! #[derive(Default)]
//! struct Ledger { total: std::sync::atomic::AtomicU64 }
//!
//! impl Ledger {
//!     fn on_deposit(&self, e: &Deposit) -> HandlerResult {
//!         self.total.fetch_add(e.cents, std::sync::atomic::Ordering::SeqCst);
//!         Ok(())
//!     }
//! }
//!
//! impl Subscribe for Ledger {
//!     fn handlers(h: &mut Handlers<Self>) {
//!         h.on("on_deposit", Self::on_deposit);
//!     }
//! }
//!
//! # fn main() -> Result<(), typebus::BusError> {
//! let bus = EventBus::new();
//! let ledger = Arc::new(Ledger::default());
//! bus.register(&ledger)?;
//! bus.post(&Deposit { cents: 250 })?;
//! assert_eq!(ledger.total.load(std::sync::atomic::Ordering::SeqCst), 250);
//! bus.unregister(&ledger)?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::BusError;
use crate::events::{Event, TypeKey};
use crate::subscribers::{Subscribe, Subscription};

use super::builder::BusBuilder;
use super::config::{BusConfig, FailurePolicy};
use super::dispatcher::Dispatcher;

/// Event bus delivering on the publisher's thread.
///
/// Cheap to clone; clones share registrations.
#[derive(Clone)]
pub struct EventBus {
    core: Arc<Dispatcher>,
}

impl EventBus {
    /// Creates a bus with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// Creates a bus from an explicit configuration.
    #[must_use]
    pub fn with_config(cfg: BusConfig) -> Self {
        Self {
            core: Arc::new(Dispatcher::new(cfg)),
        }
    }

    /// Starts a fluent builder.
    #[must_use]
    pub fn builder() -> BusBuilder {
        BusBuilder::new()
    }

    /// Bus name used in logs and failure reports.
    pub fn identifier(&self) -> &str {
        self.core.identifier()
    }

    /// Registers every handler declared by `S` for this object.
    ///
    /// Fails with `NoSubscriberMethods` or `InvalidHandlerSignature` without
    /// touching the registry. Registering the same object twice is a no-op.
    pub fn register<S: Subscribe>(&self, subscriber: &Arc<S>) -> Result<(), BusError> {
        self.core.register(subscriber)
    }

    /// Removes every handler of this object.
    ///
    /// Fails with `ObjectNotRegistered` if the object is not registered.
    pub fn unregister<S: Subscribe>(&self, subscriber: &Arc<S>) -> Result<(), BusError> {
        self.core.unregister(subscriber)
    }

    /// Delivers `event` to every matching handler on the calling thread.
    pub fn post<E: Event>(&self, event: &E) -> Result<(), BusError> {
        let matched = self.core.resolve::<E>();
        let mut failures = Vec::new();

        for m in &matched {
            if let Err(failure) = self.core.invoke_unwinding(m, event) {
                self.core.report(&failure);
                match self.core.on_failure() {
                    FailurePolicy::Propagate => return Err(BusError::HandlerFailed(Box::new(failure))),
                    FailurePolicy::Continue => failures.push(failure),
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(BusError::HandlersFailed { failures })
        }
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

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("identifier", &self.identifier())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
