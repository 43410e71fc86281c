//! # Dispatcher: state and delivery logic shared by both buses.
//!
//! Owns the [`Registry`], the [`Resolver`] cache, the [`HandlerLocks`] table and
//! the failure observers. The two bus types only decide *where* `invoke` runs.
//!
//! ```text
//! EventBus::post ───────┐                  ┌──► invoke (caller thread)
//!                       ├──► resolve ──────┤
//! AsyncEventBus::post ──┘                  └──► Job ──► invoke_isolated (worker)
//!
//! invoke = HandlerLocks::run(subscription, route.deliver(event, callback))
//! ```

use std::any::type_name;
use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};
use std::sync::Arc;

use tracing::{debug, error};

use crate::error::{BusError, FailureCause, HandlerFailure, panic_message};
use crate::events::{Event, TypeKey};
use crate::observers::{LogWriter, ObserveFailures};
use crate::subscribers::{Handlers, OwnerId, Subscribe, Subscription};

use super::config::{BusConfig, FailurePolicy};
use super::guard::HandlerLocks;
use super::registry::Registry;
use super::resolver::{Matched, Resolver};

pub(crate) struct Dispatcher {
    identifier: Arc<str>,
    on_failure: FailurePolicy,
    registry: Registry,
    resolver: Resolver,
    locks: HandlerLocks,
    observers: Vec<Arc<dyn ObserveFailures>>,
}

impl Dispatcher {
    pub(crate) fn new(cfg: BusConfig) -> Self {
        let mut observers: Vec<Arc<dyn ObserveFailures>> = Vec::with_capacity(cfg.observers.len() + 1);
        observers.push(Arc::new(LogWriter::new()));
        observers.extend(cfg.observers);

        Self {
            identifier: Arc::from(cfg.identifier),
            on_failure: cfg.on_failure,
            registry: Registry::new(),
            resolver: Resolver::new(),
            locks: HandlerLocks::new(),
            observers,
        }
    }

    pub(crate) fn identifier(&self) -> &str {
        &self.identifier
    }

    pub(crate) fn on_failure(&self) -> FailurePolicy {
        self.on_failure
    }

    /// Declares, validates and indexes the handlers of `subscriber`.
    ///
    /// Registering an object that is already registered is a no-op.
    pub(crate) fn register<S: Subscribe>(&self, subscriber: &Arc<S>) -> Result<(), BusError> {
        let name = subscriber.name();
        let mut handlers = Handlers::new();
        S::handlers(&mut handlers);

        let subscriptions = handlers.bind(subscriber, name).inspect_err(|e| {
            debug!(bus = %self.identifier, subscriber = name, error = %e, "registration rejected");
        })?;
        let count = subscriptions.len();

        if self.registry.insert(OwnerId::of(subscriber), subscriptions) {
            debug!(bus = %self.identifier, subscriber = name, handlers = count, "subscriber registered");
        } else {
            debug!(bus = %self.identifier, subscriber = name, "subscriber already registered");
        }
        Ok(())
    }

    /// Removes every handler of `subscriber` and reclaims idle handler locks.
    pub(crate) fn unregister<S: Subscribe>(&self, subscriber: &Arc<S>) -> Result<(), BusError> {
        let name = subscriber.name();
        let removed = self
            .registry
            .remove(OwnerId::of(subscriber))
            .ok_or(BusError::ObjectNotRegistered { subscriber: name })?;

        self.locks.sweep(|id| self.registry.contains(id.owner()));
        debug!(bus = %self.identifier, subscriber = name, handlers = removed.len(), "subscriber unregistered");
        Ok(())
    }

    pub(crate) fn resolve<E: Event>(&self) -> Vec<Matched> {
        let matched = self.resolver.resolve::<E>(&self.registry);
        if matched.is_empty() {
            debug!(bus = %self.identifier, event_type = type_name::<E>(), "no subscribers; event dropped");
        } else {
            debug!(bus = %self.identifier, event_type = type_name::<E>(), handlers = matched.len(), "dispatching");
        }
        matched
    }

    /// Runs one handler under its guard. Panics propagate.
    pub(crate) fn invoke<E: Event>(&self, matched: &Matched, event: &E) -> Result<(), HandlerFailure> {
        let sub = &matched.subscription;
        let outcome = self.locks.run(
            sub,
            |id| self.registry.contains(id.owner()),
            || matched.route.deliver(event, sub.callback()),
        );

        match outcome {
            Some(Ok(())) => Ok(()),
            Some(Err(error)) => Err(self.failure(sub, event, FailureCause::Error(error))),
            None => {
                let msg = format!("{} handler cannot accept {}", sub.event_type(), type_name::<E>());
                Err(self.failure(sub, event, FailureCause::Error(msg.into())))
            }
        }
    }

    /// Runs one handler on the caller's thread.
    ///
    /// A panic is reported to the observers and then resumed, so it still
    /// reaches the poster.
    pub(crate) fn invoke_unwinding<E: Event>(&self, matched: &Matched, event: &E) -> Result<(), HandlerFailure> {
        match catch_unwind(AssertUnwindSafe(|| self.invoke(matched, event))) {
            Ok(outcome) => outcome,
            Err(panic) => {
                let failure = self.failure(
                    &matched.subscription,
                    event,
                    FailureCause::Panicked(panic_message(panic.as_ref())),
                );
                self.report(&failure);
                resume_unwind(panic)
            }
        }
    }

    /// Reports a delivery the executor dropped before the handler ran.
    pub(crate) fn abandoned<E: Event>(&self, matched: &Matched, event: &E, executor: &'static str) {
        let failure = self.failure(&matched.subscription, event, FailureCause::Abandoned { executor });
        self.report(&failure);
    }

    /// Runs one handler on a worker: errors and panics end up at the observers.
    pub(crate) fn invoke_isolated<E: Event>(&self, matched: &Matched, event: &E) {
        let failure = match catch_unwind(AssertUnwindSafe(|| self.invoke(matched, event))) {
            Ok(Ok(())) => return,
            Ok(Err(failure)) => failure,
            Err(panic) => self.failure(
                &matched.subscription,
                event,
                FailureCause::Panicked(panic_message(panic.as_ref())),
            ),
        };
        self.report(&failure);
    }

    /// Hands `failure` to every observer; a panicking observer does not stop the rest.
    pub(crate) fn report(&self, failure: &HandlerFailure) {
        for observer in &self.observers {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| observer.on_failure(failure))) {
                error!(
                    bus = %self.identifier,
                    observer = observer.name(),
                    panic = %panic_message(panic.as_ref()),
                    "failure observer panicked"
                );
            }
        }
    }

    fn failure<E: Event>(&self, sub: &Subscription, event: &E, cause: FailureCause) -> HandlerFailure {
        HandlerFailure::new(
            Arc::clone(&self.identifier),
            sub.subscriber(),
            sub.method(),
            type_name::<E>(),
            format!("{event:?}"),
            cause,
        )
    }

    // ---------------------------
    // Introspection
    // ---------------------------

    pub(crate) fn is_registered<S>(&self, subscriber: &Arc<S>) -> bool {
        self.registry.contains(OwnerId::of(subscriber))
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.registry.owners()
    }

    pub(crate) fn subscriptions_for<T: ?Sized + 'static>(&self) -> Vec<Arc<Subscription>> {
        self.registry.subscriptions(&TypeKey::of::<T>())
    }

    pub(crate) fn registered_types(&self) -> Vec<TypeKey> {
        self.registry.types()
    }

    pub(crate) fn has_subscribers<E: Event>(&self) -> bool {
        !self.resolver.resolve::<E>(&self.registry).is_empty()
    }

    pub(crate) fn assignable_types<E: Event>(&self) -> Vec<TypeKey> {
        self.resolver.assignable_types::<E>()
    }

    #[cfg(test)]
    pub(crate) fn handler_locks(&self) -> usize {
        self.locks.len()
    }
}
