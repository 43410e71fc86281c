//! # Subscription: one registered handler.
//!
//! A [`Subscription`] binds an owner object, one handler method, the type the
//! method accepts and its concurrency flag. It is immutable once built.
//! Two subscriptions are equal iff they share the same [`HandlerId`]
//! (owner identity + declaration slot).

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::events::TypeKey;

/// Identity of a registered object: the address of its `Arc` allocation.
///
/// Stable while the bus holds the object (from `register` to `unregister`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct OwnerId(usize);

impl OwnerId {
    pub(crate) fn of<S>(owner: &Arc<S>) -> Self {
        Self(Arc::as_ptr(owner) as *const () as usize)
    }
}

/// Identity of one handler: owner + position of the method in its declaration list.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct HandlerId {
    owner: OwnerId,
    slot: usize,
}

impl HandlerId {
    pub(crate) fn new(owner: OwnerId, slot: usize) -> Self {
        Self { owner, slot }
    }

    /// Owner of this handler.
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Declaration slot within the owner.
    pub fn slot(&self) -> usize {
        self.slot
    }
}

/// Registry record for one handler method of one registered object.
pub struct Subscription {
    id: HandlerId,
    subscriber: &'static str,
    method: &'static str,
    event_type: TypeKey,
    concurrency_allowed: bool,
    callback: Box<dyn Any + Send + Sync>,
}

impl Subscription {
    pub(crate) fn new(
        id: HandlerId,
        subscriber: &'static str,
        method: &'static str,
        event_type: TypeKey,
        concurrency_allowed: bool,
        callback: Box<dyn Any + Send + Sync>,
    ) -> Self {
        Self {
            id,
            subscriber,
            method,
            event_type,
            concurrency_allowed,
            callback,
        }
    }

    /// Handler identity.
    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// Name of the owning subscriber.
    pub fn subscriber(&self) -> &'static str {
        self.subscriber
    }

    /// Handler method name.
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// Declared parameter type; the dispatch key.
    pub fn event_type(&self) -> TypeKey {
        self.event_type
    }

    /// True if invocations of this handler may overlap.
    pub fn concurrency_allowed(&self) -> bool {
        self.concurrency_allowed
    }

    /// Erased `Callback<T>` for `T = event_type`.
    pub(crate) fn callback(&self) -> &(dyn Any + Send + Sync) {
        self.callback.as_ref()
    }
}

impl PartialEq for Subscription {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Subscription {}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("subscriber", &self.subscriber)
            .field("method", &self.method)
            .field("event_type", &self.event_type)
            .field("concurrency_allowed", &self.concurrency_allowed)
            .finish_non_exhaustive()
    }
}
