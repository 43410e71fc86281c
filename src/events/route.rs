//! # Type-erased upcasts from a posted event to a handler's parameter type.
//!
//! A [`Route`] knows how to turn a concrete event (seen as `&dyn Any`) into the
//! `&T` a handler declared for `T` expects, and to call that handler.
//!
//! ```text
//! &dyn Any ──downcast──► &E ──cast──► &T ──► Callback<T>
//!                             (Direct)
//! &dyn Any ──downcast──► &E ──cast──► &P ──► inner Route (P ──► ... ──► T)
//!                             (Rebase)
//! ```
//!
//! Handlers are stored erased as `Box<dyn Any>` holding a [`Callback<T>`]; the
//! route recovers it with `downcast_ref`. Both sides name the same `Callback<T>`
//! type, so the downcast only fails if the registry pairs a route with a
//! subscription of another key.

use std::any::Any;
use std::sync::Arc;

use crate::error::HandlerResult;

/// Handler callable bound to its owner, accepting the declared parameter type.
pub(crate) type Callback<T> = Arc<dyn Fn(&T) -> HandlerResult + Send + Sync>;

/// Erased path from a concrete event type to one assignable type.
pub(crate) trait Route: Send + Sync {
    /// Delivers `event` to `callback`.
    ///
    /// Returns `None` when either argument is not of the expected type.
    fn deliver(&self, event: &dyn Any, callback: &dyn Any) -> Option<HandlerResult>;
}

/// One-step upcast `E -> T`.
pub(crate) struct Direct<E, T: ?Sized + 'static> {
    cast: fn(&E) -> &T,
}

impl<E, T: ?Sized + 'static> Direct<E, T> {
    pub(crate) fn new(cast: fn(&E) -> &T) -> Self {
        Self { cast }
    }
}

impl<E: 'static, T: ?Sized + 'static> Route for Direct<E, T> {
    fn deliver(&self, event: &dyn Any, callback: &dyn Any) -> Option<HandlerResult> {
        let event = event.downcast_ref::<E>()?;
        let callback = callback.downcast_ref::<Callback<T>>()?;
        Some(callback((self.cast)(event)))
    }
}

/// Upcast `E -> P` followed by a route declared for `P`.
pub(crate) struct Rebase<E, P> {
    cast: fn(&E) -> &P,
    inner: Arc<dyn Route>,
}

impl<E, P> Rebase<E, P> {
    pub(crate) fn new(cast: fn(&E) -> &P, inner: Arc<dyn Route>) -> Self {
        Self { cast, inner }
    }
}

impl<E: 'static, P: 'static> Route for Rebase<E, P> {
    fn deliver(&self, event: &dyn Any, callback: &dyn Any) -> Option<HandlerResult> {
        let event = event.downcast_ref::<E>()?;
        let parent: &P = (self.cast)(event);
        self.inner.deliver(parent, callback)
    }
}
