//! # Handler declarations.
//!
//! [`Handlers`] collects the handler methods a [`Subscribe`](super::Subscribe)
//! type declares. Any function shaped `Fn(&S, ..params) -> HandlerResult` can be
//! declared; [`Method`] classifies it by arity so that methods with zero or
//! several event parameters are rejected at `register` time, not silently
//! ignored.
//!
//! ```text
//! h.on("on_login", Self::on_login)        // Fn(&S, &Login)            -> subscription keyed by Login
//! h.on_concurrent("on_any", Self::on_any) // Fn(&S, &AnyEvent)         -> keyed by dyn Event, may overlap
//! h.on("broken", Self::broken)            // Fn(&S, &Login, &Logout)   -> InvalidHandlerSignature
//! ```

use std::any::Any;
use std::sync::Arc;

use crate::error::{BusError, HandlerResult};
use crate::events::TypeKey;
use crate::events::route::Callback;

use super::subscription::{HandlerId, OwnerId, Subscription};

/// A function usable as a handler method of `S`.
///
/// Implemented for `Fn(&S) -> HandlerResult`, `Fn(&S, &E) -> HandlerResult`,
/// `Fn(&S, &A, &B) -> HandlerResult` and `Fn(&S, &A, &B, &C) -> HandlerResult`;
/// the `Params` marker only exists to keep those implementations apart.
/// Only the one-parameter form registers successfully.
pub trait Method<S, Params>: Send + Sync + 'static {
    #[doc(hidden)]
    fn into_signature(self) -> Signature<S>;
}

/// Opaque, classified form of a declared method.
pub struct Signature<S>(Shape<S>);

type Binder<S> = Box<dyn FnOnce(Arc<S>) -> Box<dyn Any + Send + Sync> + Send>;

enum Shape<S> {
    Unary { event_type: TypeKey, bind: Binder<S> },
    Invalid { params: usize },
}

impl<S, F> Method<S, fn()> for F
where
    S: Send + Sync + 'static,
    F: Fn(&S) -> HandlerResult + Send + Sync + 'static,
{
    fn into_signature(self) -> Signature<S> {
        Signature(Shape::Invalid { params: 0 })
    }
}

impl<S, E, F> Method<S, fn(&E)> for F
where
    S: Send + Sync + 'static,
    E: ?Sized + 'static,
    F: Fn(&S, &E) -> HandlerResult + Send + Sync + 'static,
{
    fn into_signature(self) -> Signature<S> {
        let method = self;
        let bind: Binder<S> = Box::new(move |owner: Arc<S>| {
            let callback: Callback<E> = Arc::new(move |event: &E| method(&*owner, event));
            Box::new(callback) as Box<dyn Any + Send + Sync>
        });
        Signature(Shape::Unary {
            event_type: TypeKey::of::<E>(),
            bind,
        })
    }
}

impl<S, A, B, F> Method<S, fn(&A, &B)> for F
where
    S: Send + Sync + 'static,
    A: ?Sized + 'static,
    B: ?Sized + 'static,
    F: Fn(&S, &A, &B) -> HandlerResult + Send + Sync + 'static,
{
    fn into_signature(self) -> Signature<S> {
        Signature(Shape::Invalid { params: 2 })
    }
}

impl<S, A, B, C, F> Method<S, fn(&A, &B, &C)> for F
where
    S: Send + Sync + 'static,
    A: ?Sized + 'static,
    B: ?Sized + 'static,
    C: ?Sized + 'static,
    F: Fn(&S, &A, &B, &C) -> HandlerResult + Send + Sync + 'static,
{
    fn into_signature(self) -> Signature<S> {
        Signature(Shape::Invalid { params: 3 })
    }
}

struct Declared<S> {
    name: &'static str,
    concurrency_allowed: bool,
    signature: Signature<S>,
}

/// Collector passed to [`Subscribe::handlers`](super::Subscribe::handlers).
pub struct Handlers<S> {
    declared: Vec<Declared<S>>,
}

impl<S: Send + Sync + 'static> Handlers<S> {
    pub(crate) fn new() -> Self {
        Self {
            declared: Vec::new(),
        }
    }

    /// Declares a handler whose invocations are mutually exclusive.
    pub fn on<P, M: Method<S, P>>(&mut self, name: &'static str, method: M) -> &mut Self {
        self.push(name, false, method.into_signature())
    }

    /// Declares a handler that may run concurrently with itself.
    pub fn on_concurrent<P, M: Method<S, P>>(&mut self, name: &'static str, method: M) -> &mut Self {
        self.push(name, true, method.into_signature())
    }

    /// Number of declared methods (valid or not).
    pub fn len(&self) -> usize {
        self.declared.len()
    }

    /// True if nothing was declared.
    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }

    /// Declared method names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.declared.iter().map(|d| d.name)
    }

    fn push(&mut self, name: &'static str, concurrency_allowed: bool, signature: Signature<S>) -> &mut Self {
        self.declared.push(Declared {
            name,
            concurrency_allowed,
            signature,
        });
        self
    }

    /// Validates every declaration and binds it to `owner`.
    ///
    /// All-or-nothing: the first invalid declaration fails the whole set.
    pub(crate) fn bind(self, owner: &Arc<S>, subscriber: &'static str) -> Result<Vec<Subscription>, BusError> {
        if self.declared.is_empty() {
            return Err(BusError::NoSubscriberMethods { subscriber });
        }
        if let Some((method, params)) = self.declared.iter().find_map(|d| match d.signature.0 {
            Shape::Invalid { params } => Some((d.name, params)),
            Shape::Unary { .. } => None,
        }) {
            return Err(BusError::InvalidHandlerSignature {
                subscriber,
                method,
                params,
            });
        }

        let owner_id = OwnerId::of(owner);
        let mut subscriptions = Vec::with_capacity(self.declared.len());
        for (slot, declared) in self.declared.into_iter().enumerate() {
            if let Shape::Unary { event_type, bind } = declared.signature.0 {
                subscriptions.push(Subscription::new(
                    HandlerId::new(owner_id, slot),
                    subscriber,
                    declared.name,
                    event_type,
                    declared.concurrency_allowed,
                    bind(Arc::clone(owner)),
                ));
            }
        }
        Ok(subscriptions)
    }
}
