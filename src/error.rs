//! Error types used by the typebus registry, dispatcher and executors.
//!
//! This module defines:
//!
//! - [`BusError`]: errors returned by bus operations (`register`, `unregister`, `post`).
//! - [`HandlerFailure`]: the carrier describing one failed handler invocation.
//! - [`FailureCause`]: what went wrong inside the handler body (error or panic).
//!
//! [`BusError`] provides `as_label` for logs/metrics, mirroring the labels used
//! by the failure observers.

use std::any::Any;
use std::sync::Arc;

use thiserror::Error;

/// Boxed error returned by handler bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Return type of every handler method.
pub type HandlerResult = Result<(), BoxError>;

/// # Errors produced by the event bus.
///
/// Registration errors leave the registry untouched. Dispatch errors are only
/// produced by the synchronous bus; the asynchronous bus reports handler
/// failures through its observers instead.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BusError {
    /// The registered object declares no handler methods.
    #[error("subscriber {subscriber} declares no handler methods")]
    NoSubscriberMethods {
        /// Subscriber name.
        subscriber: &'static str,
    },

    /// A declared handler method does not take exactly one event parameter.
    #[error("handler {subscriber}::{method} takes {params} parameters; exactly one is required")]
    InvalidHandlerSignature {
        /// Subscriber name.
        subscriber: &'static str,
        /// Offending method name.
        method: &'static str,
        /// Number of event parameters the method declares.
        params: usize,
    },

    /// `unregister` was called for an object the bus does not track.
    #[error("subscriber {subscriber} is not registered")]
    ObjectNotRegistered {
        /// Subscriber name.
        subscriber: &'static str,
    },

    /// A handler failed and the bus stopped delivering the event.
    #[error(transparent)]
    HandlerFailed(Box<HandlerFailure>),

    /// One or more handlers failed; every matched handler was still invoked.
    #[error("{} handlers failed during dispatch", .failures.len())]
    HandlersFailed {
        /// Failures in dispatch order.
        failures: Vec<HandlerFailure>,
    },

    /// The executor refused a delivery job (e.g. the pool was shut down).
    #[error("executor {executor} rejected job: {reason}")]
    ExecutorRejected {
        /// Executor name.
        executor: &'static str,
        /// Why the job was refused.
        reason: String,
    },

    /// A worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use typebus::BusError;
    ///
    /// let err = BusError::ObjectNotRegistered { subscriber: "audit" };
    /// assert_eq!(err.as_label(), "bus_object_not_registered");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::NoSubscriberMethods { .. } => "bus_no_subscriber_methods",
            BusError::InvalidHandlerSignature { .. } => "bus_invalid_handler_signature",
            BusError::ObjectNotRegistered { .. } => "bus_object_not_registered",
            BusError::HandlerFailed(_) => "bus_handler_failed",
            BusError::HandlersFailed { .. } => "bus_handlers_failed",
            BusError::ExecutorRejected { .. } => "bus_executor_rejected",
            BusError::WorkerSpawn(_) => "bus_worker_spawn",
        }
    }

    /// Returns the handler failures carried by this error (empty for other variants).
    pub fn failures(&self) -> &[HandlerFailure] {
        match self {
            BusError::HandlerFailed(failure) => std::slice::from_ref(failure.as_ref()),
            BusError::HandlersFailed { failures } => failures,
            _ => &[],
        }
    }
}

/// What went wrong inside a handler body.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum FailureCause {
    /// The handler returned an error.
    #[error("{0}")]
    Error(#[source] BoxError),

    /// The handler panicked.
    #[error("panicked: {0}")]
    Panicked(String),

    /// The executor dropped the delivery job without running it.
    #[error("delivery dropped by executor {executor} before the handler ran")]
    Abandoned {
        /// Executor name.
        executor: &'static str,
    },
}

/// One failed handler invocation.
///
/// Carries the handler identity and a rendering of the event that triggered it,
/// so the failure stays traceable after it leaves the dispatching thread.
#[derive(Error, Debug)]
#[error("handler {subscriber}::{method} failed on {event_type} (bus {bus}): {cause}")]
pub struct HandlerFailure {
    bus: Arc<str>,
    subscriber: &'static str,
    method: &'static str,
    event_type: &'static str,
    event: String,
    #[source]
    cause: FailureCause,
}

impl HandlerFailure {
    pub(crate) fn new(
        bus: Arc<str>,
        subscriber: &'static str,
        method: &'static str,
        event_type: &'static str,
        event: String,
        cause: FailureCause,
    ) -> Self {
        Self {
            bus,
            subscriber,
            method,
            event_type,
            event,
            cause,
        }
    }

    /// Identifier of the bus that dispatched the event.
    pub fn bus(&self) -> &str {
        &self.bus
    }

    /// Name of the subscriber owning the handler.
    pub fn subscriber(&self) -> &'static str {
        self.subscriber
    }

    /// Handler method name.
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// Runtime type name of the posted event.
    pub fn event_type(&self) -> &'static str {
        self.event_type
    }

    /// `Debug` rendering of the posted event.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// The underlying cause.
    pub fn cause(&self) -> &FailureCause {
        &self.cause
    }

    /// True if the handler panicked rather than returning an error.
    pub fn is_panic(&self) -> bool {
        matches!(self.cause, FailureCause::Panicked(_))
    }

    /// True if the handler never ran because its delivery job was dropped.
    pub fn is_abandoned(&self) -> bool {
        matches!(self.cause, FailureCause::Abandoned { .. })
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
