//! # Bus configuration.
//!
//! Provides [`BusConfig`], the settings shared by both delivery disciplines, and
//! [`FailurePolicy`], which decides what the synchronous bus does when a handler
//! fails part-way through a multi-handler dispatch.

use std::fmt;
use std::sync::Arc;

use crate::observers::ObserveFailures;

/// What the synchronous bus does after a handler returns an error.
///
/// The asynchronous bus ignores this setting: its handlers run independently and
/// failures only reach the observers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failing handler and return
    /// [`BusError::HandlerFailed`](crate::BusError::HandlerFailed).
    /// Handlers ordered after it do not see the event.
    #[default]
    Propagate,

    /// Invoke every matched handler, then return
    /// [`BusError::HandlersFailed`](crate::BusError::HandlersFailed) if any failed.
    Continue,
}

/// Configuration shared by [`EventBus`](crate::EventBus) and
/// [`AsyncEventBus`](crate::AsyncEventBus).
///
/// ## Field semantics
/// - `identifier`: bus name attached to every log record and failure report
/// - `on_failure`: synchronous failure policy (see [`FailurePolicy`])
/// - `observers`: failure observers, called after the built-in `LogWriter`
#[derive(Clone)]
pub struct BusConfig {
    /// Human-readable bus name.
    pub identifier: String,

    /// Synchronous failure policy.
    pub on_failure: FailurePolicy,

    /// Extra failure observers.
    pub observers: Vec<Arc<dyn ObserveFailures>>,
}

impl BusConfig {
    /// Default configuration with a custom identifier.
    #[must_use]
    pub fn named(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }
}

impl Default for BusConfig {
    /// - `identifier = "default"`
    /// - `on_failure = FailurePolicy::Propagate`
    /// - `observers = []` (the `LogWriter` is always installed)
    fn default() -> Self {
        Self {
            identifier: "default".to_string(),
            on_failure: FailurePolicy::default(),
            observers: Vec::new(),
        }
    }
}

impl fmt::Debug for BusConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let observers: Vec<&'static str> = self.observers.iter().map(|o| o.name()).collect();
        f.debug_struct("BusConfig")
            .field("identifier", &self.identifier)
            .field("on_failure", &self.on_failure)
            .field("observers", &observers)
            .finish()
    }
}
