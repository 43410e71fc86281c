//! # Failure observers.
//!
//! A handler failure must never disappear silently. Every failure the bus sees
//! (an `Err` returned by a handler, or a panic caught on a worker) is passed to
//! each configured [`ObserveFailures`] implementation, after the built-in
//! [`LogWriter`](super::LogWriter).
//!
//! ```text
//! handler ──Err/panic──► HandlerFailure ──► LogWriter  (tracing::error!)
//!                                       ├──► Metrics   (user)
//!                                       └──► Alerts    (user)
//! ```
//!
//! ## Rules
//! - Observers run on the thread that saw the failure (publisher thread for the
//!   synchronous bus, a pool thread for the asynchronous one).
//! - A panicking observer is contained and logged; later observers still run.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use typebus::{HandlerFailure, ObserveFailures};
//!
//! #[derive(Default)]
//! struct FailureCounter(AtomicUsize);
//!
//! impl ObserveFailures for FailureCounter {
//!     fn on_failure(&self, _failure: &HandlerFailure) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//!
//!     fn name(&self) -> &'static str { "failure-counter" }
//! }
//! ```

use crate::error::HandlerFailure;

/// Receiver of handler failures.
pub trait ObserveFailures: Send + Sync + 'static {
    /// Called once per failed handler invocation.
    fn on_failure(&self, failure: &HandlerFailure);

    /// Returns the observer name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
