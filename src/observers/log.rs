//! # LogWriter: failure logger
//!
//! The observer every bus starts with. Writes one `tracing` error record per
//! failed handler, with the handler identity and the triggering event as fields.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! ERROR typebus: handler failed bus="orders" subscriber="audit" method="on_login" event_type="app::Login" event=Login { user: 7 } cause=disk full
//! ERROR typebus: handler panicked bus="orders" subscriber="audit" method="on_login" event_type="app::Login" event=Login { user: 7 } cause=panicked: index out of bounds
//! ```

use tracing::error;

use crate::error::{FailureCause, HandlerFailure};

use super::ObserveFailures;

/// Failure observer backed by `tracing`.
#[derive(Default, Debug, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ObserveFailures for LogWriter {
    fn on_failure(&self, f: &HandlerFailure) {
        let message = match f.cause() {
            FailureCause::Panicked(_) => "handler panicked",
            FailureCause::Abandoned { .. } => "delivery abandoned",
            FailureCause::Error(_) => "handler failed",
        };
        error!(
            target: "typebus",
            bus = f.bus(),
            subscriber = f.subscriber(),
            method = f.method(),
            event_type = f.event_type(),
            event = f.event(),
            cause = %f.cause(),
            "{message}"
        );
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
