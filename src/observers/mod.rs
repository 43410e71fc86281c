//! Failure observers: where handler failures are reported.
//!
//! - [`ObserveFailures`]: extension point for custom reporting (metrics, alerts).
//! - [`LogWriter`]: always-on `tracing` reporter.

mod log;
mod observer;

pub use log::LogWriter;
pub use observer::ObserveFailures;
