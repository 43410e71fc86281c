//! # Subscriber trait.
//!
//! [`Subscribe`] is the extension point for objects that want to receive events.
//! Instead of discovering annotated methods at runtime, a subscriber type
//! *declares* its handler methods once, in [`Subscribe::handlers`].
//!
//! ## Rules
//! - A type must declare at least one handler, otherwise `register` fails with
//!   [`BusError::NoSubscriberMethods`](crate::BusError::NoSubscriberMethods).
//! - Every handler must take exactly one event parameter, otherwise `register`
//!   fails with [`BusError::InvalidHandlerSignature`](crate::BusError::InvalidHandlerSignature).
//! - Declarations can live on a trait the subscriber implements: a provided trait
//!   function declaring `Self::method` is discovered like a method declared on
//!   the concrete type.
//!
//! ## Example
//! ```rust
//! use typebus::{Event, Handlers, HandlerResult, Subscribe};
//!
//! #[derive(Debug)]
//! struct Login { user: u64 }
//! impl Event for Login {}
//!
//! struct Audit;
//!
//! impl Audit {
//!     fn on_login(&self, e: &Login) -> HandlerResult {
//!         let _ = e.user;
//!         Ok(())
//!     }
//! }
//!
//! impl Subscribe for Audit {
//!     fn handlers(h: &mut Handlers<Self>) {
//!         h.on("on_login", Self::on_login);
//!     }
//!
//!     fn name(&self) -> &'static str { "audit" }
//! }
//! ```

use super::handlers::Handlers;

/// Object that owns handler methods.
pub trait Subscribe: Send + Sync + 'static {
    /// Declares the handler methods of this type.
    fn handlers(handlers: &mut Handlers<Self>)
    where
        Self: Sized;

    /// Returns the subscriber name used in logs and failure reports.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose; override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
