//! # Subscribers: objects owning handler methods.
//!
//! This module provides the [`Subscribe`] trait, the [`Handlers`] collector used to
//! declare handler methods, and the [`Subscription`] record the registry keeps per
//! handler.
//!
//! ## Architecture
//! ```text
//! register(&Arc<S>)
//!     │
//!     ├──► S::handlers(&mut Handlers<S>)        (type-level declaration)
//!     │         ├─ on("on_login", S::on_login)   ──► Subscription { Login, exclusive }
//!     │         └─ on_concurrent("on_any", ..)   ──► Subscription { dyn Event, concurrent }
//!     │
//!     └──► Registry (indexed by parameter type, grouped by owner)
//! ```

mod handlers;
mod subscribe;
mod subscription;

pub use handlers::{Handlers, Method, Signature};
pub use subscribe::Subscribe;
pub use subscription::{HandlerId, OwnerId, Subscription};
