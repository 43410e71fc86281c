//! Events: the [`Event`] trait, assignability tables and type keys.
//!
//! ## Contents
//! - [`Event`], [`AnyEvent`], [`Supertypes`] what can be posted and what it is assignable to
//! - [`TypeKey`] dispatch key (a `TypeId` with a readable name)
//! - `route` (internal) erased upcasts from a concrete event to a handler's parameter type
//!
//! ## Quick reference
//! ```text
//! post(&Login) ──► Lineage::of::<Login>() ──► [Login, dyn Audited, dyn Event]
//!                       (cached per type)          │
//!                                                  └─► registry lookup per key
//! ```

mod event;
mod key;
pub(crate) mod route;

pub(crate) use event::Lineage;
pub use event::{AnyEvent, Event, Supertypes};
pub use key::TypeKey;
