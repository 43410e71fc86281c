//! Bus core: registry, resolution, guarded delivery.
//!
//! This module contains the embedded implementation of both bus disciplines.
//! The public API from this module is [`EventBus`], [`AsyncEventBus`],
//! [`BusBuilder`] and the configuration types.
//!
//! Internal modules:
//! - [`registry`]: subscription index by parameter type and by owner;
//! - [`resolver`]: assignability tables and per-event lookup;
//! - [`guard`]: per-handler mutual exclusion;
//! - [`dispatcher`]: shared state, invocation and failure reporting;
//! - [`bus`] / [`async_bus`]: caller-thread and executor delivery.
//!
//! ```text
//! register(&Arc<S>) ──► Registry ◄── Resolver ◄── post(event)
//!                                        │
//!                                        ▼
//!                          HandlerLocks::run(handler body)
//!                        (caller thread │ executor job)
//! ```

mod async_bus;
mod builder;
mod bus;
mod config;
mod dispatcher;
mod guard;
mod registry;
mod resolver;

pub use async_bus::AsyncEventBus;
pub use builder::BusBuilder;
pub use bus::EventBus;
pub use config::{BusConfig, FailurePolicy};
