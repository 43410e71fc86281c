//! # typebus
//!
//! **Typebus** is an in-process, typed publish/subscribe bus for Rust.
//!
//! Components register handler methods for event types; publishers post events
//! without knowing which handlers (if any) exist. A handler declared for a
//! broad type (a trait object, an embedded "parent" event, or the root
//! [`AnyEvent`]) receives every narrower event assignable to it.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  Subscriber  │   │  Subscriber  │   │  Subscriber  │
//!     │ (Arc<Audit>) │   │(Arc<Ledger>) │   │(Arc<Metrics>)│
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼ register         ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Registry                                                         │
//! │  - by_type:  TypeKey ──► [Subscription ...] (registration order)  │
//! │  - by_owner: OwnerId ──► [Subscription ...] (for unregister)      │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▲ lookup per assignable type
//!    post(event) ──► Resolver ───┘   (lineage cached per event type:
//!                       │             [Self, declared supertypes, dyn Event])
//!                       ▼
//!           ┌───────────┴────────────┐
//!           ▼                        ▼
//!       EventBus                AsyncEventBus
//!   (caller thread,          (one job per handler,
//!    sequential)              Executor: WorkerPool / TokioExecutor)
//!           │                        │
//!           └──────────┬─────────────┘
//!                      ▼
//!        HandlerLocks::run (exclusive handlers: one invocation at a time)
//!                      │
//!                      ▼
//!              handler(&owner, &T) ──Err/panic──► observers (LogWriter, ...)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                         |
//! |-------------------|--------------------------------------------------------------|--------------------------------------------|
//! | **Events**        | Postable values and their assignability tables.              | [`Event`], [`Supertypes`], [`AnyEvent`]    |
//! | **Subscribers**   | Objects declaring handler methods.                           | [`Subscribe`], [`Handlers`]                |
//! | **Buses**         | Caller-thread and executor delivery.                         | [`EventBus`], [`AsyncEventBus`]            |
//! | **Executors**     | Worker pools for the asynchronous bus.                       | [`Executor`], [`WorkerPool`]               |
//! | **Failures**      | Typed errors and failure observers.                          | [`BusError`], [`ObserveFailures`]          |
//! | **Configuration** | Bus identifier, failure policy, observers.                   | [`BusConfig`], [`BusBuilder`]              |
//!
//! ## Optional features
//! - `tokio` (default): exports [`TokioExecutor`], running jobs on a tokio blocking pool.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use typebus::{AnyEvent, Event, EventBus, HandlerResult, Handlers, Subscribe, Supertypes};
//!
//! trait Named: Send + Sync {
//!     fn name(&self) -> &str;
//! }
//! type NamedEvent = dyn Named;
//!
//! #[derive(Debug)]
//! struct UserCreated { name: String }
//!
//! impl Named for UserCreated {
//!     fn name(&self) -> &str { &self.name }
//! }
//!
//! impl Event for UserCreated {
//!     fn supertypes(types: &mut Supertypes<Self>) {
//!         types.add::<NamedEvent>(|e| e);
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Stats { named: AtomicUsize, any: AtomicUsize }
//!
//! impl Stats {
//!     fn on_named(&self, _: &NamedEvent) -> HandlerResult {
//!         self.named.fetch_add(1, Ordering::SeqCst);
//!         Ok(())
//!     }
//!     fn on_any(&self, _: &AnyEvent) -> HandlerResult {
//!         self.any.fetch_add(1, Ordering::SeqCst);
//!         Ok(())
//!     }
//! }
//!
//! impl Subscribe for Stats {
//!     fn handlers(h: &mut Handlers<Self>) {
//!         h.on("on_named", Self::on_named)
//!             .on_concurrent("on_any", Self::on_any);
//!     }
//!     fn name(&self) -> &'static str { "stats" }
//! }
//!
//! fn main() -> Result<(), typebus::BusError> {
//!     let bus = EventBus::builder().identifier("users").build();
//!     let stats = Arc::new(Stats::default());
//!     bus.register(&stats)?;
//!
//!     bus.post(&UserCreated { name: "ada".into() })?;
//!
//!     assert_eq!(stats.named.load(Ordering::SeqCst), 1);
//!     assert_eq!(stats.any.load(Ordering::SeqCst), 1);
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod executors;
mod observers;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{AsyncEventBus, BusBuilder, BusConfig, EventBus, FailurePolicy};
pub use error::{BoxError, BusError, FailureCause, HandlerFailure, HandlerResult};
pub use events::{AnyEvent, Event, Supertypes, TypeKey};
pub use executors::{Executor, Job, WorkerPool, WorkerPoolConfig};
pub use observers::{LogWriter, ObserveFailures};
pub use subscribers::{HandlerId, Handlers, Method, OwnerId, Signature, Subscribe, Subscription};

// Optional: tokio blocking-pool executor.
// Enabled by default; disable with `default-features = false`.
#[cfg(feature = "tokio")]
pub use executors::TokioExecutor;
