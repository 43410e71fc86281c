use std::sync::Arc;

use crate::executors::Executor;
use crate::observers::ObserveFailures;

use super::async_bus::AsyncEventBus;
use super::bus::EventBus;
use super::config::{BusConfig, FailurePolicy};

/// Builder for either bus discipline.
#[derive(Debug, Default)]
pub struct BusBuilder {
    cfg: BusConfig,
}

impl BusBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration.
    pub fn from_config(cfg: BusConfig) -> Self {
        Self { cfg }
    }

    /// Sets the bus name used in logs and failure reports.
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.cfg.identifier = identifier.into();
        self
    }

    /// Sets the synchronous failure policy.
    pub fn on_failure(mut self, policy: FailurePolicy) -> Self {
        self.cfg.on_failure = policy;
        self
    }

    /// Adds a failure observer (after the built-in `LogWriter`).
    pub fn with_observer(mut self, observer: Arc<dyn ObserveFailures>) -> Self {
        self.cfg.observers.push(observer);
        self
    }

    /// Adds several failure observers, keeping their order.
    pub fn with_observers(mut self, observers: Vec<Arc<dyn ObserveFailures>>) -> Self {
        self.cfg.observers.extend(observers);
        self
    }

    /// Builds a synchronous bus.
    pub fn build(self) -> EventBus {
        EventBus::with_config(self.cfg)
    }

    /// Builds an asynchronous bus delivering on `executor`.
    pub fn build_async(self, executor: impl Executor) -> AsyncEventBus {
        AsyncEventBus::with_config(self.cfg, executor)
    }
}
