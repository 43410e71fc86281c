//! # Dispatch resolver.
//!
//! Turns a posted event's concrete type into the list of subscriptions that
//! accept it, each paired with the route that upcasts the event to the
//! subscription's parameter type.
//!
//! ```text
//! resolve::<Login>()
//!   lineage (cached): [Login, dyn Audited, dyn Event]
//!   registry view:     Login      ──► [audit.on_login]
//!                      dyn Audited ──► [trail.on_audited, trail2.on_audited]
//!                      dyn Event   ──► [metrics.on_any]
//!   result: grouped by lineage order, registration order within a key
//! ```

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::events::route::Route;
use crate::events::{Event, Lineage, TypeKey};
use crate::subscribers::Subscription;

use super::registry::Registry;

/// One subscription selected for a posted event.
#[derive(Clone)]
pub(crate) struct Matched {
    pub(crate) subscription: Arc<Subscription>,
    pub(crate) route: Arc<dyn Route>,
}

/// Per-event-type cache of assignability tables.
#[derive(Default)]
pub(crate) struct Resolver {
    lineages: RwLock<HashMap<TypeId, Arc<Lineage>>>,
}

impl Resolver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Assignability table of `E`, computed on first use.
    pub(crate) fn lineage<E: Event>(&self) -> Arc<Lineage> {
        let id = TypeId::of::<E>();
        if let Some(lineage) = self.lineages.read().get(&id) {
            return Arc::clone(lineage);
        }
        let built = Arc::new(Lineage::of::<E>());
        Arc::clone(self.lineages.write().entry(id).or_insert(built))
    }

    /// Subscriptions whose parameter type `E` is assignable to.
    ///
    /// Every key is read from the same registry view.
    pub(crate) fn resolve<E: Event>(&self, registry: &Registry) -> Vec<Matched> {
        let lineage = self.lineage::<E>();
        let view = registry.snapshot();
        let mut matched = Vec::new();
        for (key, route) in lineage.entries() {
            matched.extend(view.subscriptions(key).iter().map(|sub| Matched {
                subscription: Arc::clone(sub),
                route: Arc::clone(route),
            }));
        }
        matched
    }

    pub(crate) fn assignable_types<E: Event>(&self) -> Vec<TypeKey> {
        self.lineage::<E>().keys()
    }
}
