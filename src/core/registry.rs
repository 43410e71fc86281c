//! # Subscriber registry.
//!
//! Indexes subscriptions by their declared parameter type and groups them by
//! owner so `unregister` can remove exactly one object's handlers.
//!
//! ## Architecture
//! ```text
//! Index
//!   by_type:  TypeKey ──► [Subscription, Subscription, ...]   (registration order)
//!   by_owner: OwnerId ──► [Subscription, ...]                 (declaration order)
//! ```
//!
//! ## Rules
//! - `insert`/`remove` take the write lock and mutate both maps together;
//!   readers never observe a half-applied change.
//! - Lookups share the read lock and do not block each other.
//! - A type key never maps to an empty list: the key is dropped with its last entry.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::events::TypeKey;
use crate::subscribers::{OwnerId, Subscription};

#[derive(Default)]
struct Index {
    by_type: HashMap<TypeKey, Vec<Arc<Subscription>>>,
    by_owner: HashMap<OwnerId, Vec<Arc<Subscription>>>,
}

/// Thread-safe subscription index.
#[derive(Default)]
pub(crate) struct Registry {
    index: RwLock<Index>,
}

/// Consistent read view over the index.
pub(crate) struct Snapshot<'a> {
    index: RwLockReadGuard<'a, Index>,
}

impl Snapshot<'_> {
    /// Subscriptions declared for `key`, in registration order.
    pub(crate) fn subscriptions(&self, key: &TypeKey) -> &[Arc<Subscription>] {
        self.index.by_type.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds all subscriptions of `owner`.
    ///
    /// Returns `false` (and changes nothing) if the owner is already registered.
    pub(crate) fn insert(&self, owner: OwnerId, subscriptions: Vec<Subscription>) -> bool {
        let mut guard = self.index.write();
        let index = &mut *guard;
        let Entry::Vacant(slot) = index.by_owner.entry(owner) else {
            return false;
        };

        let subscriptions: Vec<Arc<Subscription>> = subscriptions.into_iter().map(Arc::new).collect();
        for sub in &subscriptions {
            index
                .by_type
                .entry(sub.event_type())
                .or_default()
                .push(Arc::clone(sub));
        }
        slot.insert(subscriptions);
        true
    }

    /// Removes every subscription of `owner`, pruning emptied type keys.
    ///
    /// Returns the removed subscriptions, or `None` if the owner is unknown.
    pub(crate) fn remove(&self, owner: OwnerId) -> Option<Vec<Arc<Subscription>>> {
        let mut guard = self.index.write();
        let index = &mut *guard;
        let removed = index.by_owner.remove(&owner)?;

        for sub in &removed {
            if let Entry::Occupied(mut entry) = index.by_type.entry(sub.event_type()) {
                entry.get_mut().retain(|s| s.id() != sub.id());
                if entry.get().is_empty() {
                    entry.remove();
                }
            }
        }
        Some(removed)
    }

    /// Takes a read view for a multi-key lookup.
    pub(crate) fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            index: self.index.read(),
        }
    }

    pub(crate) fn contains(&self, owner: OwnerId) -> bool {
        self.index.read().by_owner.contains_key(&owner)
    }

    pub(crate) fn owners(&self) -> usize {
        self.index.read().by_owner.len()
    }

    pub(crate) fn subscriptions(&self, key: &TypeKey) -> Vec<Arc<Subscription>> {
        self.snapshot().subscriptions(key).to_vec()
    }

    /// Keys currently present, sorted by type name.
    pub(crate) fn types(&self) -> Vec<TypeKey> {
        let mut keys: Vec<TypeKey> = self.index.read().by_type.keys().copied().collect();
        keys.sort_unstable_by_key(|k| k.name());
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscribers::HandlerId;

    fn owner(n: usize) -> OwnerId {
        let arc = Arc::new(n);
        let id = OwnerId::of(&arc);
        // keep the allocation alive so ids stay distinct within the test
        std::mem::forget(arc);
        id
    }

    fn sub<T: ?Sized + 'static>(owner: OwnerId, slot: usize, method: &'static str) -> Subscription {
        Subscription::new(
            HandlerId::new(owner, slot),
            "test",
            method,
            TypeKey::of::<T>(),
            false,
            Box::new(()),
        )
    }

    #[test]
    fn test_insert_indexes_by_type_in_order() {
        let reg = Registry::new();
        let a = owner(1);
        let b = owner(2);
        assert!(reg.insert(a, vec![sub::<String>(a, 0, "a0"), sub::<String>(a, 1, "a1")]));
        assert!(reg.insert(b, vec![sub::<String>(b, 0, "b0"), sub::<u32>(b, 1, "b1")]));

        let methods: Vec<_> = reg
            .subscriptions(&TypeKey::of::<String>())
            .iter()
            .map(|s| s.method())
            .collect();
        assert_eq!(methods, vec!["a0", "a1", "b0"]);
        assert_eq!(reg.subscriptions(&TypeKey::of::<u32>()).len(), 1);
        assert_eq!(reg.owners(), 2);
    }

    #[test]
    fn test_duplicate_owner_is_ignored() {
        let reg = Registry::new();
        let a = owner(1);
        assert!(reg.insert(a, vec![sub::<String>(a, 0, "a0")]));
        assert!(!reg.insert(a, vec![sub::<String>(a, 0, "a0")]));
        assert_eq!(reg.subscriptions(&TypeKey::of::<String>()).len(), 1);
    }

    #[test]
    fn test_remove_prunes_empty_keys() {
        let reg = Registry::new();
        let a = owner(1);
        let b = owner(2);
        reg.insert(a, vec![sub::<u32>(a, 0, "ints")]);
        reg.insert(b, vec![sub::<String>(b, 0, "strings")]);

        let removed = reg.remove(b).expect("registered");
        assert_eq!(removed.len(), 1);
        assert_eq!(reg.types(), vec![TypeKey::of::<u32>()]);
        assert!(!reg.contains(b));
        assert!(reg.contains(a));
        assert!(reg.remove(b).is_none());
    }
}
