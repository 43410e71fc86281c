//! # Events and their assignability table.
//!
//! Any `Send + Sync + Debug + 'static` type can be posted once it implements
//! [`Event`]. A handler declared for type `T` receives every posted event that is
//! *assignable* to `T`:
//!
//! - the event's own type;
//! - every type listed by [`Event::supertypes`] (trait objects play the role of
//!   interfaces, embedded structs the role of superclasses);
//! - transitively, everything listed by a parent added with [`Supertypes::inherit`];
//! - the root type [`AnyEvent`] (`dyn Event`), which every event is assignable to.
//!
//! The table is computed once per concrete event type and cached by the bus, so
//! publishing is a table lookup rather than a hierarchy walk.
//!
//! ## Example
//! ```rust
//! use typebus::{Event, Supertypes};
//!
//! trait Audited: Send + Sync {
//!     fn actor(&self) -> u64;
//! }
//! type AuditedEvent = dyn Audited;
//!
//! #[derive(Debug)]
//! struct Login { user: u64 }
//!
//! impl Audited for Login {
//!     fn actor(&self) -> u64 { self.user }
//! }
//!
//! impl Event for Login {
//!     fn supertypes(types: &mut Supertypes<Self>) {
//!         types.add::<AuditedEvent>(|e| e);
//!     }
//! }
//! ```
//!
//! ## Trait-object lifetimes
//! Handlers for a trait-object type must name the `'static` object type, e.g.
//! `&(dyn Audited + 'static)`. A type alias such as `type AuditedEvent = dyn Audited;`
//! defaults to `'static` and reads better in handler signatures; [`AnyEvent`] is
//! the alias for the root type.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::key::TypeKey;
use super::route::{Direct, Rebase, Route};

/// A value that can be posted to a bus.
pub trait Event: Any + Send + Sync + fmt::Debug {
    /// Declares the types this event is assignable to, besides itself and [`AnyEvent`].
    ///
    /// Called once per concrete type; the result is cached by the bus.
    fn supertypes(types: &mut Supertypes<Self>)
    where
        Self: Sized,
    {
        let _ = types;
    }
}

/// The root event type: a handler declared for `AnyEvent` receives every event.
pub type AnyEvent = dyn Event;

/// Collector for the types an event `E` is assignable to.
///
/// Entries keep declaration order; a type reachable by two paths is kept once
/// (the first declaration wins).
pub struct Supertypes<E> {
    entries: Vec<(TypeKey, Arc<dyn Route>)>,
    _event: PhantomData<fn(&E)>,
}

impl<E: Event> Supertypes<E> {
    /// `E` itself plus everything `E::supertypes` declares (no root).
    pub(crate) fn declared() -> Self {
        let mut types = Self {
            entries: Vec::new(),
            _event: PhantomData,
        };
        types.add::<E>(identity::<E>);
        E::supertypes(&mut types);
        types
    }

    /// Declares `E` assignable to `T` through `cast`.
    ///
    /// `T` is usually a trait object (`dyn Trait`) the event implements, or a
    /// field embedded in the event.
    pub fn add<T: ?Sized + 'static>(&mut self, cast: fn(&E) -> &T) -> &mut Self {
        self.push(TypeKey::of::<T>(), Arc::new(Direct::new(cast)));
        self
    }

    /// Declares `E` assignable to the event type `P` and to everything `P` is
    /// assignable to.
    pub fn inherit<P: Event>(&mut self, cast: fn(&E) -> &P) -> &mut Self {
        for (key, route) in Supertypes::<P>::declared().entries {
            self.push(key, Arc::new(Rebase::new(cast, route)));
        }
        self
    }

    /// Declared types, in dispatch order.
    pub fn keys(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    /// Number of declared types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was declared (never the case once `E` itself is listed).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, key: TypeKey, route: Arc<dyn Route>) {
        if !self.entries.iter().any(|(k, _)| *k == key) {
            self.entries.push((key, route));
        }
    }
}

/// Resolved assignability table of one concrete event type.
pub(crate) struct Lineage {
    entries: Vec<(TypeKey, Arc<dyn Route>)>,
}

impl Lineage {
    /// Self first, declared supertypes next, [`AnyEvent`] last.
    pub(crate) fn of<E: Event>() -> Self {
        let mut types = Supertypes::<E>::declared();
        types.add::<AnyEvent>(as_root::<E>);
        Self {
            entries: types.entries,
        }
    }

    pub(crate) fn entries(&self) -> &[(TypeKey, Arc<dyn Route>)] {
        &self.entries
    }

    pub(crate) fn keys(&self) -> Vec<TypeKey> {
        self.entries.iter().map(|(key, _)| *key).collect()
    }
}

fn identity<E>(event: &E) -> &E {
    event
}

fn as_root<E: Event>(event: &E) -> &AnyEvent {
    event
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Named: Send + Sync {
        fn label(&self) -> &str;
    }
    type NamedEvent = dyn Named;

    trait Tagged: Send + Sync {}
    type TaggedEvent = dyn Tagged;

    #[derive(Debug)]
    struct Base {
        label: String,
    }
    impl Named for Base {
        fn label(&self) -> &str {
            &self.label
        }
    }
    impl Event for Base {
        fn supertypes(types: &mut Supertypes<Self>) {
            types.add::<NamedEvent>(|e| e);
        }
    }

    #[derive(Debug)]
    struct Derived {
        base: Base,
    }
    impl Named for Derived {
        fn label(&self) -> &str {
            "derived"
        }
    }
    impl Tagged for Derived {}
    impl Event for Derived {
        fn supertypes(types: &mut Supertypes<Self>) {
            types
                .add::<TaggedEvent>(|e| e)
                .add::<NamedEvent>(|e| e)
                .inherit::<Base>(|e| &e.base);
        }
    }

    #[derive(Debug)]
    struct Plain;
    impl Event for Plain {}

    #[test]
    fn test_plain_event_has_self_and_root() {
        let keys = Lineage::of::<Plain>().keys();
        assert_eq!(keys, vec![TypeKey::of::<Plain>(), TypeKey::of::<AnyEvent>()]);
    }

    #[test]
    fn test_declaration_order_is_kept() {
        let keys = Lineage::of::<Base>().keys();
        assert_eq!(
            keys,
            vec![
                TypeKey::of::<Base>(),
                TypeKey::of::<NamedEvent>(),
                TypeKey::of::<AnyEvent>(),
            ]
        );
    }

    #[test]
    fn test_inherit_is_transitive_and_deduplicated() {
        let keys = Lineage::of::<Derived>().keys();
        assert_eq!(
            keys,
            vec![
                TypeKey::of::<Derived>(),
                TypeKey::of::<TaggedEvent>(),
                TypeKey::of::<NamedEvent>(),
                TypeKey::of::<Base>(),
                TypeKey::of::<AnyEvent>(),
            ],
            "Named reached through Base must collapse into the direct declaration"
        );
    }

    #[test]
    fn test_first_declaration_wins_on_diamond() {
        use crate::events::route::Callback;

        let lineage = Lineage::of::<Derived>();
        let (_, route) = lineage
            .entries()
            .iter()
            .find(|(key, _)| key.is::<NamedEvent>())
            .expect("named entry");

        let seen = Arc::new(std::sync::Mutex::new(String::new()));
        let sink = Arc::clone(&seen);
        let callback: Callback<NamedEvent> = Arc::new(move |e: &NamedEvent| {
            *sink.lock().unwrap() = e.label().to_string();
            Ok(())
        });
        let boxed: Box<dyn Any + Send + Sync> = Box::new(callback);
        let event = Derived {
            base: Base {
                label: "base".into(),
            },
        };
        assert!(matches!(route.deliver(&event, &*boxed), Some(Ok(()))));
        assert_eq!(*seen.lock().unwrap(), "derived");
    }

    #[test]
    fn test_supertypes_keys_exclude_root() {
        let declared = Supertypes::<Base>::declared();
        assert_eq!(declared.len(), 2);
        assert!(declared.keys().all(|k| !k.is::<AnyEvent>()));
    }
}
