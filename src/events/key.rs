//! # Type descriptors used as dispatch keys.
//!
//! [`TypeKey`] pairs a [`TypeId`] with its `type_name` so the registry can index
//! subscriptions by type and still print something readable in logs. Equality,
//! ordering and hashing only look at the `TypeId`.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Descriptor of a (possibly unsized) `'static` type.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Descriptor of `T`. Works for trait objects (`dyn Trait`) as well as sized types.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying [`TypeId`].
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name (diagnostics only; not guaranteed stable).
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// True if this descriptor was built for `T`.
    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeKey").field(&self.name).finish()
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
