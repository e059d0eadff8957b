//! Runtime identity for the concrete type a handle holds.

use core::{
    any::TypeId,
    hash::{Hash, Hasher},
};

/// Opaque identity of a concrete payload type, stable for the process
/// lifetime.
///
/// A descriptor pairs the type's [`TypeId`] with its
/// [`type_name`](core::any::type_name) for diagnostics. Equality and hashing
/// are defined **by id only**: type-name strings are not guaranteed unique
/// and play no part in comparisons.
///
/// # Examples
///
/// ```
/// use protean::{TypeDescriptor, Value};
///
/// let value = Value::new(42i64);
/// let descriptor = value.type_descriptor()?;
/// assert_eq!(descriptor, TypeDescriptor::of::<i64>());
/// assert_ne!(descriptor, TypeDescriptor::of::<u64>());
/// # Ok::<(), protean::ValueError>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
}

impl TypeDescriptor {
    /// Returns the descriptor of the type `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: core::any::type_name::<T>(),
        }
    }

    /// Builds a descriptor from a holder's vtable entries.
    pub(crate) fn from_parts(id: TypeId, name: &'static str) -> Self {
        Self { id, name }
    }

    /// Returns the [`TypeId`] this descriptor identifies.
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the diagnostic name of the described type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl core::fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_by_id() {
        assert_eq!(TypeDescriptor::of::<i64>(), TypeDescriptor::of::<i64>());
        assert_ne!(TypeDescriptor::of::<i64>(), TypeDescriptor::of::<u64>());
        assert_ne!(
            TypeDescriptor::of::<alloc::string::String>(),
            TypeDescriptor::of::<&'static str>()
        );
    }

    #[test]
    fn name_is_diagnostic() {
        assert!(TypeDescriptor::of::<i64>().name().contains("i64"));
    }
}
