//! The polymorphic container handle.

use alloc::{string::String, vec::Vec};
use core::{any::TypeId, hash::Hash, hash::Hasher, marker::PhantomData};

use protean_internals::{RawValue, RawValueRef};

use crate::{
    TypeDescriptor, ValueError,
    handlers::{self, ValueHandler},
    intern::InternPool,
    markers::{AccessMarker, ReadOnly, ReadWrite},
    serialize::SerializationRegistry,
};

/// A reference-counted container holding one value of any concrete type.
///
/// `Value` is the main type of this library. A handle is either *empty* or
/// owns a share of exactly one type-erased holder; copies of a handle are
/// cheap regardless of the size of the held value, because only an atomic
/// reference count moves.
///
/// # Access Markers
///
/// The `Access` parameter controls what a handle may do:
///
/// - [`ReadWrite`] (default): unique owner; [`downcast_mut`] is available
///   but the handle cannot be cloned.
/// - [`ReadOnly`]: shared and immutable; [`Clone`] bumps the reference
///   count. Produced by [`into_read_only`] and by [`intern`].
///
/// # Common Usage
///
/// ```
/// use protean::Value;
///
/// let value = Value::new(42i64);
/// assert!(value.is::<i64>());
/// assert_eq!(value.downcast_ref::<i64>()?, &42);
/// assert!(value.downcast_ref::<u32>().is_err());
/// # Ok::<(), protean::ValueError>(())
/// ```
///
/// Equality, type queries and interning checks are *total*: they answer
/// `false` on empty handles and cross-type comparisons rather than failing.
///
/// ```
/// use protean::Value;
///
/// let a = Value::new(1i64);
/// let b = Value::new(1u32);
/// assert!(!a.content_eq(&b)); // same digits, different types
///
/// let empty: Value = Value::empty();
/// let other: Value = Value::default();
/// assert!(!a.content_eq(&empty));
/// assert!(empty.content_eq(&other));
/// ```
///
/// [`ReadWrite`]: crate::markers::ReadWrite
/// [`ReadOnly`]: crate::markers::ReadOnly
/// [`downcast_mut`]: Value::downcast_mut
/// [`into_read_only`]: Value::into_read_only
/// [`intern`]: Value::intern
#[repr(transparent)]
pub struct Value<Access: AccessMarker = ReadWrite> {
    /// The holder share, or `None` for the empty handle.
    ///
    /// # Safety
    ///
    /// The following invariants are upheld as long as this struct exists:
    ///
    /// 1. If `Access = ReadWrite`: this handle is the unique owner of the
    ///    holder; the strong count of the underlying `Arc` is exactly 1.
    /// 2. If `Access = ReadOnly`: all other references to the holder are
    ///    compatible with shared ownership (none assume a strong count
    ///    of 1).
    /// 3. The held value is `Send + Sync` (every constructor bounds it).
    raw: Option<RawValue>,
    _access: PhantomData<Access>,
}

// SAFETY: Every constructor of a non-empty handle requires the held value to
// be `Send + Sync`, and the holder's reference count is atomic.
unsafe impl<A: AccessMarker> Send for Value<A> {}

// SAFETY: Shared references to a handle only expose `&V` views of the held
// value, which is `Sync` by the construction bound; mutable views require
// `&mut Value<ReadWrite>`, which the borrow checker serializes.
unsafe impl<A: AccessMarker> Sync for Value<A> {}

impl<A: AccessMarker> Value<A> {
    /// Creates an empty handle.
    ///
    /// Two empty handles are [`content_eq`](Value::content_eq), and
    /// [`use_count`](Value::use_count) reports 0.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            raw: None,
            _access: PhantomData,
        }
    }

    /// Creates a handle from an optional raw holder.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. If `A = ReadWrite`: the holder's strong count is exactly 1 and no
    ///    other reference to it exists.
    /// 2. If `A = ReadOnly`: all other references to the holder are
    ///    compatible with shared ownership.
    /// 3. The held value is `Send + Sync`.
    pub(crate) unsafe fn from_raw(raw: Option<RawValue>) -> Self {
        Self {
            raw,
            _access: PhantomData,
        }
    }

    /// Creates a lifetime-bound [`RawValueRef`] to the holder, if any.
    pub(crate) fn as_raw_ref(&self) -> Option<RawValueRef<'_>> {
        self.raw.as_ref().map(RawValue::as_ref)
    }

    /// Returns `true` if this handle holds no value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_none()
    }

    /// Returns the descriptor of the held type.
    ///
    /// # Errors
    ///
    /// Fails with [`ValueError::EmptyContainer`] on an empty handle.
    pub fn type_descriptor(&self) -> Result<TypeDescriptor, ValueError> {
        let raw = self.as_raw_ref().ok_or(ValueError::EmptyContainer)?;
        Ok(TypeDescriptor::from_parts(
            raw.value_type_id(),
            raw.value_type_name(),
        ))
    }

    /// Returns `true` if this handle is non-empty and holds a `T`.
    ///
    /// This query is total; it never fails.
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.as_raw_ref()
            .is_some_and(|raw| raw.value_type_id() == TypeId::of::<T>())
    }

    /// Borrows the held value as a `&T`.
    ///
    /// This is a checked runtime downcast, not a reinterpretation.
    ///
    /// # Errors
    ///
    /// Fails with [`ValueError::EmptyContainer`] on an empty handle and
    /// [`ValueError::TypeMismatch`] if the held type is not `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Result<&T, ValueError> {
        let raw = self.as_raw_ref().ok_or(ValueError::EmptyContainer)?;
        if raw.value_type_id() != TypeId::of::<T>() {
            return Err(ValueError::TypeMismatch {
                requested: core::any::type_name::<T>(),
                actual: raw.value_type_name(),
            });
        }
        // SAFETY: The stored type id was checked above
        Ok(unsafe { raw.value_downcast_unchecked::<T>() })
    }

    /// Returns the number of live owners of the underlying holder.
    ///
    /// Empty handles report 0. Note that the intern pool is itself an
    /// owner: an interned handle reports at least 2 even when the caller
    /// holds what feels like the only reference.
    #[must_use]
    pub fn use_count(&self) -> usize {
        self.as_raw_ref().map_or(0, RawValueRef::strong_count)
    }

    /// Returns `true` if the caller holds the only reference.
    ///
    /// Equivalent to `use_count() == 1`; `false` for empty handles.
    #[must_use]
    pub fn unique(&self) -> bool {
        self.use_count() == 1
    }

    /// Compares the contents of two handles.
    ///
    /// Two handles are equal if both are empty, or both are non-empty, hold
    /// the same concrete type, and that type's handler considers the values
    /// equal. The operation is total: cross-type and empty/non-empty
    /// comparisons answer `false`, never an error.
    #[must_use]
    pub fn content_eq<B: AccessMarker>(&self, other: &Value<B>) -> bool {
        match (self.as_raw_ref(), other.as_raw_ref()) {
            (None, None) => true,
            (Some(a), Some(b)) => a.value_eq(b),
            _ => false,
        }
    }

    /// Feeds the handle's content into the hasher.
    ///
    /// Consistent with [`content_eq`](Value::content_eq): handles that
    /// compare equal hash identically. Used by the intern pool to
    /// fingerprint values; exposed so compound handlers (e.g. lists of
    /// handles) can hash their elements.
    pub fn content_hash(&self, state: &mut dyn Hasher) {
        match self.as_raw_ref() {
            None => state.write_u8(0),
            Some(raw) => {
                state.write_u8(1);
                let mut state = state;
                raw.value_type_id().hash(&mut state);
                raw.value_hash(state);
            }
        }
    }

    /// Returns `true` if both handles share the same holder allocation.
    ///
    /// Two empty handles are considered identical. This is the cheap
    /// comparison interning buys: canonical handles of equal content are
    /// `ptr_eq`.
    #[must_use]
    pub fn ptr_eq<B: AccessMarker>(&self, other: &Value<B>) -> bool {
        match (self.as_raw_ref(), other.as_raw_ref()) {
            (None, None) => true,
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Returns the canonical handle for this handle's content from the
    /// process-wide intern pool.
    ///
    /// The handle this is called on is never modified; the result is
    /// read-only because interned values are immutable. Interning is
    /// idempotent: interning an already-canonical handle returns the same
    /// holder. See [`InternPool::intern`] for details and
    /// [`InternPool::global`] for the pool's lifecycle.
    #[must_use]
    pub fn intern(&self) -> Value<ReadOnly> {
        InternPool::global().intern(self)
    }

    /// Returns `true` if this handle's holder is the current canonical
    /// entry for its content in the process-wide intern pool.
    ///
    /// This query is total; empty handles answer `false`.
    #[must_use]
    pub fn is_intern(&self) -> bool {
        InternPool::global().is_canonical(self)
    }

    /// Serializes the held value into the named wire format using the
    /// process-wide [`SerializationRegistry`].
    ///
    /// # Errors
    ///
    /// Fails with [`ValueError::EmptyContainer`] on an empty handle and
    /// [`ValueError::UnsupportedFormat`] if no codec is registered for the
    /// `(held type, format)` pair. Encoder failures are forwarded; no
    /// partial bytes are ever returned.
    pub fn serialize(&self, format: &str) -> Result<Vec<u8>, ValueError> {
        SerializationRegistry::global().serialize(self, format)
    }
}

impl Value<ReadWrite> {
    /// Creates a new handle holding the given value.
    ///
    /// The value is moved in, never copied. The
    /// [`Comparable`](handlers::Comparable) handler is used, delegating
    /// equality, hashing and formatting to the value's own trait
    /// implementations. Use [`Value::new_custom`] for types that need a
    /// different handler (no equality, no `Display`, floats).
    ///
    /// # Examples
    ///
    /// ```
    /// use protean::Value;
    ///
    /// let value = Value::new(String::from("payload"));
    /// assert!(value.is::<String>());
    /// assert!(value.unique());
    /// ```
    #[must_use]
    pub fn new<V>(value: V) -> Self
    where
        V: PartialEq
            + Hash
            + Clone
            + core::fmt::Display
            + core::fmt::Debug
            + Send
            + Sync
            + 'static,
    {
        Self::new_custom::<handlers::Comparable, V>(value)
    }

    /// Creates a new handle with an explicitly chosen handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use protean::{Value, handlers};
    ///
    /// // Floats have no `Hash` implementation, so they need their own
    /// // handler
    /// let value = Value::new_custom::<handlers::Float, _>(1.5f64);
    /// assert!(value.is::<f64>());
    /// ```
    #[must_use]
    pub fn new_custom<H, V>(value: V) -> Self
    where
        V: Send + Sync + 'static,
        H: ValueHandler<V>,
    {
        // SAFETY:
        // 1. The holder is freshly allocated with a strong count of 1
        // 3. `V: Send + Sync` is bounded above
        unsafe { Self::from_raw(Some(RawValue::new::<V, H>(value))) }
    }

    /// Borrows the held value as a `&mut T`.
    ///
    /// Available only on read-write handles, which are guaranteed to be the
    /// unique owner of their holder.
    ///
    /// # Errors
    ///
    /// Fails with [`ValueError::EmptyContainer`] on an empty handle and
    /// [`ValueError::TypeMismatch`] if the held type is not `T`.
    pub fn downcast_mut<T: 'static>(&mut self) -> Result<&mut T, ValueError> {
        let Some(raw) = self.raw.as_mut() else {
            return Err(ValueError::EmptyContainer);
        };
        let (type_id, type_name) = {
            let raw = raw.as_ref();
            (raw.value_type_id(), raw.value_type_name())
        };
        if type_id != TypeId::of::<T>() {
            return Err(ValueError::TypeMismatch {
                requested: core::any::type_name::<T>(),
                actual: type_name,
            });
        }
        // SAFETY: `ReadWrite` handles are unique owners; the strong count is
        // 1 by the invariant on `raw`.
        let raw_mut = unsafe { raw.as_mut() };
        // SAFETY: The stored type id was checked above
        Ok(unsafe { raw_mut.value_downcast_mut_unchecked::<T>() })
    }

    /// Converts this handle into a shared, immutable one without copying
    /// the held value.
    ///
    /// The unique owner is consumed, so no mutable view of the holder can
    /// exist afterwards.
    #[must_use]
    pub fn into_read_only(self) -> Value<ReadOnly> {
        let Value { raw, .. } = self;
        // SAFETY:
        // 2. The sole owner was consumed; every future reference shares
        // 3. Upheld by the invariant on the consumed handle
        unsafe { Value::from_raw(raw) }
    }

    /// Deep-copies the content into a fresh shared handle.
    ///
    /// Used when a shareable handle is needed but this unique owner must
    /// stay usable (interning goes through here).
    pub(crate) fn snapshot_read_only(&self) -> Value<ReadOnly> {
        let raw = self.as_raw_ref().map(RawValueRef::clone_value);
        // SAFETY:
        // 2. The deep copy is a fresh holder with a strong count of 1 and
        //    no other references
        // 3. Upheld by the invariant on `self`
        unsafe { Value::from_raw(raw) }
    }

    /// Reconstructs a handle from serialized bytes using the process-wide
    /// [`SerializationRegistry`].
    ///
    /// On success the returned handle compares
    /// [`content_eq`](Value::content_eq) to the serialized one for every
    /// type whose codec round-trips. Construction is all-or-nothing: on
    /// failure no handle exists.
    ///
    /// # Errors
    ///
    /// Fails with [`ValueError::MalformedData`] if the bytes do not parse
    /// under the claimed format and [`ValueError::UnsupportedFormat`] if the
    /// embedded type tag has no decoder for the format.
    pub fn deserialize(bytes: &[u8], format: &str) -> Result<Self, ValueError> {
        SerializationRegistry::global().deserialize(bytes, format)
    }
}

impl Clone for Value<ReadOnly> {
    fn clone(&self) -> Self {
        let raw = self.as_raw_ref().map(|raw| {
            // SAFETY: `ReadOnly` handles never assume unique ownership, so
            // every reference to the holder is compatible with sharing.
            unsafe { raw.clone_arc() }
        });
        // SAFETY:
        // 2. Shared ownership is preserved by the invariant on `self`
        // 3. Upheld by the invariant on `self`
        unsafe { Self::from_raw(raw) }
    }
}

impl<A: AccessMarker> Default for Value<A> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<A: AccessMarker> core::fmt::Display for Value<A> {
    /// Formats the handle in its human-readable text form.
    ///
    /// For the built-in types this matches the payload of the `TEXT`
    /// serialization format. Empty handles print as `<empty>`.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.as_raw_ref() {
            None => f.write_str("<empty>"),
            Some(raw) => raw.value_display(f),
        }
    }
}

impl<A: AccessMarker> core::fmt::Debug for Value<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.as_raw_ref() {
            None => f.write_str("Value<empty>"),
            Some(raw) => {
                write!(f, "Value<{}>(", raw.value_type_name())?;
                raw.value_debug(f)?;
                f.write_str(")")
            }
        }
    }
}

impl From<&str> for Value<ReadWrite> {
    /// Wraps the string slice as an owned [`String`].
    fn from(value: &str) -> Self {
        Value::new(String::from(value))
    }
}

impl From<f32> for Value<ReadWrite> {
    fn from(value: f32) -> Self {
        Value::new_custom::<handlers::Float, _>(value)
    }
}

impl From<f64> for Value<ReadWrite> {
    fn from(value: f64) -> Self {
        Value::new_custom::<handlers::Float, _>(value)
    }
}

impl From<Vec<u8>> for Value<ReadWrite> {
    fn from(value: Vec<u8>) -> Self {
        Value::new_custom::<handlers::Bytes, _>(value)
    }
}

macro_rules! impl_from_comparable {
    ($($ty:ty),* $(,)?) => {$(
        impl From<$ty> for Value<ReadWrite> {
            fn from(value: $ty) -> Self {
                Value::new(value)
            }
        }
    )*};
}

impl_from_comparable!(bool, i8, i16, i32, i64, u8, u16, u32, u64, char, String);
