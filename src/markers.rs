//! Marker types defining the access capability of a handle.
//!
//! A [`Value<A>`](crate::Value) is parameterized by one of two access
//! markers that share the same reference-counted core and differ only in
//! whether a mutable view is exposed:
//!
//! - [`ReadWrite`]: the handle is the *unique* owner of its holder. It can
//!   hand out `&mut` views of the held value, and consequently cannot be
//!   cloned (sharing would alias the mutable state).
//! - [`ReadOnly`]: the handle shares its holder freely. Cloning is a cheap
//!   atomic reference-count increment, and no mutable view exists.
//!
//! The constraints encoded by the markers are enforced at construction time:
//! it is impossible to obtain a `Value<ReadWrite>` whose holder is shared,
//! or to reach a `&mut` view through a `Value<ReadOnly>`. Interning always
//! produces `ReadOnly` handles, which is how the pool guarantees canonical
//! values stay immutable.
//!
//! # Examples
//!
//! ```
//! use protean::{Value, markers::ReadOnly};
//!
//! // Fresh handles are read-write and uniquely owned
//! let mut value = Value::new(1i64);
//! *value.downcast_mut::<i64>()? += 1;
//!
//! // Freezing the handle enables cheap sharing
//! let shared: Value<ReadOnly> = value.into_read_only();
//! let copy = shared.clone();
//! assert_eq!(shared.use_count(), 2);
//! assert!(shared.content_eq(&copy));
//! # Ok::<(), protean::ValueError>(())
//! ```

use crate::value::Value;

/// Marker for uniquely-owned handles that expose a mutable view.
///
/// A `Value<ReadWrite>` is guaranteed to be the only owner of its holder
/// (the strong count is exactly 1), which is what makes
/// [`downcast_mut`](crate::Value::downcast_mut) safe. It does not implement
/// [`Clone`]; convert it with
/// [`into_read_only`](crate::Value::into_read_only) when sharing is needed.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct ReadWrite;

/// Marker for shared, immutable handles.
///
/// A `Value<ReadOnly>` clones by bumping the atomic reference count; all
/// copies observe the same holder. No mutable view is obtainable, which is
/// the immutability guarantee interned values rely on.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct ReadOnly;

mod sealed {
    use super::{ReadOnly, ReadWrite};

    pub trait Sealed: 'static {}

    impl Sealed for ReadWrite {}
    impl Sealed for ReadOnly {}
}

/// Marker trait implemented by [`ReadWrite`] and [`ReadOnly`].
///
/// This trait is sealed and cannot be implemented outside of this crate.
pub trait AccessMarker: sealed::Sealed + Sized + 'static {
    /// Produces a handle suitable for insertion into the intern pool.
    ///
    /// For [`ReadOnly`] sources the canonical handle shares the original
    /// storage; for [`ReadWrite`] sources a fresh deep copy is allocated so
    /// the unique owner is never aliased.
    #[doc(hidden)]
    fn make_shareable(value: &Value<Self>) -> Value<ReadOnly>;
}

impl AccessMarker for ReadWrite {
    #[inline]
    fn make_shareable(value: &Value<ReadWrite>) -> Value<ReadOnly> {
        value.snapshot_read_only()
    }
}

impl AccessMarker for ReadOnly {
    #[inline]
    fn make_shareable(value: &Value<ReadOnly>) -> Value<ReadOnly> {
        value.clone()
    }
}
