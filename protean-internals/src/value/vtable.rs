//! Vtable for type-erased value operations.
//!
//! This module contains the [`ValueVtable`] which enables calling handler
//! methods on held values when their concrete type `V` and handler type `H`
//! have been erased. The vtable stores function pointers that dispatch to
//! the correct typed implementations.
//!
//! This module encapsulates the fields of [`ValueVtable`] so they cannot be
//! accessed directly. This visibility restriction guarantees the safety
//! invariant: **the vtable's type parameters must match the actual value
//! type and handler stored in the [`ValueData`]**.
//!
//! # Safety Invariant
//!
//! This invariant is maintained because vtables are created as `&'static`
//! references via [`ValueVtable::new`], which pairs the function pointers
//! with specific types `V` and `H` at compile time.

use core::{any::TypeId, hash::Hasher, ptr::NonNull};

use crate::{
    handlers::ValueHandler,
    util::Erased,
    value::{
        data::ValueData,
        raw::{RawValue, RawValueRef},
    },
};

/// Vtable for type-erased value operations.
///
/// Contains function pointers for performing operations on held values
/// without knowing their concrete type at compile time.
///
/// # Safety
///
/// The following safety invariants are guaranteed to be upheld as long as
/// this struct exists:
///
/// * The fields `drop`, `clone_arc`, `strong_count`, `clone_value`, `eq`,
///   `hash`, `display`, and `debug` all point to the functions defined below
/// * The concrete pointers are all instantiated with the same value type `V`
///   and handler type `H` that were used to create this `ValueVtable`.
pub(crate) struct ValueVtable {
    /// Gets the [`TypeId`] of the value type that was used to create this
    /// [`ValueVtable`].
    type_id: fn() -> TypeId,
    /// Gets the [`core::any::type_name`] of the value type that was used to
    /// create this [`ValueVtable`].
    type_name: fn() -> &'static str,
    /// Gets the [`TypeId`] of the handler that was used to create this
    /// [`ValueVtable`].
    handler_type_id: fn() -> TypeId,
    /// Drops the [`triomphe::Arc<ValueData<V>>`] instance pointed to by this
    /// pointer.
    drop: unsafe fn(NonNull<ValueData<Erased>>),
    /// Clones the `triomphe::Arc<ValueData<V>>` pointed to by this pointer.
    clone_arc: unsafe fn(NonNull<ValueData<Erased>>) -> RawValue,
    /// Gets the strong count of the [`triomphe::Arc<ValueData<V>>`] pointed
    /// to by this pointer.
    strong_count: unsafe fn(NonNull<ValueData<Erased>>) -> usize,
    /// Deep-copies the held value into a fresh holder with a strong count
    /// of 1, using the `clone` method on the handler.
    clone_value: unsafe fn(RawValueRef<'_>) -> RawValue,
    /// Compares two held values using the `eq` method on the handler.
    /// Returns `false` without calling the handler when the right-hand side
    /// holds a different concrete type.
    eq: unsafe fn(RawValueRef<'_>, RawValueRef<'_>) -> bool,
    /// Feeds the held value's content into the hasher using the `hash`
    /// method on the handler.
    hash: unsafe fn(RawValueRef<'_>, &mut dyn Hasher),
    /// Formats the held value using the `display` method on the handler.
    display: unsafe fn(RawValueRef<'_>, &mut core::fmt::Formatter<'_>) -> core::fmt::Result,
    /// Formats the held value using the `debug` method on the handler.
    debug: unsafe fn(RawValueRef<'_>, &mut core::fmt::Formatter<'_>) -> core::fmt::Result,
}

impl ValueVtable {
    /// Creates a new [`ValueVtable`] for the value type `V` and the handler
    /// type `H`.
    pub(super) const fn new<V: 'static, H: ValueHandler<V>>() -> &'static Self {
        const {
            &Self {
                type_id: TypeId::of::<V>,
                type_name: core::any::type_name::<V>,
                handler_type_id: TypeId::of::<H>,
                drop: drop::<V>,
                clone_arc: clone_arc::<V>,
                strong_count: strong_count::<V>,
                clone_value: clone_value::<V, H>,
                eq: eq::<V, H>,
                hash: hash::<V, H>,
                display: display::<V, H>,
                debug: debug::<V, H>,
            }
        }
    }

    /// Gets the [`TypeId`] of the value type that was used to create this
    /// [`ValueVtable`].
    #[inline]
    pub(super) fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Gets the [`core::any::type_name`] of the value type that was used to
    /// create this [`ValueVtable`].
    #[inline]
    pub(super) fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Gets the [`TypeId`] of the handler that was used to create this
    /// [`ValueVtable`].
    #[inline]
    pub(super) fn handler_type_id(&self) -> TypeId {
        (self.handler_type_id)()
    }

    /// Drops the `triomphe::Arc<ValueData<V>>` instance pointed to by this
    /// pointer.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The pointer comes from a [`triomphe::Arc<ValueData<V>>`] turned
    ///    into a pointer via [`triomphe::Arc::into_raw`]
    /// 2. This [`ValueVtable`] must be a vtable for the value type stored in
    ///    the [`ValueData`].
    /// 3. The pointer is not used after calling this method. Storing the
    ///    pointer in structures that claim ownership of it, such as another
    ///    `Arc`, counts as using it after calling this method.
    #[inline]
    pub(super) unsafe fn drop(&self, ptr: NonNull<ValueData<Erased>>) {
        // SAFETY: We know that `self.drop` points to the function `drop::<V>`
        // below. That function's safety requirements are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        // 3. Guaranteed by the caller
        unsafe {
            (self.drop)(ptr);
        }
    }

    /// Clones the [`triomphe::Arc<ValueData<V>>`] pointed to by this
    /// pointer.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The pointer comes from a [`triomphe::Arc<ValueData<V>>`] turned
    ///    into a pointer via [`triomphe::Arc::into_raw`]
    /// 2. This [`ValueVtable`] must be a vtable for the value type stored in
    ///    the [`ValueData`].
    /// 3. All other references to this holder are compatible with shared
    ///    ownership. Specifically none of them assume that the strong count
    ///    is `1`.
    #[inline]
    pub(super) unsafe fn clone_arc(&self, ptr: NonNull<ValueData<Erased>>) -> RawValue {
        // SAFETY: We know that `self.clone_arc` points to the function
        // `clone_arc::<V>` below. That function's safety requirements are
        // upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        // 3. Guaranteed by the caller
        unsafe { (self.clone_arc)(ptr) }
    }

    /// Gets the strong count of the [`triomphe::Arc<ValueData<V>>`] pointed
    /// to by this pointer.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The pointer comes from [`triomphe::Arc<ValueData<V>>`] via
    ///    [`triomphe::Arc::into_raw`]
    /// 2. This [`ValueVtable`] must be a vtable for the value type stored in
    ///    the [`ValueData`].
    #[inline]
    pub(super) unsafe fn strong_count(&self, ptr: NonNull<ValueData<Erased>>) -> usize {
        // SAFETY: We know that `self.strong_count` points to the function
        // `strong_count::<V>` below. That function's safety requirements are
        // upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe { (self.strong_count)(ptr) }
    }

    /// Deep-copies the held value into a fresh holder using the [`H::clone`]
    /// function used when creating this [`ValueVtable`].
    ///
    /// [`H::clone`]: ValueHandler::clone
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This [`ValueVtable`] must be a vtable for the value type stored in
    ///    the [`RawValueRef`].
    #[inline]
    pub(super) unsafe fn clone_value(&self, ptr: RawValueRef<'_>) -> RawValue {
        // SAFETY: We know that `self.clone_value` points to the function
        // `clone_value::<V, H>` below. That function's safety requirements
        // are upheld:
        // 1. Guaranteed by the caller
        unsafe { (self.clone_value)(ptr) }
    }

    /// Compares two held values using the [`H::eq`] function used when
    /// creating this [`ValueVtable`].
    ///
    /// Returns `false` when the right-hand side holds a different concrete
    /// type; the handler is only consulted for same-type comparisons. This
    /// makes the operation total: it never fails, for any pair of holders.
    ///
    /// [`H::eq`]: ValueHandler::eq
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This [`ValueVtable`] must be a vtable for the value type stored in
    ///    the *left-hand* [`RawValueRef`]. The right-hand side may hold any
    ///    type; it is checked before being downcast.
    #[inline]
    pub(super) unsafe fn eq(&self, a: RawValueRef<'_>, b: RawValueRef<'_>) -> bool {
        // SAFETY: We know that `self.eq` points to the function `eq::<V, H>`
        // below. That function's safety requirements are upheld:
        // 1. Guaranteed by the caller
        unsafe { (self.eq)(a, b) }
    }

    /// Feeds the held value's content into the hasher using the [`H::hash`]
    /// function used when creating this [`ValueVtable`].
    ///
    /// [`H::hash`]: ValueHandler::hash
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This [`ValueVtable`] must be a vtable for the value type stored in
    ///    the [`RawValueRef`].
    #[inline]
    pub(super) unsafe fn hash(&self, ptr: RawValueRef<'_>, state: &mut dyn Hasher) {
        // SAFETY: We know that `self.hash` points to the function
        // `hash::<V, H>` below. That function's safety requirements are
        // upheld:
        // 1. Guaranteed by the caller
        unsafe { (self.hash)(ptr, state) }
    }

    /// Formats the held value using the [`H::display`] function used when
    /// creating this [`ValueVtable`].
    ///
    /// [`H::display`]: ValueHandler::display
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This [`ValueVtable`] must be a vtable for the value type stored in
    ///    the [`RawValueRef`].
    #[inline]
    pub(super) unsafe fn display(
        &self,
        ptr: RawValueRef<'_>,
        formatter: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        // SAFETY: We know that `self.display` points to the function
        // `display::<V, H>` below. That function's safety requirements are
        // upheld:
        // 1. Guaranteed by the caller
        unsafe { (self.display)(ptr, formatter) }
    }

    /// Formats the held value using the [`H::debug`] function used when
    /// creating this [`ValueVtable`].
    ///
    /// [`H::debug`]: ValueHandler::debug
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This [`ValueVtable`] must be a vtable for the value type stored in
    ///    the [`RawValueRef`].
    #[inline]
    pub(super) unsafe fn debug(
        &self,
        ptr: RawValueRef<'_>,
        formatter: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        // SAFETY: We know that `self.debug` points to the function
        // `debug::<V, H>` below. That function's safety requirements are
        // upheld:
        // 1. Guaranteed by the caller
        unsafe { (self.debug)(ptr, formatter) }
    }
}

/// Drops the [`triomphe::Arc<ValueData<V>>`] instance pointed to by this
/// pointer.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The pointer comes from [`triomphe::Arc<ValueData<V>>`] via
///    [`triomphe::Arc::into_raw`]
/// 2. The value type `V` matches the actual value type stored in the
///    [`ValueData`]
/// 3. The pointer is not used after calling this method.
unsafe fn drop<V: 'static>(ptr: NonNull<ValueData<Erased>>) {
    let ptr: NonNull<ValueData<V>> = ptr.cast();
    let ptr = ptr.as_ptr();
    // SAFETY:
    // 1. The pointer has the correct type and came from `Arc::into_raw`
    //    (guaranteed by caller)
    // 2. After `from_raw`, the pointer is consumed and not accessed again
    let arc = unsafe { triomphe::Arc::from_raw(ptr) };
    core::mem::drop(arc);
}

/// Clones the [`triomphe::Arc<ValueData<V>>`] pointed to by this pointer.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The pointer comes from a [`triomphe::Arc<ValueData<V>>`] turned into a
///    pointer via [`triomphe::Arc::into_raw`]
/// 2. The value type `V` matches the actual value type stored in the
///    [`ValueData`]
/// 3. All other references to this holder are compatible with shared
///    ownership. Specifically none of them assume that the strong count is
///    `1`.
unsafe fn clone_arc<V: 'static>(ptr: NonNull<ValueData<Erased>>) -> RawValue {
    let ptr: *const ValueData<V> = ptr.cast::<ValueData<V>>().as_ptr();

    // SAFETY: The pointer is valid and came from `Arc::into_raw` with the
    // correct type (guaranteed by the caller), which fulfills the
    // requirements for `ArcBorrow::from_ptr`.
    let arc_borrow = unsafe { triomphe::ArcBorrow::from_ptr(ptr) };

    let arc = arc_borrow.clone_arc();
    RawValue::from_arc(arc)
}

/// Gets the strong count of the [`triomphe::Arc<ValueData<V>>`] pointed to
/// by this pointer.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The pointer comes from [`triomphe::Arc<ValueData<V>>`] via
///    [`triomphe::Arc::into_raw`]
/// 2. The value type `V` matches the actual value type stored in the
///    [`ValueData`]
unsafe fn strong_count<V: 'static>(ptr: NonNull<ValueData<Erased>>) -> usize {
    let ptr: *const ValueData<V> = ptr.cast::<ValueData<V>>().as_ptr();

    // SAFETY: The pointer is valid and came from `Arc::into_raw` with the
    // correct type (guaranteed by the caller), which fulfills the
    // requirements for `ArcBorrow::from_ptr`.
    let arc_borrow = unsafe { triomphe::ArcBorrow::from_ptr(ptr) };

    triomphe::ArcBorrow::strong_count(&arc_borrow)
}

/// Deep-copies a held value into a fresh holder using its handler's clone
/// implementation.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The type `V` matches the actual value type stored in the
///    [`ValueData`]
unsafe fn clone_value<V: 'static, H: ValueHandler<V>>(ptr: RawValueRef<'_>) -> RawValue {
    // SAFETY:
    // 1. Guaranteed by the caller
    let value: &V = unsafe { ptr.value_downcast_unchecked::<V>() };
    RawValue::new::<V, H>(H::clone(value))
}

/// Compares two held values using the left-hand side's handler.
///
/// The right-hand side's type id is checked first; a mismatch answers
/// `false` without consulting the handler, keeping equality total across
/// arbitrary holder pairs.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The type `V` matches the actual value type stored in the *left-hand*
///    [`ValueData`]. The right-hand side may hold any type.
unsafe fn eq<V: 'static, H: ValueHandler<V>>(a: RawValueRef<'_>, b: RawValueRef<'_>) -> bool {
    if b.value_type_id() != TypeId::of::<V>() {
        return false;
    }
    // SAFETY:
    // 1. Guaranteed by the caller
    let a: &V = unsafe { a.value_downcast_unchecked::<V>() };
    // SAFETY:
    // 1. We checked above that the right-hand side stores a `V`
    let b: &V = unsafe { b.value_downcast_unchecked::<V>() };
    H::eq(a, b)
}

/// Feeds a held value's content into the hasher using its handler's hash
/// implementation.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The type `V` matches the actual value type stored in the
///    [`ValueData`]
unsafe fn hash<V: 'static, H: ValueHandler<V>>(ptr: RawValueRef<'_>, state: &mut dyn Hasher) {
    // SAFETY:
    // 1. Guaranteed by the caller
    let value: &V = unsafe { ptr.value_downcast_unchecked::<V>() };
    H::hash(value, state)
}

/// Formats a held value using its handler's display implementation.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The type `V` matches the actual value type stored in the
///    [`ValueData`]
unsafe fn display<V: 'static, H: ValueHandler<V>>(
    ptr: RawValueRef<'_>,
    formatter: &mut core::fmt::Formatter<'_>,
) -> core::fmt::Result {
    // SAFETY:
    // 1. Guaranteed by the caller
    let value: &V = unsafe { ptr.value_downcast_unchecked::<V>() };
    H::display(value, formatter)
}

/// Formats a held value using its handler's debug implementation.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The type `V` matches the actual value type stored in the
///    [`ValueData`]
unsafe fn debug<V: 'static, H: ValueHandler<V>>(
    ptr: RawValueRef<'_>,
    formatter: &mut core::fmt::Formatter<'_>,
) -> core::fmt::Result {
    // SAFETY:
    // 1. Guaranteed by the caller
    let value: &V = unsafe { ptr.value_downcast_unchecked::<V>() };
    H::debug(value, formatter)
}
