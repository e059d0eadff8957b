//! Type-erased value pointer types.
//!
//! This module encapsulates the `ptr` field of [`RawValue`], [`RawValueRef`]
//! and [`RawValueMut`], ensuring it is only visible within this module. This
//! visibility restriction guarantees the safety invariant: **the pointer
//! always comes from `Arc<ValueData<V>>`**.
//!
//! # Safety Invariant
//!
//! Since the `ptr` field can only be set via [`RawValue::new`] or
//! [`RawValue::from_arc`] (which create it from `Arc::into_raw`), and cannot
//! be modified afterward (no `pub` or `pub(crate)` fields), the pointer
//! provenance remains valid throughout the value's lifetime.
//!
//! The [`RawValue::drop`] implementation and reference counting operations
//! rely on this invariant to safely reconstruct the `Arc` and manage memory.
//!
//! # Type Erasure
//!
//! The concrete type parameter `V` is erased by casting to
//! `ValueData<Erased>`. The vtable stored within the `ValueData` provides
//! the runtime type information needed to safely downcast, compare and
//! format held values.
//!
//! # Allocation Strategy
//!
//! Holders use `triomphe::Arc` for storage. This enables:
//! - Cheap handle copies through atomic reference counting
//! - Shared ownership between user handles and the intern pool
//! - Thread-safe sharing when the held type is `Send + Sync`

use core::{any::TypeId, hash::Hasher, ptr::NonNull};

use crate::{handlers::ValueHandler, util::Erased, value::data::ValueData};

/// A pointer to a [`ValueData`] that is guaranteed to point to an
/// initialized instance of a [`ValueData<V>`] for some specific `V`, though
/// we do not know which actual `V` it is.
///
/// However, the pointer is allowed to transition into a non-initialized
/// state inside the [`RawValue::drop`] method.
///
/// The pointer is guaranteed to have been created using
/// [`triomphe::Arc::into_raw`].
///
/// We cannot use a [`triomphe::Arc<ValueData<V>>`] directly, because that
/// does not allow us to type-erase the `V`.
#[repr(transparent)]
pub struct RawValue {
    /// Pointer to the inner value data
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long
    /// as this struct exists:
    ///
    /// 1. The pointer must have been created from a
    ///    `triomphe::Arc<ValueData<V>>` for some `V` using
    ///    `triomphe::Arc::into_raw`.
    /// 2. The pointer retains full provenance over the `Arc` for the entire
    ///    lifetime of this object (i.e., it was not derived from a `&T`)
    /// 3. The pointer will point to the same `ValueData<V>` for the entire
    ///    lifetime of this object.
    ptr: NonNull<ValueData<Erased>>,
}

impl RawValue {
    /// Creates a new [`RawValue`] from a [`triomphe::Arc<ValueData<V>>`].
    #[inline]
    pub(super) fn from_arc<V: 'static>(data: triomphe::Arc<ValueData<V>>) -> Self {
        let ptr: *const ValueData<V> = triomphe::Arc::into_raw(data);
        let ptr: *mut ValueData<Erased> = ptr.cast::<ValueData<Erased>>().cast_mut();

        // SAFETY: Triomphe guarantees that `Arc::into_raw` returns a
        // non-null pointer.
        let ptr: NonNull<ValueData<Erased>> = unsafe { NonNull::new_unchecked(ptr) };

        Self { ptr }
    }

    /// Creates a new [`RawValue`] holding the specified value.
    ///
    /// The created holder uses the handler `H` for all type-erased
    /// operations on the value, and has a strong count of 1.
    #[inline]
    pub fn new<V, H>(value: V) -> Self
    where
        V: 'static,
        H: ValueHandler<V>,
    {
        let data = triomphe::Arc::new(ValueData::new::<H>(value));
        Self::from_arc(data)
    }

    /// Returns a reference to the [`ValueData`] instance.
    #[inline]
    pub fn as_ref(&self) -> RawValueRef<'_> {
        RawValueRef {
            ptr: self.ptr,
            _marker: core::marker::PhantomData,
        }
    }

    /// Returns a mutable reference to the [`ValueData`] instance.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This is the only existing reference pointing to the inner
    ///    [`ValueData`]. Specifically the strong count of the inner
    ///    [`triomphe::Arc`] must be `1`.
    #[inline]
    pub unsafe fn as_mut(&mut self) -> RawValueMut<'_> {
        RawValueMut {
            // SAFETY:
            // 1. The pointer comes from `Arc::into_raw` (guaranteed by
            //    `RawValue`'s invariant)
            // 2. We are creating the `RawValueMut` here, and we are not
            //    changing the pointer
            // 3. Exclusive mutable access is guaranteed by the caller's
            //    obligation that no other references to the inner
            //    `ValueData` exist
            ptr: self.ptr,
            _marker: core::marker::PhantomData,
        }
    }
}

impl core::ops::Drop for RawValue {
    #[inline]
    fn drop(&mut self) {
        let vtable = self.as_ref().vtable();

        // SAFETY:
        // 1. The pointer comes from `Arc::into_raw` (guaranteed by
        //    `RawValue::new`)
        // 2. The vtable returned by `self.as_ref().vtable()` is guaranteed
        //    to match the data in the `ValueData`.
        // 3. The pointer is not used after this call (we're in the drop
        //    function)
        unsafe {
            vtable.drop(self.ptr);
        }
    }
}

/// A lifetime-bound pointer to a [`ValueData`] that is guaranteed to point
/// to an initialized instance of a [`ValueData<V>`] for some specific `V`,
/// though we do not know which actual `V` it is.
///
/// We cannot use a [`&'a ValueData<V>`] directly, because that would require
/// us to know the actual type of the held value, which we do not.
///
/// [`&'a ValueData<V>`]: ValueData
///
/// # Safety invariants
///
/// This reference behaves like a `&'a ValueData<V>` for some unknown `V` and
/// upholds the usual safety invariants of shared references:
///
/// 1. The pointee is properly initialized for the entire lifetime `'a`.
/// 2. The pointee is not mutated for the entire lifetime `'a`.
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct RawValueRef<'a> {
    /// Pointer to the inner value data
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long
    /// as this struct exists:
    ///
    /// 1. The pointer must have been created from a
    ///    `triomphe::Arc<ValueData<V>>` for some `V` using
    ///    `triomphe::Arc::into_raw`.
    /// 2. The pointer retains full provenance over the `Arc` for the entire
    ///    lifetime of this object (i.e., it was not derived from a `&T`)
    /// 3. The pointer will point to the same `ValueData<V>` for the entire
    ///    lifetime of this object.
    ptr: NonNull<ValueData<Erased>>,

    /// Marker to tell the compiler that we should
    /// behave the same as a `&'a ValueData<Erased>`
    _marker: core::marker::PhantomData<&'a ValueData<Erased>>,
}

impl<'a> RawValueRef<'a> {
    /// Casts the [`RawValueRef`] to a [`ValueData<V>`] reference.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The type `V` matches the actual value type stored in the
    ///    [`ValueData`]
    #[inline]
    pub(super) unsafe fn cast_inner<V>(self) -> &'a ValueData<V> {
        // Debug assertion to catch type mismatches in case of bugs
        debug_assert_eq!(self.vtable().type_id(), TypeId::of::<V>());

        let this = self.ptr.cast::<ValueData<V>>();
        // SAFETY: Converting the NonNull pointer to a reference is sound
        // because:
        // - The pointer is non-null, properly aligned, and dereferenceable
        //   (guaranteed by RawValueRef's type invariants)
        // - The pointee is properly initialized (RawValueRef's doc comment
        //   guarantees it points to an initialized ValueData<V> for some V)
        // - The type `V` matches the actual value type (guaranteed by
        //   caller)
        // - Shared access is allowed
        // - The reference lifetime 'a is valid (tied to RawValueRef<'a>'s
        //   lifetime)
        unsafe { this.as_ref() }
    }

    /// Returns a raw pointer to the [`ValueData`] instance.
    #[inline]
    pub(super) fn as_ptr(self) -> *const ValueData<Erased> {
        self.ptr.as_ptr()
    }

    /// Returns `true` if both references point to the same holder
    /// allocation.
    #[inline]
    pub fn ptr_eq(self, other: RawValueRef<'_>) -> bool {
        core::ptr::eq(self.as_ptr(), other.as_ptr())
    }

    /// Returns the [`TypeId`] of the held value.
    #[inline]
    pub fn value_type_id(self) -> TypeId {
        self.vtable().type_id()
    }

    /// Returns the [`core::any::type_name`] of the held value.
    #[inline]
    pub fn value_type_name(self) -> &'static str {
        self.vtable().type_name()
    }

    /// Returns the [`TypeId`] of the handler the holder was created with.
    #[inline]
    pub fn value_handler_type_id(self) -> TypeId {
        self.vtable().handler_type_id()
    }

    /// Compares the held values for content equality using the
    /// [`ValueHandler::eq`] method specified by the handler used to create
    /// the left-hand [`ValueData`].
    ///
    /// This operation is total: if `other` holds a different concrete type,
    /// the result is `false` and the handler is never consulted.
    #[inline]
    pub fn value_eq(self, other: RawValueRef<'_>) -> bool {
        let vtable = self.vtable();
        // SAFETY:
        // 1. The vtable returned by `self.vtable()` is guaranteed to match
        //    the data in the left-hand `ValueData`. The right-hand side is
        //    type-checked inside the vtable entry.
        unsafe { vtable.eq(self, other) }
    }

    /// Feeds the held value's content into the hasher using the
    /// [`ValueHandler::hash`] method specified by the handler used to create
    /// the [`ValueData`].
    #[inline]
    pub fn value_hash(self, state: &mut dyn Hasher) {
        let vtable = self.vtable();
        // SAFETY:
        // 1. The vtable returned by `self.vtable()` is guaranteed to match
        //    the data in the `ValueData`.
        unsafe { vtable.hash(self, state) }
    }

    /// Formats the held value by using the [`ValueHandler::display`] method
    /// specified by the handler used to create the [`ValueData`].
    #[inline]
    pub fn value_display(self, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let vtable = self.vtable();
        // SAFETY:
        // 1. The vtable returned by `self.vtable()` is guaranteed to match
        //    the data in the `ValueData`.
        unsafe { vtable.display(self, formatter) }
    }

    /// Formats the held value by using the [`ValueHandler::debug`] method
    /// specified by the handler used to create the [`ValueData`].
    #[inline]
    pub fn value_debug(self, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let vtable = self.vtable();
        // SAFETY:
        // 1. The vtable returned by `self.vtable()` is guaranteed to match
        //    the data in the `ValueData`.
        unsafe { vtable.debug(self, formatter) }
    }

    /// Deep-copies the held value into a fresh holder with a strong count of
    /// 1, using the [`ValueHandler::clone`] method specified by the handler
    /// used to create the [`ValueData`].
    ///
    /// Unlike [`clone_arc`](RawValueRef::clone_arc) this allocates new
    /// storage, so it is safe regardless of how the original holder is
    /// owned.
    #[inline]
    pub fn clone_value(self) -> RawValue {
        let vtable = self.vtable();
        // SAFETY:
        // 1. The vtable returned by `self.vtable()` is guaranteed to match
        //    the data in the `ValueData`.
        unsafe { vtable.clone_value(self) }
    }

    /// Clones the inner [`triomphe::Arc`] and returns a new [`RawValue`]
    /// pointing to the same data.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. All other references to this holder are compatible with shared
    ///    ownership. Specifically none of them assume that the strong count
    ///    is `1`.
    #[inline]
    pub unsafe fn clone_arc(self) -> RawValue {
        let vtable = self.vtable();
        // SAFETY:
        // 1. Guaranteed by invariants on this type
        // 2. The vtable returned by `self.vtable()` is guaranteed to match
        //    the data in the `ValueData`.
        // 3. Guaranteed by the caller
        unsafe { vtable.clone_arc(self.ptr) }
    }

    /// Gets the strong count of the inner [`triomphe::Arc`].
    #[inline]
    pub fn strong_count(self) -> usize {
        let vtable = self.vtable();
        // SAFETY:
        // 1. The pointer comes from `Arc::into_raw` (guaranteed by the
        //    invariants on this type)
        // 2. The vtable returned by `self.vtable()` is guaranteed to match
        //    the data in the `ValueData`.
        unsafe { vtable.strong_count(self.ptr) }
    }
}

/// A mutable lifetime-bound pointer to a [`ValueData`] that is guaranteed to
/// point to an initialized instance of a [`ValueData<V>`] for some specific
/// `V`, though we do not know which actual `V` it is.
///
/// We cannot use a [`&'a mut ValueData<V>`] directly, because that would
/// require us to know the actual type of the held value, which we do not.
///
/// [`&'a mut ValueData<V>`]: ValueData
///
/// # Safety invariants
///
/// This reference behaves like a `&'a mut ValueData<V>` for some unknown `V`
/// and upholds the usual safety invariants of mutable references:
///
/// 1. The pointee is properly initialized for the entire lifetime `'a`.
/// 2. The pointee is not aliased for the entire lifetime `'a`.
#[repr(transparent)]
pub struct RawValueMut<'a> {
    /// Pointer to the inner value data
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long
    /// as this struct exists:
    ///
    /// 1. The pointer must have been created from a
    ///    `triomphe::Arc<ValueData<V>>` for some `V` using
    ///    `triomphe::Arc::into_raw`.
    /// 2. The pointer will point to the same `ValueData<V>` for the entire
    ///    lifetime of this object.
    /// 3. This pointer is valid for exclusive mutable access to the
    ///    `ValueData` with the same semantics as a `&'a mut ValueData<V>`.
    ptr: NonNull<ValueData<Erased>>,

    /// Marker to tell the compiler that we should
    /// behave the same as a `&'a mut ValueData<Erased>`
    _marker: core::marker::PhantomData<&'a mut ValueData<Erased>>,
}

impl<'a> RawValueMut<'a> {
    /// Casts the [`RawValueMut`] to a mutable [`ValueData<V>`] reference.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The type `V` matches the actual value type stored in the
    ///    [`ValueData`]
    #[inline]
    pub(super) unsafe fn cast_inner<V>(self) -> &'a mut ValueData<V> {
        // Debug assertion to catch type mismatches in case of bugs
        debug_assert_eq!(self.as_ref().vtable().type_id(), TypeId::of::<V>());

        let mut this = self.ptr.cast::<ValueData<V>>();

        // SAFETY: Converting the NonNull pointer to a mutable reference is
        // sound because:
        // - The pointer is non-null, properly aligned, and dereferenceable
        //   (guaranteed by RawValueMut's type invariants)
        // - The pointee is properly initialized (RawValueMut's doc comment
        //   guarantees it points to an initialized ValueData<V> for some V)
        // - The type `V` matches the actual value type (guaranteed by
        //   caller)
        // - Exclusive access is guaranteed
        // - The reference lifetime 'a is valid (tied to RawValueMut<'a>'s
        //   lifetime)
        unsafe { this.as_mut() }
    }

    /// Reborrows the mutable reference to the [`ValueData`] with a shorter
    /// lifetime.
    #[inline]
    pub fn reborrow<'b>(&'b mut self) -> RawValueMut<'b> {
        RawValueMut {
            // SAFETY:
            // 1. Guaranteed by invariant on `self`
            // 2. We are creating the `RawValueMut` here, and we are not
            //    changing the pointer
            // 3. Upheld by mutable borrow of `self`
            ptr: self.ptr,
            _marker: core::marker::PhantomData,
        }
    }

    /// Returns a shared reference to the [`ValueData`] instance.
    #[inline]
    pub fn as_ref(&self) -> RawValueRef<'_> {
        RawValueRef {
            // SAFETY:
            // 1. Guaranteed by the invariants on `RawValueMut`
            // 2. Guaranteed by the invariants on `RawValueMut` and the fact
            //    that we are taking a shared reference to `self`
            // 3. We are creating the `RawValueRef` here, and we are not
            //    changing the pointer
            ptr: self.ptr,
            _marker: core::marker::PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use core::hash::{Hash, Hasher};

    use super::*;
    use crate::handlers::ValueHandler;

    struct HandlerI64;
    impl ValueHandler<i64> for HandlerI64 {
        fn eq(a: &i64, b: &i64) -> bool {
            a == b
        }

        fn hash(value: &i64, mut state: &mut dyn Hasher) {
            value.hash(&mut state)
        }

        fn clone(value: &i64) -> i64 {
            *value
        }

        fn display(value: &i64, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            core::fmt::Display::fmt(value, formatter)
        }

        fn debug(value: &i64, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            core::fmt::Debug::fmt(value, formatter)
        }
    }

    struct HandlerString;
    impl ValueHandler<String> for HandlerString {
        fn eq(a: &String, b: &String) -> bool {
            a == b
        }

        fn hash(value: &String, mut state: &mut dyn Hasher) {
            value.hash(&mut state)
        }

        fn clone(value: &String) -> String {
            value.clone()
        }

        fn display(value: &String, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            core::fmt::Display::fmt(value, formatter)
        }

        fn debug(value: &String, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            core::fmt::Debug::fmt(value, formatter)
        }
    }

    #[test]
    fn test_raw_value_size() {
        assert_eq!(
            core::mem::size_of::<RawValue>(),
            core::mem::size_of::<usize>()
        );
        assert_eq!(
            core::mem::size_of::<Option<RawValue>>(),
            core::mem::size_of::<usize>()
        );
        assert_eq!(
            core::mem::size_of::<RawValueRef<'_>>(),
            core::mem::size_of::<usize>()
        );
        assert_eq!(
            core::mem::size_of::<Option<RawValueRef<'_>>>(),
            core::mem::size_of::<usize>()
        );
        assert_eq!(
            core::mem::size_of::<RawValueMut<'_>>(),
            core::mem::size_of::<usize>()
        );
    }

    #[test]
    fn test_raw_value_downcast() {
        let int_value = RawValue::new::<i64, HandlerI64>(42);
        let string_value = RawValue::new::<String, HandlerString>(String::from("test"));

        let int_ref = int_value.as_ref();
        let string_ref = string_value.as_ref();

        assert_eq!(int_ref.value_type_id(), TypeId::of::<i64>());
        assert_eq!(string_ref.value_type_id(), TypeId::of::<String>());

        // The vtables should be different
        assert!(!core::ptr::eq(int_ref.vtable(), string_ref.vtable()));

        // Correct downcasting should work
        // SAFETY: The type ids were checked above
        assert_eq!(unsafe { int_ref.value_downcast_unchecked::<i64>() }, &42);
        // SAFETY: The type ids were checked above
        assert_eq!(
            unsafe { string_ref.value_downcast_unchecked::<String>() },
            "test"
        );
    }

    #[test]
    fn test_raw_value_clone_arc_counts() {
        let value = RawValue::new::<i64, HandlerI64>(123);
        let value_ref = value.as_ref();

        assert_eq!(value_ref.strong_count(), 1);

        // SAFETY: There are no assumptions on single ownership
        let cloned = unsafe { value_ref.clone_arc() };
        let cloned_ref = cloned.as_ref();

        assert_eq!(value_ref.strong_count(), 2);
        assert_eq!(cloned_ref.strong_count(), 2);
        assert!(value_ref.ptr_eq(cloned_ref));

        core::mem::drop(cloned);

        // After dropping, the strong count should go back down
        assert_eq!(value_ref.strong_count(), 1);
    }

    #[test]
    fn test_raw_value_clone_value_is_fresh() {
        let value = RawValue::new::<i64, HandlerI64>(7);
        let copy = value.as_ref().clone_value();

        // Fresh allocation with its own count, equal content
        assert!(!value.as_ref().ptr_eq(copy.as_ref()));
        assert_eq!(copy.as_ref().strong_count(), 1);
        assert_eq!(value.as_ref().strong_count(), 1);
        assert!(value.as_ref().value_eq(copy.as_ref()));
    }

    #[test]
    fn test_raw_value_eq_total_across_types() {
        let int_value = RawValue::new::<i64, HandlerI64>(42);
        let string_value = RawValue::new::<String, HandlerString>(String::from("42"));

        // Cross-type comparison answers false instead of failing
        assert!(!int_value.as_ref().value_eq(string_value.as_ref()));
        assert!(!string_value.as_ref().value_eq(int_value.as_ref()));
        assert!(int_value.as_ref().value_eq(int_value.as_ref()));
    }

    #[test]
    fn test_raw_value_hash_consistency() {
        fn fingerprint(value: RawValueRef<'_>) -> u64 {
            // A plain FNV-ish accumulator is enough for the test
            struct Acc(u64);
            impl Hasher for Acc {
                fn finish(&self) -> u64 {
                    self.0
                }
                fn write(&mut self, bytes: &[u8]) {
                    for &b in bytes {
                        self.0 = self.0.wrapping_mul(0x100000001b3) ^ u64::from(b);
                    }
                }
            }
            let mut acc = Acc(0xcbf29ce484222325);
            value.value_hash(&mut acc);
            acc.finish()
        }

        let a = RawValue::new::<i64, HandlerI64>(42);
        let b = RawValue::new::<i64, HandlerI64>(42);
        let c = RawValue::new::<i64, HandlerI64>(43);

        assert_eq!(fingerprint(a.as_ref()), fingerprint(b.as_ref()));
        assert_ne!(fingerprint(a.as_ref()), fingerprint(c.as_ref()));
    }

    #[test]
    fn test_raw_value_mut_downcast() {
        let mut value = RawValue::new::<i64, HandlerI64>(1);

        // SAFETY: We have unique ownership of the holder
        let value_mut = unsafe { value.as_mut() };
        // SAFETY: The holder was created with type i64 above
        let inner = unsafe { value_mut.value_downcast_mut_unchecked::<i64>() };
        *inner = 2;

        // SAFETY: The holder was created with type i64 above
        assert_eq!(unsafe { value.as_ref().value_downcast_unchecked::<i64>() }, &2);
    }

    #[test]
    fn test_send_sync() {
        static_assertions::assert_not_impl_any!(RawValue: Send, Sync);
        static_assertions::assert_not_impl_any!(RawValueRef<'_>: Send, Sync);
        static_assertions::assert_not_impl_any!(RawValueMut<'_>: Send, Sync);
    }
}
