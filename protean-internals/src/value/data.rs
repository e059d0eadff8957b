//! This module encapsulates the fields of the [`ValueData`]. Since this is
//! the only place they are visible, this means that the type of the
//! [`ValueVtable`] is guaranteed to always be in sync with the type of the
//! actual value. This follows from the fact that they are in sync when
//! created and that the API offers no way to change the [`ValueVtable`] or
//! the value's type after creation.

use crate::{
    handlers::ValueHandler,
    value::{
        raw::{RawValueMut, RawValueRef},
        vtable::ValueVtable,
    },
};

/// Type-erased value storage with vtable-based dispatch.
///
/// This struct uses `#[repr(C)]` to enable safe field access in type-erased
/// contexts, allowing access to the vtable field even when the concrete
/// value type `V` is unknown.
#[repr(C)]
pub(super) struct ValueData<V: 'static> {
    /// The vtable of this value
    vtable: &'static ValueVtable,
    /// The actual held value
    value: V,
}

impl<V: 'static> ValueData<V> {
    /// Creates a new [`ValueData`] with the specified handler and value.
    ///
    /// This method creates the vtable for type-erased dispatch and pairs it
    /// with the held value.
    #[inline]
    pub(super) fn new<H: ValueHandler<V>>(value: V) -> Self {
        Self {
            vtable: ValueVtable::new::<V, H>(),
            value,
        }
    }
}

impl<'a> RawValueRef<'a> {
    /// Returns a reference to the [`ValueVtable`] of the [`ValueData`]
    /// instance.
    #[inline]
    pub(super) fn vtable(self) -> &'static ValueVtable {
        let ptr = self.as_ptr();
        // SAFETY: We don't know the actual inner value type, but we do know
        // that the pointer points to an instance of `ValueData<V>` for some
        // specific `V`. Since `ValueData<V>` is `#[repr(C)]`, it is safe to
        // create pointers to the fields before the actual value.
        //
        // We need to take care to avoid creating an actual reference to the
        // `ValueData` itself though, as that would be undefined behavior
        // since we don't have the right type.
        let vtable_ptr: *const &'static ValueVtable = unsafe { &raw const (*ptr).vtable };

        // SAFETY: Dereferencing the pointer and getting out the `&'static
        // ValueVtable` is valid for the same reasons
        unsafe { *vtable_ptr }
    }

    /// Accesses the inner value of the [`ValueData`] instance as a reference
    /// to the specified type.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the type `V` matches the actual value
    /// type stored in the [`ValueData`].
    #[inline]
    pub unsafe fn value_downcast_unchecked<V: 'static>(self) -> &'a V {
        // SAFETY: The inner function requires that `V` matches the type
        // stored, but that is guaranteed by our caller.
        let this = unsafe { self.cast_inner::<V>() };
        &this.value
    }
}

impl<'a> RawValueMut<'a> {
    /// Accesses the inner value of the [`ValueData`] instance as a mutable
    /// reference to the specified type.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the type `V` matches the actual value
    /// type stored in the [`ValueData`].
    #[inline]
    pub unsafe fn value_downcast_mut_unchecked<V: 'static>(self) -> &'a mut V {
        // SAFETY: The inner function requires that `V` matches the type
        // stored, but that is guaranteed by our caller.
        let this = unsafe { self.cast_inner::<V>() };
        &mut this.value
    }
}
