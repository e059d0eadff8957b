//! Lock shim for the process-wide services.
//!
//! Selects `std::sync::RwLock` when the `std` feature is enabled and the
//! `spin` lock otherwise, so the intern pool and serialization registry work
//! unchanged on `no_std` targets.

#[cfg(feature = "std")]
use std::sync as impl_;

#[cfg(not(feature = "std"))]
use spin as impl_;

/// A reader-writer lock with a const constructor, usable in statics.
#[repr(transparent)]
pub(crate) struct Shared<T>(impl_::RwLock<T>);

/// Read guard returned by [`Shared::read`].
#[repr(transparent)]
pub(crate) struct SharedReadGuard<'a, T>(impl_::RwLockReadGuard<'a, T>);

/// Write guard returned by [`Shared::write`].
#[repr(transparent)]
pub(crate) struct SharedWriteGuard<'a, T>(impl_::RwLockWriteGuard<'a, T>);

impl<T> Shared<T> {
    #[must_use]
    pub(crate) const fn new(value: T) -> Self {
        Self(impl_::RwLock::new(value))
    }

    #[inline]
    pub(crate) fn read(&self) -> SharedReadGuard<'_, T> {
        #[cfg(not(feature = "std"))]
        let guard = self.0.read();

        #[cfg(feature = "std")]
        let guard = self.0.read().expect("unable to acquire shared lock");

        SharedReadGuard(guard)
    }

    #[inline]
    pub(crate) fn write(&self) -> SharedWriteGuard<'_, T> {
        #[cfg(not(feature = "std"))]
        let guard = self.0.write();

        #[cfg(feature = "std")]
        let guard = self.0.write().expect("unable to acquire shared lock");

        SharedWriteGuard(guard)
    }
}

impl<T> core::ops::Deref for SharedReadGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> core::ops::Deref for SharedWriteGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> core::ops::DerefMut for SharedWriteGuard<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}
