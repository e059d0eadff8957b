//! Type-erased value storage.
//!
//! This module implements the reference-counted, type-erased holder that
//! backs the public container handle. It is split into three files, each
//! encapsulating one safety-critical invariant:
//!
//! - [`data`]: the `#[repr(C)]` pairing of a vtable pointer with the
//!   concrete value, guaranteeing the vtable always matches the value's
//!   type.
//! - [`vtable`]: the per-type operation table and the monomorphized
//!   functions it points to.
//! - [`raw`]: the erased pointer types ([`RawValue`], [`RawValueRef`],
//!   [`RawValueMut`]) and their provenance invariants.

pub(crate) mod data;
pub(crate) mod raw;
pub(crate) mod vtable;

pub use raw::{RawValue, RawValueMut, RawValueRef};
