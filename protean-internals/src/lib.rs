#![no_std]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    unused_doc_comments
)]
#![allow(rustdoc::private_intra_doc_links)]
//! Internal implementation crate for [`protean`].
//!
//! # Overview
//!
//! This crate contains the low-level, type-erased value storage and the
//! unsafe operations that power the [`protean`] polymorphic container. It
//! provides zero-cost type erasure through vtable-based dispatch over
//! reference-counted allocations.
//!
//! **This crate is an implementation detail.** No semantic versioning
//! guarantees are provided. Users should depend on the [`protean`] crate,
//! not this one.
//!
//! # Architecture
//!
//! - **[`value`]**: Type-erased value storage
//!   - [`RawValue`]: Owned holder with [`Arc`]-based allocation
//!   - [`RawValueRef`]/[`RawValueMut`]: Borrowed references (shared/mutable)
//!   - [`ValueData`]: `#[repr(C)]` wrapper enabling field access on erased
//!     types
//!   - [`ValueVtable`]: Function pointers for type-erased dispatch
//!
//! - **[`handlers`]**: Trait definitions for per-type behavior
//!   - [`ValueHandler`]: Defines equality, hashing, deep-cloning and
//!     formatting for a held value
//!
//! # Safety Strategy
//!
//! Type erasure requires careful handling to maintain Rust's type safety
//! guarantees. When we erase a type like `ValueData<String>` to
//! `ValueData<Erased>`, we must ensure that the vtable function pointers
//! still match the actual concrete type stored in memory.
//!
//! This crate maintains safety through:
//!
//! - **Module-based encapsulation**: Safety-critical types keep fields
//!   module-private, making invariants locally verifiable within a single
//!   file
//! - **`#[repr(C)]` layout**: Enables safe field projection on type-erased
//!   pointers without constructing invalid references
//! - **Documented vtable contracts**: Each vtable method specifies exactly
//!   when it can be safely called
//!
//! See the [`value`] module documentation for details on how these patterns
//! are applied.
//!
//! [`protean`]: https://docs.rs/protean/latest/protean/
//! [`ValueData`]: value::data::ValueData
//! [`ValueVtable`]: value::vtable::ValueVtable
//! [`ValueHandler`]: handlers::ValueHandler
//! [`Arc`]: triomphe::Arc

extern crate alloc;

pub mod handlers;
mod util;
mod value;

pub use value::{RawValue, RawValueMut, RawValueRef};
