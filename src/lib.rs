#![cfg_attr(not(doc), no_std)]
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
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A reference-counted polymorphic value container with interning and
//! pluggable serialization.
//!
//! ## Overview
//!
//! This crate provides a single handle type, [`Value`], that can hold any
//! concrete value (a primitive, an aggregate, or a user-defined type)
//! behind one uniform interface. Handles are reference counted, so copies
//! are cheap regardless of the size of the payload, and the held value is
//! dropped only when the last handle releases it.
//!
//! Erasing the type does not erase the ability to work with it: a handle
//! can be queried for the held type, downcast safely, compared for content
//! equality, interned into a canonical shared instance, and serialized,
//! all without the caller naming the concrete type at compile time.
//!
//! ## Quick Example
//!
//! ```
//! use protean::Value;
//!
//! let value = Value::new(String::from("hello"));
//! assert!(value.is::<String>());
//! assert_eq!(value.downcast_ref::<String>()?, "hello");
//!
//! // Downcasts are checked, never reinterpreted
//! assert!(value.downcast_ref::<i64>().is_err());
//! # Ok::<(), protean::ValueError>(())
//! ```
//!
//! ## Core Concepts
//!
//! **Handles and access markers.** A [`Value<ReadWrite>`] is the unique
//! owner of its payload and can hand out mutable views; a
//! [`Value<ReadOnly>`] shares its payload freely but is immutable. The two
//! wrap the same reference-counted core and differ only in capability — see
//! [`markers`].
//!
//! **Handlers.** When a value is wrapped, a [handler](handlers) is compiled
//! into its operation table: equality, hashing, deep-cloning and text
//! formatting all dispatch through it. Types without a meaningful equality
//! register the [`Opaque`](handlers::Opaque) handler, making "never equal"
//! an explicit choice rather than an error case.
//!
//! **Interning.** The [`InternPool`] deduplicates structurally-equal
//! containers into one canonical, immutable instance, so that equality of
//! interned handles degrades to pointer identity:
//!
//! ```
//! use protean::Value;
//!
//! let a = Value::new(String::from("canonical")).intern();
//! let b = Value::new(String::from("canonical")).intern();
//! assert!(a.ptr_eq(&b));
//! ```
//!
//! **Serialization.** The [`SerializationRegistry`] maps `(type, format)`
//! pairs to codec functions registered by plugins; `BINARY`, `TEXT` and
//! `XML` are conventional format names, and the [`builtin`] module ships
//! codecs for the primitive types:
//!
//! ```
//! use protean::{Value, builtin, serialize::BINARY};
//!
//! builtin::install();
//!
//! let bytes = Value::new(42i64).serialize(BINARY)?;
//! let back = Value::deserialize(&bytes, BINARY)?;
//! assert!(back.content_eq(&Value::new(42i64)));
//! # Ok::<(), protean::ValueError>(())
//! ```
//!
//! For implementation details of the type-erased storage, see the
//! [`protean-internals`] crate.
//!
//! [`protean-internals`]: protean_internals
//!
//! ## Project Goals
//!
//! - **Uniform**: one handle type holds anything; every operation works
//!   without naming the concrete type.
//! - **Cheap to share**: copying a handle moves an atomic reference count,
//!   never the payload.
//! - **Total queries**: `is`, `content_eq`, `ptr_eq` and `is_intern` never
//!   fail; cross-type and empty comparisons answer `false`, keeping the
//!   operations usable for dictionary-key-style logic.
//! - **Explicit failures**: casts and codecs return typed errors
//!   ([`ValueError`]) at the point of the offending call; nothing is
//!   swallowed.
//! - **Thread-safe**: reference counts are atomic, handles are
//!   `Send + Sync`, and the pool and registry serialize their own access.
//! - **`no_std` friendly**: the default `std` feature only selects the lock
//!   implementation; the core needs `alloc` alone.
//!
//! [`Value<ReadWrite>`]: Value
//! [`Value<ReadOnly>`]: Value

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod builtin;
mod descriptor;
mod error;
pub mod handlers;
mod intern;
pub mod markers;
pub mod serialize;
mod sync;
mod value;

pub use descriptor::TypeDescriptor;
pub use error::ValueError;
pub use intern::InternPool;
pub use serialize::SerializationRegistry;
pub use value::Value;

/// Commonly used items, importable in one line.
pub mod prelude {
    pub use crate::{
        InternPool, SerializationRegistry, TypeDescriptor, Value, ValueError,
        markers::{ReadOnly, ReadWrite},
    };
}
