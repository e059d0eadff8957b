//! Built-in value plugins.
//!
//! The container core never hardwires a codec; this module is the standard
//! plugin set that registers the primitive types against the
//! [`SerializationRegistry`]: `bool`, the fixed-width integers, `f32`/`f64`,
//! [`String`], `Vec<u8>`, and nested lists of read-only handles.
//!
//! Call [`install`] once at process start (or [`install_in`] against an
//! isolated registry). Coverage per format:
//!
//! | format   | types                                         |
//! |----------|-----------------------------------------------|
//! | `BINARY` | all of the above, little-endian fixed-width   |
//! | `TEXT`   | all except lists, as their display form       |
//! | `XML`    | all except lists (feature `xml`)              |
//!
//! Registering a `(type, format)` pair sparsely is deliberate: a format
//! lookup that misses answers
//! [`UnsupportedFormat`](crate::ValueError::UnsupportedFormat), which is
//! the contract callers probe with
//! [`supports`](SerializationRegistry::supports).
//!
//! # Examples
//!
//! ```
//! use protean::{Value, builtin, serialize::TEXT};
//!
//! builtin::install();
//!
//! let bytes = Value::new(true).serialize(TEXT)?;
//! assert_eq!(bytes, b"bool:true");
//! # Ok::<(), protean::ValueError>(())
//! ```

use alloc::vec::Vec;
use core::hash::{Hash, Hasher};

use crate::{
    handlers::ValueHandler, markers::ReadOnly, serialize::SerializationRegistry, value::Value,
};

mod binary;
mod text;
#[cfg(feature = "xml")]
mod xml;

/// Handler for lists of read-only handles.
///
/// A list is a `Vec<Value<ReadOnly>>`: elements may hold any mix of types.
/// Equality and hashing are element-wise over the handles' contents;
/// cloning is shallow (the elements are shared). The text form is
/// `[a, b, c]` over the elements' display forms.
#[derive(Copy, Clone)]
pub struct List;

impl ValueHandler<Vec<Value<ReadOnly>>> for List {
    fn eq(a: &Vec<Value<ReadOnly>>, b: &Vec<Value<ReadOnly>>) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.content_eq(y))
    }

    fn hash(value: &Vec<Value<ReadOnly>>, mut state: &mut dyn Hasher) {
        value.len().hash(&mut state);
        for item in value {
            item.content_hash(state);
        }
    }

    fn clone(value: &Vec<Value<ReadOnly>>) -> Vec<Value<ReadOnly>> {
        value.clone()
    }

    fn display(
        value: &Vec<Value<ReadOnly>>,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        f.write_str("[")?;
        for (index, item) in value.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{item}")?;
        }
        f.write_str("]")
    }

    fn debug(value: &Vec<Value<ReadOnly>>, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(value.iter()).finish()
    }
}

/// Registers the built-in codecs with the process-wide registry.
///
/// Idempotent: re-installing replaces the codecs with identical ones.
pub fn install() {
    install_in(SerializationRegistry::global());
}

/// Registers the built-in codecs with the given registry.
///
/// Note that the list codec resolves *element* codecs through the
/// process-wide registry (a codec closure cannot hold a reference back to
/// the registry that owns it). When using isolated registries, install into
/// the global registry as well if lists are serialized.
pub fn install_in(registry: &SerializationRegistry) {
    binary::install(registry);
    text::install(registry);
    #[cfg(feature = "xml")]
    xml::install(registry);
}

#[cfg(test)]
mod tests {
    use alloc::{format, vec};

    use super::*;

    fn sample_list() -> Value {
        Value::new_custom::<List, _>(vec![
            Value::new(1i64).into_read_only(),
            Value::from("two").into_read_only(),
        ])
    }

    #[test]
    fn list_equality_is_element_wise() {
        let a = sample_list();
        let b = sample_list();
        let c = Value::new_custom::<List, _>(vec![Value::new(1i64).into_read_only()]);

        assert!(a.content_eq(&b));
        assert!(!a.content_eq(&c));
    }

    #[test]
    fn list_display_shows_elements() {
        assert_eq!(format!("{}", sample_list()), "[1, two]");
    }

    #[test]
    fn lists_intern_by_content() {
        let pool = crate::InternPool::new();
        let a = pool.intern(&sample_list());
        let b = pool.intern(&sample_list());
        assert!(a.ptr_eq(&b));
    }
}
