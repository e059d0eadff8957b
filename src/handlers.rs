//! Handlers that define how held values are compared, hashed, cloned and
//! formatted.
//!
//! A handler is chosen when a value is wrapped (implicitly by
//! [`Value::new`](crate::Value::new), or explicitly with
//! [`Value::new_custom`](crate::Value::new_custom)) and is compiled into
//! the holder's operation table. Every later operation on the type-erased
//! handle dispatches through it, so the behavior of equality, interning
//! fingerprints and text output is an explicit per-type registration choice.
//!
//! # Built-in Handlers
//!
//! ## [`Comparable`]
//!
//! For types implementing `PartialEq + Hash + Clone + Display + Debug`.
//! Delegates every operation to the type's own implementations. This is the
//! default handler used by [`Value::new`](crate::Value::new).
//!
//! ## [`Inspect`]
//!
//! For types implementing `PartialEq + Hash + Clone + Debug` but not
//! [`Display`](core::fmt::Display). The debug form doubles as the text
//! form.
//!
//! ## [`Opaque`]
//!
//! For types without a meaningful comparison. Equality always answers
//! `false`, so every wrapped value forms its own equality class: the
//! explicit counterpart of declaring "this type cannot be compared" at
//! registration time. Text output shows only the type name.
//!
//! ## [`Float`]
//!
//! For `f32`/`f64`, which lack a [`Hash`](core::hash::Hash)
//! implementation. Equality follows IEEE semantics (`NaN != NaN`); hashing
//! uses the normalized bit pattern so that `+0.0` and `-0.0`, which
//! compare equal, also hash equal.
//!
//! ## [`Bytes`]
//!
//! For `Vec<u8>`, which lacks [`Display`](core::fmt::Display). The text
//! form is lowercase hex.
//!
//! # Examples
//!
//! ```
//! use protean::{Value, handlers};
//!
//! // Comparable is the implicit default
//! let text = Value::new(String::from("hello"));
//!
//! // Types without an equality get wrapped explicitly as Opaque
//! #[derive(Clone)]
//! struct Token(u128);
//! let token = Value::new_custom::<handlers::Opaque, _>(Token(7));
//!
//! // An Opaque value never equals anything, including its own copies
//! assert!(!token.content_eq(&token.intern()));
//! assert!(text.content_eq(&text.intern()));
//! ```

use core::hash::{Hash, Hasher};

pub use protean_internals::handlers::ValueHandler;

/// Handler for types with intrinsic equality, hashing and formatting.
///
/// Delegates `eq`/`hash`/`clone`/`display`/`debug` straight to the type's
/// own trait implementations. This is the handler
/// [`Value::new`](crate::Value::new) uses.
#[derive(Copy, Clone)]
pub struct Comparable;

impl<V> ValueHandler<V> for Comparable
where
    V: PartialEq + Hash + Clone + core::fmt::Display + core::fmt::Debug + 'static,
{
    fn eq(a: &V, b: &V) -> bool {
        a == b
    }

    fn hash(value: &V, mut state: &mut dyn Hasher) {
        value.hash(&mut state)
    }

    fn clone(value: &V) -> V {
        value.clone()
    }

    fn display(value: &V, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(value, f)
    }

    fn debug(value: &V, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(value, f)
    }
}

/// Handler for comparable types without a [`Display`](core::fmt::Display)
/// implementation.
///
/// The debug representation is used for both text forms.
#[derive(Copy, Clone)]
pub struct Inspect;

impl<V> ValueHandler<V> for Inspect
where
    V: PartialEq + Hash + Clone + core::fmt::Debug + 'static,
{
    fn eq(a: &V, b: &V) -> bool {
        a == b
    }

    fn hash(value: &V, mut state: &mut dyn Hasher) {
        value.hash(&mut state)
    }

    fn clone(value: &V) -> V {
        value.clone()
    }

    fn display(value: &V, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(value, f)
    }

    fn debug(value: &V, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(value, f)
    }
}

/// Handler for types without a meaningful equality.
///
/// `eq` always answers `false`; two independently wrapped values of the
/// type are never considered equal, and interning places each in its own
/// equality class. This makes "no comparison defined" an explicit
/// registration choice while keeping equality total for every handle.
#[derive(Copy, Clone)]
pub struct Opaque;

impl<V> ValueHandler<V> for Opaque
where
    V: Clone + 'static,
{
    fn eq(_a: &V, _b: &V) -> bool {
        false
    }

    fn hash(_value: &V, mut state: &mut dyn Hasher) {
        // All values of the type share one fingerprint bucket; candidates
        // are told apart by identity, never by content.
        0u8.hash(&mut state)
    }

    fn clone(value: &V) -> V {
        value.clone()
    }

    fn display(_value: &V, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "<{}>", core::any::type_name::<V>())
    }

    fn debug(_value: &V, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "<{}>", core::any::type_name::<V>())
    }
}

/// Handler for the floating-point primitives.
///
/// `f32` and `f64` implement neither [`Hash`](core::hash::Hash) nor `Eq`,
/// so [`Comparable`] does not apply. Equality follows IEEE comparison
/// (`NaN` never equals itself); the fingerprint hash uses the bit pattern,
/// normalizing the two zero encodings so values that compare equal hash
/// equal.
#[derive(Copy, Clone)]
pub struct Float;

impl ValueHandler<f64> for Float {
    fn eq(a: &f64, b: &f64) -> bool {
        a == b
    }

    fn hash(value: &f64, mut state: &mut dyn Hasher) {
        let bits = if *value == 0.0 {
            0.0f64.to_bits()
        } else {
            value.to_bits()
        };
        bits.hash(&mut state)
    }

    fn clone(value: &f64) -> f64 {
        *value
    }

    fn display(value: &f64, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(value, f)
    }

    fn debug(value: &f64, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(value, f)
    }
}

impl ValueHandler<f32> for Float {
    fn eq(a: &f32, b: &f32) -> bool {
        a == b
    }

    fn hash(value: &f32, mut state: &mut dyn Hasher) {
        let bits = if *value == 0.0 {
            0.0f32.to_bits()
        } else {
            value.to_bits()
        };
        bits.hash(&mut state)
    }

    fn clone(value: &f32) -> f32 {
        *value
    }

    fn display(value: &f32, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(value, f)
    }

    fn debug(value: &f32, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(value, f)
    }
}

/// Handler for raw byte buffers.
///
/// `Vec<u8>` has no [`Display`](core::fmt::Display) implementation; the
/// text form is lowercase hex without a separator.
#[derive(Copy, Clone)]
pub struct Bytes;

impl ValueHandler<alloc::vec::Vec<u8>> for Bytes {
    fn eq(a: &alloc::vec::Vec<u8>, b: &alloc::vec::Vec<u8>) -> bool {
        a == b
    }

    fn hash(value: &alloc::vec::Vec<u8>, mut state: &mut dyn Hasher) {
        value.hash(&mut state)
    }

    fn clone(value: &alloc::vec::Vec<u8>) -> alloc::vec::Vec<u8> {
        value.clone()
    }

    fn display(value: &alloc::vec::Vec<u8>, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for byte in value {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }

    fn debug(value: &alloc::vec::Vec<u8>, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(value, f)
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, vec};

    use super::*;
    use crate::Value;

    #[test]
    fn comparable_delegates_to_the_type() {
        let a = Value::new(10i64);
        let b = Value::new(10i64);
        let c = Value::new(11i64);

        assert!(a.content_eq(&b));
        assert!(!a.content_eq(&c));
        assert_eq!(format!("{a}"), "10");
    }

    #[test]
    fn opaque_is_never_equal() {
        #[derive(Clone)]
        struct NoEq;

        let a = Value::new_custom::<Opaque, _>(NoEq);
        let b = Value::new_custom::<Opaque, _>(NoEq);

        assert!(!a.content_eq(&b));
        assert!(!a.content_eq(&a));
    }

    #[test]
    fn float_zero_encodings_hash_equal() {
        fn fingerprint(value: &Value) -> u64 {
            let mut hasher = rustc_hash::FxHasher::default();
            value.content_hash(&mut hasher);
            core::hash::Hasher::finish(&hasher)
        }

        let pos = Value::new_custom::<Float, _>(0.0f64);
        let neg = Value::new_custom::<Float, _>(-0.0f64);

        assert!(pos.content_eq(&neg));
        assert_eq!(fingerprint(&pos), fingerprint(&neg));
    }

    #[test]
    fn nan_is_not_equal_to_itself() {
        let nan = Value::new_custom::<Float, _>(f64::NAN);
        assert!(!nan.content_eq(&nan));
    }

    #[test]
    fn bytes_display_as_hex() {
        let bytes = Value::new_custom::<Bytes, _>(vec![0x00u8, 0xab, 0x0f]);
        assert_eq!(format!("{bytes}"), "00ab0f");
    }
}
