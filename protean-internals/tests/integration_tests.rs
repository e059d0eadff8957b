//! Integration tests for the protean-internals crate.
//!
//! These tests exercise the type-erased holder through its public surface:
//! construction, type queries, downcasting, equality and hashing dispatch,
//! reference counting, deep copies, and mutable access.

use core::{
    any::TypeId,
    fmt,
    hash::{Hash, Hasher},
};

use protean_internals::{RawValue, RawValueRef, handlers::ValueHandler};

struct Standard;

macro_rules! standard_handler {
    ($ty:ty) => {
        impl ValueHandler<$ty> for Standard {
            fn eq(a: &$ty, b: &$ty) -> bool {
                a == b
            }

            fn hash(value: &$ty, mut state: &mut dyn Hasher) {
                value.hash(&mut state)
            }

            fn clone(value: &$ty) -> $ty {
                value.clone()
            }

            fn display(value: &$ty, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(value, f)
            }

            fn debug(value: &$ty, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(value, f)
            }
        }
    };
}

standard_handler!(i64);
standard_handler!(u32);
standard_handler!(String);

/// Handler that deliberately never considers two values equal.
struct Never;

impl ValueHandler<Vec<i64>> for Never {
    fn eq(_a: &Vec<i64>, _b: &Vec<i64>) -> bool {
        false
    }

    fn hash(_value: &Vec<i64>, mut state: &mut dyn Hasher) {
        0u8.hash(&mut state)
    }

    fn clone(value: &Vec<i64>) -> Vec<i64> {
        value.clone()
    }

    fn display(_value: &Vec<i64>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<uncomparable>")
    }

    fn debug(value: &Vec<i64>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(value, f)
    }
}

/// Formats through a holder's vtable dispatch for assertions.
struct DisplayVia<'a>(RawValueRef<'a>);

impl fmt::Display for DisplayVia<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.value_display(f)
    }
}

struct DebugVia<'a>(RawValueRef<'a>);

impl fmt::Display for DebugVia<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.value_debug(f)
    }
}

fn fx_like_fingerprint(value: RawValueRef<'_>) -> u64 {
    let mut hasher = std::hash::DefaultHasher::new();
    value.value_type_id().hash(&mut hasher);
    value.value_hash(&mut hasher);
    hasher.finish()
}

#[test]
fn test_creation_and_type_queries() {
    let int_value = RawValue::new::<i64, Standard>(42);
    let string_value = RawValue::new::<String, Standard>("hello".to_string());

    assert_eq!(int_value.as_ref().value_type_id(), TypeId::of::<i64>());
    assert_eq!(string_value.as_ref().value_type_id(), TypeId::of::<String>());
    assert!(int_value.as_ref().value_type_name().contains("i64"));
    assert_eq!(
        int_value.as_ref().value_handler_type_id(),
        TypeId::of::<Standard>()
    );
}

#[test]
fn test_downcast_roundtrip() {
    let value = RawValue::new::<String, Standard>("payload".to_string());
    let value_ref = value.as_ref();

    assert_eq!(value_ref.value_type_id(), TypeId::of::<String>());
    // SAFETY: The type id was checked above
    let inner = unsafe { value_ref.value_downcast_unchecked::<String>() };
    assert_eq!(inner, "payload");
}

#[test]
fn test_equality_dispatch() {
    let a = RawValue::new::<i64, Standard>(1);
    let b = RawValue::new::<i64, Standard>(1);
    let c = RawValue::new::<i64, Standard>(2);

    assert!(a.as_ref().value_eq(b.as_ref()));
    assert!(!a.as_ref().value_eq(c.as_ref()));
    // Reflexive on the same allocation too
    assert!(a.as_ref().value_eq(a.as_ref()));
}

#[test]
fn test_equality_cross_type_is_false() {
    let int_value = RawValue::new::<i64, Standard>(7);
    let uint_value = RawValue::new::<u32, Standard>(7);
    let string_value = RawValue::new::<String, Standard>("7".to_string());

    // Same numeric content, different concrete types
    assert!(!int_value.as_ref().value_eq(uint_value.as_ref()));
    assert!(!uint_value.as_ref().value_eq(int_value.as_ref()));
    assert!(!int_value.as_ref().value_eq(string_value.as_ref()));
}

#[test]
fn test_never_equal_handler() {
    let a = RawValue::new::<Vec<i64>, Never>(vec![1, 2, 3]);
    let b = RawValue::new::<Vec<i64>, Never>(vec![1, 2, 3]);

    // The handler declared all comparisons false, even for identical content
    assert!(!a.as_ref().value_eq(b.as_ref()));
    assert!(!a.as_ref().value_eq(a.as_ref()));
}

#[test]
fn test_fingerprint_agreement() {
    let a = RawValue::new::<String, Standard>("fingerprint".to_string());
    let b = RawValue::new::<String, Standard>("fingerprint".to_string());
    let c = RawValue::new::<String, Standard>("different".to_string());

    assert_eq!(
        fx_like_fingerprint(a.as_ref()),
        fx_like_fingerprint(b.as_ref())
    );
    assert_ne!(
        fx_like_fingerprint(a.as_ref()),
        fx_like_fingerprint(c.as_ref())
    );
}

#[test]
fn test_display_and_debug_dispatch() {
    let int_value = RawValue::new::<i64, Standard>(42);
    let string_value = RawValue::new::<String, Standard>("text".to_string());
    let opaque = RawValue::new::<Vec<i64>, Never>(vec![9]);

    assert_eq!(format!("{}", DisplayVia(int_value.as_ref())), "42");
    assert_eq!(format!("{}", DisplayVia(string_value.as_ref())), "text");
    assert_eq!(format!("{}", DebugVia(string_value.as_ref())), "\"text\"");
    assert_eq!(format!("{}", DisplayVia(opaque.as_ref())), "<uncomparable>");
}

#[test]
fn test_reference_counting() {
    let value = RawValue::new::<i64, Standard>(10);
    assert_eq!(value.as_ref().strong_count(), 1);

    // SAFETY: There are no assumptions about single ownership
    let shared = unsafe { value.as_ref().clone_arc() };
    assert_eq!(value.as_ref().strong_count(), 2);
    assert!(value.as_ref().ptr_eq(shared.as_ref()));

    drop(shared);
    assert_eq!(value.as_ref().strong_count(), 1);
}

#[test]
fn test_clone_value_deep_copy() {
    let value = RawValue::new::<String, Standard>("canonical".to_string());

    // SAFETY: There are no assumptions about single ownership
    let shared = unsafe { value.as_ref().clone_arc() };
    let copy = value.as_ref().clone_value();

    // The deep copy has its own allocation and count, but equal content
    assert!(!copy.as_ref().ptr_eq(value.as_ref()));
    assert_eq!(copy.as_ref().strong_count(), 1);
    assert_eq!(value.as_ref().strong_count(), 2);
    assert!(copy.as_ref().value_eq(value.as_ref()));
    assert!(copy.as_ref().value_eq(shared.as_ref()));
}

#[test]
fn test_mutation_through_unique_holder() {
    let mut value = RawValue::new::<String, Standard>("before".to_string());

    {
        // SAFETY: We hold the only reference; the strong count is 1
        let value_mut = unsafe { value.as_mut() };
        // SAFETY: The holder was created with type String above
        let inner = unsafe { value_mut.value_downcast_mut_unchecked::<String>() };
        inner.push_str(" and after");
    }

    assert_eq!(format!("{}", DisplayVia(value.as_ref())), "before and after");
}

#[test]
fn test_vtable_identity_per_type_handler_pair() {
    let a = RawValue::new::<i64, Standard>(1);
    let b = RawValue::new::<i64, Standard>(2);
    let c = RawValue::new::<u32, Standard>(3);

    // Same (type, handler) pair shares one vtable; the pointers observable
    // through type ids must agree
    assert_eq!(a.as_ref().value_type_id(), b.as_ref().value_type_id());
    assert_ne!(a.as_ref().value_type_id(), c.as_ref().value_type_id());
    assert_eq!(
        a.as_ref().value_handler_type_id(),
        c.as_ref().value_handler_type_id()
    );
}
