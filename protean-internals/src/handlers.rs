//! Handlers that define equality, hashing, cloning and formatting behavior
//! for held values.
//!
//! A handler is the per-type capability table of the container: when a value
//! is wrapped, the handler chosen at that moment is compiled into the
//! value's vtable, and every later operation on the type-erased holder
//! dispatches through it. The holder itself never inspects the concrete
//! type again.

use core::hash::Hasher;

/// Trait for implementing per-type container behavior.
///
/// This trait defines how a held value is compared, fingerprinted, deeply
/// cloned and formatted once its concrete type has been erased. Every
/// operation is a static method: handlers are never instantiated, they only
/// parameterize the vtable built when a value is wrapped.
///
/// # When to Implement
///
/// You typically don't need to implement this trait directly. The protean
/// library provides built-in handlers covering the common cases, including
/// an explicit always-false-equality handler for types without a meaningful
/// comparison.
///
/// Implement this trait when a type needs behavior the built-in handlers
/// don't provide, such as:
/// - Equality that differs from the type's `PartialEq` implementation
/// - Hashing for types that don't implement `Hash` (e.g. bit-pattern
///   hashing for floats)
/// - Display output that differs from the type's `Display` implementation
///
/// # Contract
///
/// - [`eq`](ValueHandler::eq) and [`hash`](ValueHandler::hash) must agree:
///   values that compare equal must hash identically. The container's
///   intern pool buckets candidates by hash before confirming with `eq`, so
///   a violation produces duplicate canonical entries.
/// - A handler whose `eq` always returns `false` is valid; it declares that
///   no two values of the type are ever considered equal. Such types still
///   intern (every value forms its own equality class).
/// - [`clone`](ValueHandler::clone) must produce a value that is equal to
///   the original under [`eq`](ValueHandler::eq), hashes identically, and
///   has no observable sharing with it.
///
/// # Examples
///
/// ```
/// use core::hash::{Hash, Hasher};
///
/// use protean_internals::handlers::ValueHandler;
///
/// struct CaseInsensitive;
///
/// impl ValueHandler<String> for CaseInsensitive {
///     fn eq(a: &String, b: &String) -> bool {
///         a.eq_ignore_ascii_case(b)
///     }
///
///     fn hash(value: &String, mut state: &mut dyn Hasher) {
///         value.to_ascii_lowercase().hash(&mut state)
///     }
///
///     fn clone(value: &String) -> String {
///         value.clone()
///     }
///
///     fn display(value: &String, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
///         core::fmt::Display::fmt(value, f)
///     }
///
///     fn debug(value: &String, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
///         core::fmt::Debug::fmt(value, f)
///     }
/// }
/// ```
pub trait ValueHandler<V>: 'static {
    /// Compares two values of the handled type for content equality.
    ///
    /// The container guarantees that both arguments hold the same concrete
    /// type before delegating here; cross-type comparisons are answered
    /// (with `false`) at the vtable layer and never reach the handler.
    fn eq(a: &V, b: &V) -> bool;

    /// Feeds the value's content into the given hasher.
    ///
    /// Used to fingerprint values for intern-pool bucketing. Must be
    /// consistent with [`eq`](ValueHandler::eq): equal values hash equal.
    /// The hasher is type-erased so the vtable entry has a fixed signature;
    /// `&mut dyn Hasher` itself implements [`Hasher`], so `Hash`
    /// implementations can be used directly:
    ///
    /// ```
    /// # use core::hash::{Hash, Hasher};
    /// fn hash(value: &u64, mut state: &mut dyn Hasher) {
    ///     value.hash(&mut state)
    /// }
    /// ```
    fn hash(value: &V, state: &mut dyn Hasher);

    /// Produces a deep copy of the value.
    ///
    /// Called when a fresh holder must be allocated for existing content,
    /// e.g. when interning a uniquely-owned read-write handle.
    fn clone(value: &V) -> V;

    /// Formats the value using display-style formatting.
    ///
    /// This is the human-readable text form of the value, used by the
    /// container's `Display` implementation.
    fn display(value: &V, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result;

    /// Formats the value using debug-style formatting.
    fn debug(value: &V, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result;
}
