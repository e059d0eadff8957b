//! Process-wide deduplication of equal values into canonical handles.
//!
//! Interning folds structurally-equal containers onto one shared, immutable
//! instance, so that equality of interned handles degrades to pointer
//! identity ([`Value::ptr_eq`]). The pool buckets candidates by a cheap
//! content fingerprint and confirms with full
//! [`content_eq`](Value::content_eq); fingerprint collisions are expected
//! and resolved, never assumed unique.
//!
//! A const-constructed, lock-protected pool lives for the process lifetime
//! behind [`InternPool::global`]; fresh pools can be constructed directly
//! where isolation matters (tests, scoped deduplication).
//!
//! # Examples
//!
//! ```
//! use protean::Value;
//!
//! let a = Value::new(String::from("shared")).intern();
//! let b = Value::new(String::from("shared")).intern();
//!
//! // Equal content converges on one canonical holder
//! assert!(a.ptr_eq(&b));
//! assert!(a.is_intern());
//! ```

use alloc::vec::Vec;
use core::hash::{Hash, Hasher};

use hashbrown::HashMap;
use protean_internals::RawValueRef;
use rustc_hash::{FxBuildHasher, FxHasher};

use crate::{
    markers::{AccessMarker, ReadOnly},
    sync::Shared,
    value::Value,
};

/// Fingerprint-bucketed store of canonical handles.
type Buckets = HashMap<u64, Vec<Value<ReadOnly>>, FxBuildHasher>;

/// A deduplication pool mapping content to canonical shared handles.
///
/// At most one canonical handle exists per distinct content value at any
/// time, and the first handle inserted for a given content stays canonical
/// for the pool's lifetime: later structurally-equal candidates never
/// displace it, so identity comparisons done by earlier callers stay valid.
/// There is no eviction; the global pool is torn down with the process.
pub struct InternPool {
    buckets: Shared<Buckets>,
}

static GLOBAL: InternPool = InternPool::new();

impl InternPool {
    /// Creates a fresh, empty pool.
    ///
    /// Useful in tests and anywhere an isolated deduplication domain is
    /// preferable to the process-wide pool.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buckets: Shared::new(HashMap::with_hasher(FxBuildHasher)),
        }
    }

    /// Returns the process-wide pool used by [`Value::intern`].
    #[must_use]
    pub fn global() -> &'static InternPool {
        &GLOBAL
    }

    /// Returns the canonical handle for the given handle's content,
    /// inserting one if none exists yet.
    ///
    /// The argument is never modified. The result is read-only: interned
    /// values are immutable. Interning an empty handle returns an empty
    /// handle without touching the pool.
    ///
    /// Lookup is identity-first: a handle that already *is* the canonical
    /// entry is returned as-is, which keeps interning idempotent even for
    /// types whose equality always answers `false`.
    ///
    /// Concurrent interns of equal content converge: the insert path
    /// re-checks under the write lock, so exactly one canonical handle
    /// exists once all calls return.
    pub fn intern<A: AccessMarker>(&self, value: &Value<A>) -> Value<ReadOnly> {
        let Some(raw) = value.as_raw_ref() else {
            return Value::empty();
        };
        let fingerprint = fingerprint(raw);

        {
            let buckets = self.buckets.read();
            if let Some(canonical) = find_canonical(&buckets, fingerprint, value) {
                return canonical;
            }
        }

        // Prepare the insertable handle before taking the write lock; on a
        // lost race the copy is simply discarded.
        let candidate = A::make_shareable(value);

        let mut buckets = self.buckets.write();
        if let Some(canonical) = find_canonical(&buckets, fingerprint, value) {
            return canonical;
        }

        log::trace!(
            "interning new canonical value of type `{}`",
            raw.value_type_name()
        );
        buckets
            .entry(fingerprint)
            .or_default()
            .push(candidate.clone());
        candidate
    }

    /// Returns `true` if the handle's holder is the current canonical entry
    /// for its content.
    ///
    /// This query is total; empty handles answer `false`. A handle whose
    /// content is interned but whose holder is not the canonical allocation
    /// also answers `false`; that distinction is exactly what
    /// [`intern`](InternPool::intern) collapses.
    pub fn is_canonical<A: AccessMarker>(&self, value: &Value<A>) -> bool {
        let Some(raw) = value.as_raw_ref() else {
            return false;
        };
        let fingerprint = fingerprint(raw);
        let buckets = self.buckets.read();
        buckets
            .get(&fingerprint)
            .is_some_and(|bucket| bucket.iter().any(|canonical| canonical.ptr_eq(value)))
    }

    /// Returns the number of canonical entries in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.read().values().map(Vec::len).sum()
    }

    /// Returns `true` if the pool holds no canonical entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InternPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes the bucketing fingerprint of a holder: the held type's id plus
/// the handler-provided content hash.
fn fingerprint(raw: RawValueRef<'_>) -> u64 {
    let mut hasher = FxHasher::default();
    raw.value_type_id().hash(&mut hasher);
    raw.value_hash(&mut hasher);
    hasher.finish()
}

/// Scans a bucket for an entry matching the handle by identity or content.
fn find_canonical<A: AccessMarker>(
    buckets: &Buckets,
    fingerprint: u64,
    value: &Value<A>,
) -> Option<Value<ReadOnly>> {
    let bucket = buckets.get(&fingerprint)?;
    bucket
        .iter()
        .find(|canonical| canonical.ptr_eq(value) || canonical.content_eq(value))
        .cloned()
}
