//! Pluggable serialization over the type-erased container.
//!
//! The registry is a pure lookup table populated by type plugins at process
//! start: an encoder per `(held type, format)` pair and a decoder per
//! `(wire tag, format)` pair. The core never hardwires a codec: the
//! [`BINARY`], [`TEXT`] and [`XML`] constants are format *names* recognized
//! by convention, and plugins may register additional format names freely.
//! Format strings are matched case-sensitively.
//!
//! # Envelope
//!
//! Serialized bytes are self-describing: `tag ':' payload`, where `tag` is
//! the colon-free wire tag the type registered under. The prefix is what
//! lets [`deserialize`](SerializationRegistry::deserialize) route payloads
//! to the right plugin without the caller naming a type. The envelope is
//! the same in every format, so `TEXT` output stays printable (the tag is
//! ASCII) and `BINARY` payloads may contain arbitrary bytes.
//!
//! # Examples
//!
//! ```
//! use protean::{Value, builtin, serialize::BINARY};
//!
//! builtin::install();
//!
//! let value = Value::new(7i64);
//! let bytes = value.serialize(BINARY)?;
//! let back = Value::deserialize(&bytes, BINARY)?;
//! assert!(back.content_eq(&value));
//! # Ok::<(), protean::ValueError>(())
//! ```

use alloc::{sync::Arc, vec::Vec};
use core::any::TypeId;

use hashbrown::HashMap;
use indexmap::IndexMap;
use protean_internals::RawValueRef;
use rustc_hash::FxBuildHasher;

use crate::{markers::AccessMarker, sync::Shared, value::Value, ValueError};

/// Conventional name of the compact, platform-independent binary format.
pub const BINARY: &str = "BINARY";

/// Conventional name of the portable, printable text format.
pub const TEXT: &str = "TEXT";

/// Conventional name of the structured markup format.
pub const XML: &str = "XML";

/// Type-erased encoder: borrows the holder, returns the payload bytes.
type ErasedEncode = Arc<dyn Fn(RawValueRef<'_>) -> Result<Vec<u8>, ValueError> + Send + Sync>;

/// Decoder: parses payload bytes into a fresh read-write handle.
type ErasedDecode = Arc<dyn Fn(&[u8]) -> Result<Value, ValueError> + Send + Sync>;

/// Per-format decoder table of one wire tag.
type TagDecoders = HashMap<&'static str, ErasedDecode, FxBuildHasher>;

/// The codecs registered for one concrete type.
struct TypeCodecs {
    /// Wire tag written into the envelope; stable across registrations.
    tag: &'static str,
    /// Encoders keyed by format name, in registration order.
    encoders: IndexMap<&'static str, ErasedEncode, FxBuildHasher>,
}

struct RegistryInner {
    by_type: HashMap<TypeId, TypeCodecs, FxBuildHasher>,
    by_tag: HashMap<&'static str, TagDecoders, FxBuildHasher>,
}

/// Lookup table mapping `(type, format)` to codec functions.
///
/// A const-constructed, lock-protected registry lives for the process
/// lifetime behind [`SerializationRegistry::global`] and backs
/// [`Value::serialize`] and [`Value::deserialize`]; fresh registries can be
/// constructed directly where isolation matters.
///
/// Codec functions run outside the registry lock, so an encoder or decoder
/// may itself serialize or deserialize nested handles.
pub struct SerializationRegistry {
    inner: Shared<RegistryInner>,
}

static GLOBAL: SerializationRegistry = SerializationRegistry::new();

impl SerializationRegistry {
    /// Creates a fresh, empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: Shared::new(RegistryInner {
                by_type: HashMap::with_hasher(FxBuildHasher),
                by_tag: HashMap::with_hasher(FxBuildHasher),
            }),
        }
    }

    /// Returns the process-wide registry used by [`Value::serialize`] and
    /// [`Value::deserialize`].
    #[must_use]
    pub fn global() -> &'static SerializationRegistry {
        &GLOBAL
    }

    /// Registers the codec pair for type `V` in the named format.
    ///
    /// `tag` is the wire tag written into the envelope; it must be
    /// non-empty, colon-free, and identical across every registration of
    /// `V`. Registering the same `(type, format)` pair again replaces the
    /// previous codec.
    ///
    /// The `encode` function receives the held value; the `decode` function
    /// receives the payload (envelope already stripped) and constructs a
    /// fresh handle, choosing the handler appropriate for the type.
    pub fn register<V: 'static>(
        &self,
        tag: &'static str,
        format: &'static str,
        encode: impl Fn(&V) -> Result<Vec<u8>, ValueError> + Send + Sync + 'static,
        decode: impl Fn(&[u8]) -> Result<Value, ValueError> + Send + Sync + 'static,
    ) {
        debug_assert!(
            !tag.is_empty() && !tag.contains(':'),
            "wire tags must be non-empty and colon-free"
        );

        let encode: ErasedEncode = Arc::new(move |raw: RawValueRef<'_>| {
            if raw.value_type_id() != TypeId::of::<V>() {
                return Err(ValueError::TypeMismatch {
                    requested: core::any::type_name::<V>(),
                    actual: raw.value_type_name(),
                });
            }
            // SAFETY: The stored type id was checked above
            let value = unsafe { raw.value_downcast_unchecked::<V>() };
            encode(value)
        });

        let mut inner = self.inner.write();
        let codecs = inner
            .by_type
            .entry(TypeId::of::<V>())
            .or_insert_with(|| TypeCodecs {
                tag,
                encoders: IndexMap::default(),
            });
        debug_assert_eq!(codecs.tag, tag, "a type's wire tag must be stable");
        codecs.encoders.insert(format, encode);
        inner
            .by_tag
            .entry(tag)
            .or_insert_with(|| HashMap::with_hasher(FxBuildHasher))
            .insert(format, Arc::new(decode));

        log::debug!("registered `{format}` codec for wire tag `{tag}`");
    }

    /// Returns `true` if an encoder is registered for `(V, format)`.
    #[must_use]
    pub fn supports<V: 'static>(&self, format: &str) -> bool {
        let inner = self.inner.read();
        inner
            .by_type
            .get(&TypeId::of::<V>())
            .is_some_and(|codecs| codecs.encoders.contains_key(format))
    }

    /// Returns the formats registered for `V`, in registration order.
    #[must_use]
    pub fn formats_for<V: 'static>(&self) -> Vec<&'static str> {
        let inner = self.inner.read();
        inner
            .by_type
            .get(&TypeId::of::<V>())
            .map(|codecs| codecs.encoders.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the wire tag `V` registered under, if any.
    #[must_use]
    pub fn tag_for<V: 'static>(&self) -> Option<&'static str> {
        let inner = self.inner.read();
        inner.by_type.get(&TypeId::of::<V>()).map(|codecs| codecs.tag)
    }

    /// Serializes a handle's content into the named format.
    ///
    /// # Errors
    ///
    /// Fails with [`ValueError::EmptyContainer`] on an empty handle and
    /// [`ValueError::UnsupportedFormat`] when no encoder is registered for
    /// the `(held type, format)` pair; encoder failures are forwarded. No
    /// partial bytes are ever returned.
    pub fn serialize<A: AccessMarker>(
        &self,
        value: &Value<A>,
        format: &str,
    ) -> Result<Vec<u8>, ValueError> {
        let Some(raw) = value.as_raw_ref() else {
            return Err(ValueError::EmptyContainer);
        };

        let (tag, encode) = {
            let inner = self.inner.read();
            let codecs = inner
                .by_type
                .get(&raw.value_type_id())
                .ok_or_else(|| ValueError::unsupported(format, raw.value_type_name()))?;
            let encode = codecs
                .encoders
                .get(format)
                .ok_or_else(|| ValueError::unsupported(format, raw.value_type_name()))?;
            (codecs.tag, Arc::clone(encode))
        };

        let payload = encode(raw)?;

        let mut bytes = Vec::with_capacity(tag.len() + 1 + payload.len());
        bytes.extend_from_slice(tag.as_bytes());
        bytes.push(b':');
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    /// Reconstructs a handle from serialized bytes.
    ///
    /// All-or-nothing: on failure no handle is constructed.
    ///
    /// # Errors
    ///
    /// Fails with [`ValueError::MalformedData`] when the envelope or the
    /// payload does not parse, and [`ValueError::UnsupportedFormat`] when
    /// the embedded wire tag has no decoder registered for the format.
    pub fn deserialize(&self, bytes: &[u8], format: &str) -> Result<Value, ValueError> {
        let split = bytes
            .iter()
            .position(|&byte| byte == b':')
            .ok_or_else(|| ValueError::malformed(format, "missing `tag:` envelope prefix"))?;
        let tag = core::str::from_utf8(&bytes[..split])
            .map_err(|_| ValueError::malformed(format, "wire tag is not valid UTF-8"))?;

        let decode = {
            let inner = self.inner.read();
            let decoders = inner
                .by_tag
                .get(tag)
                .ok_or_else(|| ValueError::unsupported(format, tag))?;
            let decode = decoders
                .get(format)
                .ok_or_else(|| ValueError::unsupported(format, tag))?;
            Arc::clone(decode)
        };

        decode(&bytes[split + 1..])
    }
}

impl Default for SerializationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::ToString, vec};

    use super::*;

    fn test_registry() -> SerializationRegistry {
        let registry = SerializationRegistry::new();
        registry.register::<i64>(
            "i64",
            TEXT,
            |value| Ok(value.to_string().into_bytes()),
            |bytes| {
                core::str::from_utf8(bytes)
                    .ok()
                    .and_then(|text| text.parse::<i64>().ok())
                    .map(Value::new)
                    .ok_or_else(|| ValueError::malformed(TEXT, "invalid integer literal"))
            },
        );
        registry
    }

    #[test]
    fn envelope_carries_the_wire_tag() {
        let registry = test_registry();
        let bytes = registry.serialize(&Value::new(42i64), TEXT).unwrap();
        assert_eq!(bytes, b"i64:42");
    }

    #[test]
    fn roundtrip_preserves_content() {
        let registry = test_registry();
        let original = Value::new(-7i64);
        let bytes = registry.serialize(&original, TEXT).unwrap();
        let back = registry.deserialize(&bytes, TEXT).unwrap();
        assert!(back.content_eq(&original));
    }

    #[test]
    fn unknown_format_is_rejected() {
        let registry = test_registry();
        let result = registry.serialize(&Value::new(1i64), "NOPE");
        assert!(matches!(result, Err(ValueError::UnsupportedFormat { .. })));
    }

    #[test]
    fn unregistered_type_is_rejected() {
        let registry = test_registry();
        let result = registry.serialize(&Value::new(true), TEXT);
        assert!(matches!(result, Err(ValueError::UnsupportedFormat { .. })));
    }

    #[test]
    fn empty_handles_do_not_serialize() {
        let registry = test_registry();
        let empty: Value = Value::empty();
        let result = registry.serialize(&empty, TEXT);
        assert!(matches!(result, Err(ValueError::EmptyContainer)));
    }

    #[test]
    fn malformed_envelope_is_rejected() {
        let registry = test_registry();
        assert!(matches!(
            registry.deserialize(b"no envelope here", TEXT),
            Err(ValueError::MalformedData { .. })
        ));
        assert!(matches!(
            registry.deserialize(b"unknown:1", TEXT),
            Err(ValueError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            registry.deserialize(b"i64:not a number", TEXT),
            Err(ValueError::MalformedData { .. })
        ));
    }

    #[test]
    fn lookup_reports_registrations() {
        let registry = test_registry();
        registry.register::<i64>(
            "i64",
            BINARY,
            |value| Ok(value.to_le_bytes().to_vec()),
            |_| Err(ValueError::malformed(BINARY, "unused")),
        );

        assert!(registry.supports::<i64>(TEXT));
        assert!(registry.supports::<i64>(BINARY));
        assert!(!registry.supports::<i64>(XML));
        assert!(!registry.supports::<bool>(TEXT));
        assert_eq!(registry.formats_for::<i64>(), vec![TEXT, BINARY]);
        assert_eq!(registry.tag_for::<i64>(), Some("i64"));
        assert_eq!(registry.tag_for::<bool>(), None);
    }
}
