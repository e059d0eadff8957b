//! The failure surface of the container.
//!
//! Every fallible operation on a [`Value`](crate::Value) reports one of the
//! variants below at the point of the offending call; nothing is silently
//! swallowed. The query operations (`is`, `content_eq`, `is_intern`) are
//! deliberately total and never produce an error, so they remain usable for
//! dictionary-key-style logic.

use alloc::string::String;

/// Errors produced by container operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ValueError {
    /// A type query, cast, or serialization was attempted on an empty
    /// handle.
    #[error("operation requires a non-empty value")]
    EmptyContainer,

    /// A downcast requested a type other than the one the handle holds.
    #[error("value holds a `{actual}`, cannot access it as a `{requested}`")]
    TypeMismatch {
        /// The type the caller asked for.
        requested: &'static str,
        /// The type actually stored in the handle.
        actual: &'static str,
    },

    /// Serialization or deserialization was attempted with a format that has
    /// no registered codec for the value's type.
    #[error("format `{format}` is not registered for `{type_name}`")]
    UnsupportedFormat {
        /// The requested format name.
        format: String,
        /// The type name (on serialize) or wire tag (on deserialize) the
        /// lookup failed for.
        type_name: String,
    },

    /// Deserialization input that does not parse under the claimed format.
    #[error("malformed `{format}` data: {reason}")]
    MalformedData {
        /// The format the bytes claimed to be in.
        format: String,
        /// Human-readable description of what failed to parse.
        reason: String,
    },
}

impl ValueError {
    /// Builds an [`UnsupportedFormat`](ValueError::UnsupportedFormat) error.
    pub(crate) fn unsupported(format: &str, type_name: &str) -> Self {
        ValueError::UnsupportedFormat {
            format: String::from(format),
            type_name: String::from(type_name),
        }
    }

    /// Builds a [`MalformedData`](ValueError::MalformedData) error.
    pub(crate) fn malformed(format: &str, reason: impl Into<String>) -> Self {
        ValueError::MalformedData {
            format: String::from(format),
            reason: reason.into(),
        }
    }
}
