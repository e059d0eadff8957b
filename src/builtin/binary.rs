//! `BINARY` codecs for the built-in types.
//!
//! Fixed-width values use little-endian encodings; strings and byte buffers
//! are carried verbatim; lists are a `u32` element count followed by
//! length-prefixed element envelopes.

use alloc::{string::String, vec, vec::Vec};

use crate::{
    ValueError,
    builtin::List,
    handlers::{Bytes, Float},
    markers::ReadOnly,
    serialize::{BINARY, SerializationRegistry},
    value::Value,
};

pub(super) fn install(registry: &SerializationRegistry) {
    macro_rules! integer {
        ($ty:ty, $tag:literal) => {
            registry.register::<$ty>(
                $tag,
                BINARY,
                |value| Ok(value.to_le_bytes().to_vec()),
                |bytes| {
                    let array: [u8; core::mem::size_of::<$ty>()] =
                        bytes.try_into().map_err(|_| {
                            ValueError::malformed(
                                BINARY,
                                concat!("wrong payload length for `", $tag, "`"),
                            )
                        })?;
                    Ok(Value::new(<$ty>::from_le_bytes(array)))
                },
            );
        };
    }

    integer!(i8, "i8");
    integer!(i16, "i16");
    integer!(i32, "i32");
    integer!(i64, "i64");
    integer!(u8, "u8");
    integer!(u16, "u16");
    integer!(u32, "u32");
    integer!(u64, "u64");

    macro_rules! float {
        ($ty:ty, $tag:literal) => {
            registry.register::<$ty>(
                $tag,
                BINARY,
                |value| Ok(value.to_le_bytes().to_vec()),
                |bytes| {
                    let array: [u8; core::mem::size_of::<$ty>()] =
                        bytes.try_into().map_err(|_| {
                            ValueError::malformed(
                                BINARY,
                                concat!("wrong payload length for `", $tag, "`"),
                            )
                        })?;
                    Ok(Value::new_custom::<Float, $ty>(<$ty>::from_le_bytes(array)))
                },
            );
        };
    }

    float!(f32, "f32");
    float!(f64, "f64");

    registry.register::<bool>(
        "bool",
        BINARY,
        |value| Ok(vec![u8::from(*value)]),
        |bytes| match bytes {
            [0] => Ok(Value::new(false)),
            [1] => Ok(Value::new(true)),
            _ => Err(ValueError::malformed(
                BINARY,
                "a bool payload is a single 0 or 1 byte",
            )),
        },
    );

    registry.register::<String>(
        "str",
        BINARY,
        |value| Ok(value.as_bytes().to_vec()),
        |bytes| {
            String::from_utf8(bytes.to_vec())
                .map(Value::new)
                .map_err(|_| ValueError::malformed(BINARY, "string payload is not valid UTF-8"))
        },
    );

    registry.register::<Vec<u8>>(
        "bytes",
        BINARY,
        |value| Ok(value.clone()),
        |bytes| Ok(Value::new_custom::<Bytes, _>(bytes.to_vec())),
    );

    registry.register::<Vec<Value<ReadOnly>>>("list", BINARY, encode_list, decode_list);
}

fn encode_list(list: &Vec<Value<ReadOnly>>) -> Result<Vec<u8>, ValueError> {
    let count = u32::try_from(list.len())
        .map_err(|_| ValueError::malformed(BINARY, "list exceeds the encodable element count"))?;
    let mut payload = Vec::new();
    payload.extend_from_slice(&count.to_le_bytes());
    for item in list {
        // Element codecs resolve through the process-wide registry; a codec
        // closure cannot hold a reference back to the registry it lives in.
        let envelope = item.serialize(BINARY)?;
        let length = u32::try_from(envelope.len())
            .map_err(|_| ValueError::malformed(BINARY, "list element exceeds the encodable size"))?;
        payload.extend_from_slice(&length.to_le_bytes());
        payload.extend_from_slice(&envelope);
    }
    Ok(payload)
}

fn decode_list(bytes: &[u8]) -> Result<Value, ValueError> {
    let mut rest = bytes;
    let count = take_u32(&mut rest)?;
    let mut items = Vec::new();
    for _ in 0..count {
        let length = take_u32(&mut rest)? as usize;
        if rest.len() < length {
            return Err(ValueError::malformed(BINARY, "truncated list element"));
        }
        let (envelope, tail) = rest.split_at(length);
        items.push(Value::deserialize(envelope, BINARY)?.into_read_only());
        rest = tail;
    }
    if !rest.is_empty() {
        return Err(ValueError::malformed(
            BINARY,
            "trailing bytes after the last list element",
        ));
    }
    Ok(Value::new_custom::<List, _>(items))
}

fn take_u32(rest: &mut &[u8]) -> Result<u32, ValueError> {
    if rest.len() < 4 {
        return Err(ValueError::malformed(BINARY, "truncated length prefix"));
    }
    let (head, tail) = rest.split_at(4);
    let mut array = [0u8; 4];
    array.copy_from_slice(head);
    *rest = tail;
    Ok(u32::from_le_bytes(array))
}
