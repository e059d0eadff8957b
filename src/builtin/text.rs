//! `TEXT` codecs for the built-in types.
//!
//! The payload is the value's display form: decimal literals for numbers,
//! `true`/`false` for booleans, the raw string for [`String`], lowercase
//! hex for byte buffers. Deserialization parses the same forms back.

use alloc::{
    string::{String, ToString},
    vec::Vec,
};

use crate::{
    ValueError,
    handlers::{Bytes, Float},
    serialize::{SerializationRegistry, TEXT},
    value::Value,
};

pub(super) fn install(registry: &SerializationRegistry) {
    macro_rules! parsed {
        ($ty:ty, $tag:literal) => {
            registry.register::<$ty>(
                $tag,
                TEXT,
                |value| Ok(value.to_string().into_bytes()),
                |bytes| {
                    parse_text(bytes, TEXT)?
                        .parse::<$ty>()
                        .map(Value::new)
                        .map_err(|_| {
                            ValueError::malformed(TEXT, concat!("invalid `", $tag, "` literal"))
                        })
                },
            );
        };
    }

    parsed!(bool, "bool");
    parsed!(i8, "i8");
    parsed!(i16, "i16");
    parsed!(i32, "i32");
    parsed!(i64, "i64");
    parsed!(u8, "u8");
    parsed!(u16, "u16");
    parsed!(u32, "u32");
    parsed!(u64, "u64");

    macro_rules! parsed_float {
        ($ty:ty, $tag:literal) => {
            registry.register::<$ty>(
                $tag,
                TEXT,
                |value| Ok(value.to_string().into_bytes()),
                |bytes| {
                    parse_text(bytes, TEXT)?
                        .parse::<$ty>()
                        .map(Value::new_custom::<Float, $ty>)
                        .map_err(|_| {
                            ValueError::malformed(TEXT, concat!("invalid `", $tag, "` literal"))
                        })
                },
            );
        };
    }

    parsed_float!(f32, "f32");
    parsed_float!(f64, "f64");

    registry.register::<String>(
        "str",
        TEXT,
        |value| Ok(value.clone().into_bytes()),
        |bytes| parse_text(bytes, TEXT).map(|text| Value::new(String::from(text))),
    );

    registry.register::<Vec<u8>>(
        "bytes",
        TEXT,
        |value| Ok(hex_encode(value).into_bytes()),
        |bytes| {
            hex_decode(parse_text(bytes, TEXT)?, TEXT)
                .map(|decoded| Value::new_custom::<Bytes, _>(decoded))
        },
    );
}

pub(super) fn parse_text<'a>(bytes: &'a [u8], format: &str) -> Result<&'a str, ValueError> {
    core::str::from_utf8(bytes)
        .map_err(|_| ValueError::malformed(format, "payload is not valid UTF-8"))
}

pub(super) fn hex_encode(bytes: &[u8]) -> String {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        out.push(char::from(DIGITS[usize::from(byte >> 4)]));
        out.push(char::from(DIGITS[usize::from(byte & 0x0f)]));
    }
    out
}

pub(super) fn hex_decode(text: &str, format: &str) -> Result<Vec<u8>, ValueError> {
    fn nibble(digit: u8) -> Option<u8> {
        match digit {
            b'0'..=b'9' => Some(digit - b'0'),
            b'a'..=b'f' => Some(digit - b'a' + 10),
            b'A'..=b'F' => Some(digit - b'A' + 10),
            _ => None,
        }
    }

    let text = text.as_bytes();
    if text.len() % 2 != 0 {
        return Err(ValueError::malformed(format, "hex payload has odd length"));
    }
    let mut out = Vec::with_capacity(text.len() / 2);
    for pair in text.chunks_exact(2) {
        match (nibble(pair[0]), nibble(pair[1])) {
            (Some(high), Some(low)) => out.push((high << 4) | low),
            _ => return Err(ValueError::malformed(format, "invalid hex digit")),
        }
    }
    Ok(out)
}
