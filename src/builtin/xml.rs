//! `XML` codecs for the built-in types (feature `xml`).
//!
//! The payload is a single `<value>` element whose text content is the
//! value's `TEXT` form, entity-escaped. Parsing goes through [`roxmltree`],
//! which also unescapes the text content.

use alloc::{
    format,
    string::{String, ToString},
    vec::Vec,
};

use roxmltree::Document;

use crate::{
    ValueError,
    builtin::text::{hex_decode, hex_encode},
    handlers::{Bytes, Float},
    serialize::{SerializationRegistry, XML},
    value::Value,
};

pub(super) fn install(registry: &SerializationRegistry) {
    macro_rules! parsed {
        ($ty:ty, $tag:literal) => {
            registry.register::<$ty>(
                $tag,
                XML,
                |value| Ok(wrap_text(&value.to_string())),
                |bytes| {
                    unwrap_text(bytes)?
                        .parse::<$ty>()
                        .map(Value::new)
                        .map_err(|_| {
                            ValueError::malformed(XML, concat!("invalid `", $tag, "` element text"))
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
                XML,
                |value| Ok(wrap_text(&value.to_string())),
                |bytes| {
                    unwrap_text(bytes)?
                        .parse::<$ty>()
                        .map(Value::new_custom::<Float, $ty>)
                        .map_err(|_| {
                            ValueError::malformed(XML, concat!("invalid `", $tag, "` element text"))
                        })
                },
            );
        };
    }

    parsed_float!(f32, "f32");
    parsed_float!(f64, "f64");

    registry.register::<String>(
        "str",
        XML,
        |value| Ok(wrap_text(value)),
        |bytes| unwrap_text(bytes).map(Value::new),
    );

    registry.register::<Vec<u8>>(
        "bytes",
        XML,
        |value| Ok(wrap_text(&hex_encode(value))),
        |bytes| {
            hex_decode(&unwrap_text(bytes)?, XML)
                .map(|decoded| Value::new_custom::<Bytes, _>(decoded))
        },
    );
}

fn wrap_text(text: &str) -> Vec<u8> {
    format!("<value>{}</value>", escape_text(text)).into_bytes()
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for character in text.chars() {
        match character {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(character),
        }
    }
    out
}

fn unwrap_text(bytes: &[u8]) -> Result<String, ValueError> {
    let text = core::str::from_utf8(bytes)
        .map_err(|_| ValueError::malformed(XML, "payload is not valid UTF-8"))?;
    let document =
        Document::parse(text).map_err(|error| ValueError::malformed(XML, error.to_string()))?;
    let root = document.root_element();
    if root.tag_name().name() != "value" {
        return Err(ValueError::malformed(XML, "expected a `<value>` root element"));
    }
    Ok(root.text().unwrap_or_default().to_string())
}
