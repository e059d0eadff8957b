//! Integration tests for the serialization subsystem: round-trips through
//! the built-in codecs, envelope framing, and failure modes.

use protean::{
    Value, ValueError, builtin,
    serialize::{BINARY, SerializationRegistry, TEXT},
};

fn roundtrip(value: &Value, format: &str) -> Value {
    let bytes = value.serialize(format).unwrap();
    Value::deserialize(&bytes, format).unwrap()
}

#[test]
fn binary_roundtrips_preserve_content() {
    builtin::install();

    let samples: Vec<Value> = vec![
        Value::from(true),
        Value::from(false),
        Value::from(-5i8),
        Value::from(i16::MIN),
        Value::from(i32::MAX),
        Value::from(-1234567890123i64),
        Value::from(200u8),
        Value::from(u16::MAX),
        Value::from(0u32),
        Value::from(u64::MAX),
        Value::from(1.5f32),
        Value::from(-0.25f64),
        Value::from("strings survive: colons :: too"),
        Value::from(String::new()),
        Value::from(vec![0u8, 1, 2, 0xff]),
        Value::from(Vec::<u8>::new()),
    ];

    for original in &samples {
        let restored = roundtrip(original, BINARY);
        assert!(
            restored.content_eq(original),
            "BINARY roundtrip changed {original:?}"
        );
    }
}

#[test]
fn text_roundtrips_preserve_content() {
    builtin::install();

    let samples: Vec<Value> = vec![
        Value::from(true),
        Value::from(-42i64),
        Value::from(42u64),
        Value::from(3.5f64),
        Value::from(f64::INFINITY),
        Value::from("unicode text: déjà vu ✓"),
        Value::from(vec![0xdeu8, 0xad, 0xbe, 0xef]),
    ];

    for original in &samples {
        let restored = roundtrip(original, TEXT);
        assert!(
            restored.content_eq(original),
            "TEXT roundtrip changed {original:?}"
        );
    }
}

#[test]
fn text_payloads_are_printable() {
    builtin::install();

    assert_eq!(Value::from(42i64).serialize(TEXT).unwrap(), b"i64:42");
    assert_eq!(Value::from(true).serialize(TEXT).unwrap(), b"bool:true");
    assert_eq!(Value::from("hi").serialize(TEXT).unwrap(), b"str:hi");
    assert_eq!(
        Value::from(vec![0xabu8, 0x01]).serialize(TEXT).unwrap(),
        b"bytes:ab01"
    );
}

#[test]
fn nan_roundtrips_to_nan() {
    builtin::install();

    // NaN never compares equal, so the generic eq contract does not apply;
    // the bits still make it across
    let restored = roundtrip(&Value::from(f64::NAN), BINARY);
    assert!(restored.downcast_ref::<f64>().unwrap().is_nan());

    let restored = roundtrip(&Value::from(f64::NAN), TEXT);
    assert!(restored.downcast_ref::<f64>().unwrap().is_nan());
}

#[test]
fn lists_roundtrip_through_binary() {
    builtin::install();

    let list = Value::new_custom::<builtin::List, _>(vec![
        Value::from(1i64).into_read_only(),
        Value::from("two").into_read_only(),
        Value::from(vec![3u8]).into_read_only(),
        Value::new_custom::<builtin::List, _>(vec![Value::from(false).into_read_only()])
            .into_read_only(),
    ]);

    let restored = roundtrip(&list, BINARY);
    assert!(restored.content_eq(&list));
}

#[test]
fn lists_reject_other_formats() {
    builtin::install();

    let list = Value::new_custom::<builtin::List, _>(vec![Value::from(1i64).into_read_only()]);
    assert!(matches!(
        list.serialize(TEXT),
        Err(ValueError::UnsupportedFormat { .. })
    ));
}

#[test]
fn unknown_formats_are_rejected_without_partial_output() {
    builtin::install();

    let result = Value::from(1i64).serialize("NOPE");
    assert!(matches!(result, Err(ValueError::UnsupportedFormat { .. })));

    let result = Value::deserialize(b"i64:1", "NOPE");
    assert!(matches!(result, Err(ValueError::UnsupportedFormat { .. })));
}

#[test]
fn format_names_match_case_sensitively() {
    builtin::install();

    assert!(matches!(
        Value::from(1i64).serialize("binary"),
        Err(ValueError::UnsupportedFormat { .. })
    ));
}

#[test]
fn empty_handles_do_not_serialize() {
    builtin::install();

    let empty: Value = Value::empty();
    assert!(matches!(
        empty.serialize(BINARY),
        Err(ValueError::EmptyContainer)
    ));
}

#[test]
fn malformed_payloads_are_rejected() {
    builtin::install();

    // No envelope at all
    assert!(matches!(
        Value::deserialize(b"just bytes", BINARY),
        Err(ValueError::MalformedData { .. })
    ));
    // Unknown wire tag
    assert!(matches!(
        Value::deserialize(b"mystery:12", BINARY),
        Err(ValueError::UnsupportedFormat { .. })
    ));
    // Wrong payload width for a fixed-width type
    assert!(matches!(
        Value::deserialize(b"i64:123", BINARY),
        Err(ValueError::MalformedData { .. })
    ));
    // Unparsable text literal
    assert!(matches!(
        Value::deserialize(b"i64:twelve", TEXT),
        Err(ValueError::MalformedData { .. })
    ));
    // Invalid hex in a bytes payload
    assert!(matches!(
        Value::deserialize(b"bytes:zz", TEXT),
        Err(ValueError::MalformedData { .. })
    ));
    // Truncated list element
    assert!(matches!(
        Value::deserialize(b"list:\x01\x00\x00\x00\xff\x00\x00\x00", BINARY),
        Err(ValueError::MalformedData { .. })
    ));
}

#[test]
fn deserialized_handles_are_writable() {
    builtin::install();

    let bytes = Value::from(10i64).serialize(BINARY).unwrap();
    let mut restored = Value::deserialize(&bytes, BINARY).unwrap();
    *restored.downcast_mut::<i64>().unwrap() += 1;
    assert_eq!(restored.downcast_ref::<i64>().unwrap(), &11);
}

#[test]
fn isolated_registries_do_not_see_builtin_codecs() {
    let registry = SerializationRegistry::new();
    assert!(matches!(
        registry.serialize(&Value::from(1i64), BINARY),
        Err(ValueError::UnsupportedFormat { .. })
    ));

    builtin::install_in(&registry);
    let bytes = registry.serialize(&Value::from(1i64), BINARY).unwrap();
    let restored = registry.deserialize(&bytes, BINARY).unwrap();
    assert!(restored.content_eq(&Value::from(1i64)));
}

#[test]
fn custom_plugins_register_against_the_same_core() {
    #[derive(Clone, PartialEq, Hash, Debug)]
    struct Point {
        x: i32,
        y: i32,
    }

    let registry = SerializationRegistry::new();
    registry.register::<Point>(
        "point",
        BINARY,
        |point| {
            let mut payload = point.x.to_le_bytes().to_vec();
            payload.extend_from_slice(&point.y.to_le_bytes());
            Ok(payload)
        },
        |bytes| {
            if bytes.len() != 8 {
                return Err(ValueError::MalformedData {
                    format: BINARY.into(),
                    reason: "a point payload is 8 bytes".into(),
                });
            }
            let mut x = [0u8; 4];
            let mut y = [0u8; 4];
            x.copy_from_slice(&bytes[..4]);
            y.copy_from_slice(&bytes[4..]);
            Ok(Value::new_custom::<protean::handlers::Inspect, _>(Point {
                x: i32::from_le_bytes(x),
                y: i32::from_le_bytes(y),
            }))
        },
    );

    let point = Value::new_custom::<protean::handlers::Inspect, _>(Point { x: 3, y: -4 });
    let bytes = registry.serialize(&point, BINARY).unwrap();
    assert!(bytes.starts_with(b"point:"));
    let restored = registry.deserialize(&bytes, BINARY).unwrap();
    assert!(restored.content_eq(&point));
}

#[cfg(feature = "xml")]
mod xml {
    use protean::serialize::XML;

    use super::*;

    #[test]
    fn xml_roundtrips_preserve_content() {
        builtin::install();

        let samples: Vec<Value> = vec![
            Value::from(false),
            Value::from(-3i64),
            Value::from(2.25f64),
            Value::from("escaped <content> & entities"),
            Value::from(vec![0x00u8, 0xff]),
        ];

        for original in &samples {
            let restored = roundtrip(original, XML);
            assert!(
                restored.content_eq(original),
                "XML roundtrip changed {original:?}"
            );
        }
    }

    #[test]
    fn xml_envelopes_are_markup() {
        builtin::install();

        let bytes = Value::from(7i64).serialize(XML).unwrap();
        assert_eq!(bytes, b"i64:<value>7</value>");
    }

    #[test]
    fn xml_rejects_broken_markup() {
        builtin::install();

        assert!(matches!(
            Value::deserialize(b"i64:<value>7", XML),
            Err(ValueError::MalformedData { .. })
        ));
        assert!(matches!(
            Value::deserialize(b"i64:<other>7</other>", XML),
            Err(ValueError::MalformedData { .. })
        ));
    }
}
