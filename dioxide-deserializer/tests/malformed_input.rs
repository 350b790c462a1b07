//! Tests for truncated and garbage input to the deserializer
//!
//! Every failure must be an error, never a panic or an out-of-bounds read.

use dioxide_deserializer::{deserialize, deserialize_str, DeserializeError};
use dioxide_serializer::{serialize, serialize_str};
use dioxide_spec::{TypeDescriptor, Value};
use proptest::prelude::*;

// ============================================================================
// Truncation Tests
// ============================================================================

#[test]
fn test_uint32_from_two_bytes() {
    let err = deserialize_str("uint32", &[1, 2], 0).unwrap_err();
    assert!(matches!(err, DeserializeError::UnexpectedEof { needed: 4, available: 2 }));
    assert!(err.is_deserialization());
}

#[test]
fn test_every_truncation_fails() {
    let value = Value::Struct(vec![
        Value::from("hello"),
        Value::Array(vec![Value::from(1), Value::from(2)]),
        Value::from(-99),
    ]);
    let ty = "struct<string,array<uint16>,bigint>";
    let bytes = serialize_str(ty, &value).unwrap();
    for len in 0..bytes.len() {
        assert!(deserialize_str(ty, &bytes[..len], 0).is_err(), "prefix {}", len);
    }
    assert!(deserialize_str(ty, &bytes, 0).is_ok());
}

// ============================================================================
// Content Tests
// ============================================================================

#[test]
fn test_invalid_utf8() {
    let err = deserialize_str("string", &[0x02, 0x00, 0xff, 0xfe], 0).unwrap_err();
    assert!(matches!(err, DeserializeError::InvalidUtf8(_)));
}

#[test]
fn test_huge_counts() {
    let bytes = [0xff, 0xff, 0xff, 0xff, 0x01];
    assert!(deserialize_str("array<uint64>", &bytes, 0).is_err());
    assert!(deserialize_str("array<string>", &bytes, 0).is_err());
    assert!(deserialize_str("map<uint8,uint8>", &bytes, 0).is_err());
}

#[test]
fn test_unsupported_descriptor() {
    let err = deserialize_str("uint7", &[0], 0).unwrap_err();
    assert!(err.is_unsupported_type());
}

// ============================================================================
// Canonical Form Tests
// ============================================================================

fn non_canonical(ty: &str, hex_bytes: &str) -> bool {
    let bytes = hex::decode(hex_bytes).unwrap();
    matches!(deserialize_str(ty, &bytes, 0), Err(DeserializeError::NonCanonical(_)))
}

#[test]
fn test_bigint_negative_zero() {
    assert!(non_canonical("bigint", "80"));
    assert!(non_canonical("token", "070000000000000080"));
}

#[test]
fn test_bigint_zero_top_limb() {
    assert!(non_canonical("bigint", "010000000000000000"));
    assert!(non_canonical("bigint", "8205000000000000000000000000000000"));
    assert_eq!(
        deserialize_str("bigint", &hex::decode("820500000000000000ff00000000000000").unwrap(), 0)
            .unwrap()
            .1,
        17
    );
}

#[test]
fn test_float_unnormalized_mantissa() {
    // 1.0 with the mantissa shifted down one bit
    let half_shifted = format!("42ffffffffffffff{}40{}", "00".repeat(23), "00cccccc");
    assert!(non_canonical("float256", &half_shifted));

    let canonical = format!("41ffffffffffffff{}80{}", "00".repeat(23), "00cccccc");
    assert!(deserialize_str("float256", &hex::decode(canonical).unwrap(), 0).is_ok());
}

#[test]
fn test_float_zero_forms() {
    let zero = format!("{}{}", "00".repeat(32), "00cccccc");
    assert!(deserialize_str("float256", &hex::decode(zero).unwrap(), 0).is_ok());

    let negative_zero = format!("{}{}", "00".repeat(32), "80cccccc");
    assert!(non_canonical("float256", &negative_zero));

    let scaled_zero = format!("01{}{}", "00".repeat(31), "00cccccc");
    assert!(non_canonical("float256", &scaled_zero));
}

// ============================================================================
// Fuzzing
// ============================================================================

proptest! {
    #[test]
    fn prop_garbage_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..128)) {
        for ty in [
            "string",
            "bigint",
            "token",
            "float256",
            "array<string>",
            "map<string,array<bigint>>",
            "struct<uint8,string,struct<bool>>",
            "array<struct<token,address>>",
        ] {
            let ty = TypeDescriptor::parse(ty).unwrap();
            if let Ok((_, next)) = deserialize(&ty, &bytes, 0) {
                prop_assert!(next <= bytes.len());
            }
        }
    }

    #[test]
    fn prop_accepted_numbers_reencode_identically(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        for ty in ["bigint", "token", "float256"] {
            let ty = TypeDescriptor::parse(ty).unwrap();
            if let Ok((value, next)) = deserialize(&ty, &bytes, 0) {
                prop_assert_eq!(serialize(&ty, &value).unwrap(), bytes[..next].to_vec());
            }
        }
    }
}
