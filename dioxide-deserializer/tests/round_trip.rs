//! Serialize/deserialize round trips

use dioxide_deserializer::{deserialize, deserialize_args, value_to_json};
use dioxide_serializer::{serialize, serialize_args, value_from_json};
use dioxide_spec::{BigInt, Float, Signature, Token, TypeDescriptor, Value};
use proptest::prelude::*;

fn round_trip(ty: &str, value: &Value) -> Value {
    let ty = TypeDescriptor::parse(ty).unwrap();
    let bytes = serialize(&ty, value).unwrap();
    let (decoded, next) = deserialize(&ty, &bytes, 0).unwrap();
    assert_eq!(next, bytes.len());
    decoded
}

// ============================================================================
// Fixed Cases
// ============================================================================

#[test]
fn test_empty_containers() {
    for (ty, value, len) in [
        ("array<uint32>", Value::Array(vec![]), 4),
        ("array<string>", Value::Array(vec![]), 4),
        ("map<uint32,string>", Value::Map(vec![]), 4),
        ("string", Value::from(""), 2),
        ("struct<>", Value::Struct(vec![]), 4),
    ] {
        let descriptor = TypeDescriptor::parse(ty).unwrap();
        assert_eq!(serialize(&descriptor, &value).unwrap().len(), len, "{}", ty);
        assert_eq!(round_trip(ty, &value), value, "{}", ty);
    }
}

#[test]
fn test_nested_vectors_decode() {
    let bytes = hex::decode(
        "030000001c00000028000000380000000300000001000000020000000300000002000000010000000200000003000000010000000200000004000000",
    )
    .unwrap();
    let ty = TypeDescriptor::parse("array<array<uint32>>").unwrap();
    let (value, _) = deserialize(&ty, &bytes, 0).unwrap();
    assert_eq!(value_to_json(&ty, &value), serde_json::json!([[1, 2, 3], [1, 2], [1, 2, 4]]));

    let bytes = hex::decode(
        "02000000ae000000e900000003000000000000006400000090010000010000000200000005000000040000000000000002000000640000009001000064000000c80000000200000005000000",
    )
    .unwrap();
    let ty = TypeDescriptor::parse("map<uint32,map<uint32,uint32>>").unwrap();
    let (value, next) = deserialize(&ty, &bytes, 0).unwrap();
    assert_eq!(next, bytes.len());
    assert_eq!(
        value_to_json(&ty, &value),
        serde_json::json!({
            "174": {"0": 1, "100": 2, "400": 5},
            "233": {"0": 100, "2": 200, "100": 2, "400": 5}
        })
    );
}

#[test]
fn test_json_round_trip() {
    let ty = TypeDescriptor::parse("struct<address,token,array<string>,map<uint8,bool>>").unwrap();
    let json = serde_json::json!([
        "testa:dapp",
        {"id": 7, "amount": "340282366920938463463374607431768211456"},
        ["a", "bc"],
        {"1": true, "2": false}
    ]);
    let value = value_from_json(&ty, &json).unwrap();
    let bytes = serialize(&ty, &value).unwrap();
    let (decoded, _) = deserialize(&ty, &bytes, 0).unwrap();
    assert_eq!(value_to_json(&ty, &decoded), json);
}

#[test]
fn test_zero_bytes_json_round_trip() {
    for (text, len) in [("hash", 32), ("blob", 36), ("address", 36)] {
        let ty = TypeDescriptor::parse(text).unwrap();
        let value = Value::Bytes(vec![0; len]);
        let json = value_to_json(&ty, &value);
        assert_eq!(value_from_json(&ty, &json).unwrap(), value, "{}", text);
    }
}

#[test]
fn test_args_round_trip() {
    let sig = Signature::parse("uint32:a,array<string>:b,bigint:c").unwrap();
    let args = vec![
        ("a".to_string(), Value::from(9)),
        ("b".to_string(), Value::Array(vec![Value::from("x"), Value::from("yz")])),
        ("c".to_string(), Value::from(-77)),
    ];
    let bytes = serialize_args(&sig, &args).unwrap();
    assert_eq!(deserialize_args(&sig, &bytes).unwrap(), args);
}

// ============================================================================
// Properties
// ============================================================================

fn int_strategy() -> impl Strategy<Value = BigInt> {
    prop_oneof![
        any::<i64>().prop_map(BigInt::from),
        any::<i128>().prop_map(BigInt::from),
        (prop::collection::vec(any::<u8>(), 0..200), any::<bool>()).prop_map(|(bytes, negative)| {
            let v = BigInt::from(dioxide_spec::BigUint::from_bytes_le(&bytes));
            if negative { -v } else { v }
        }),
    ]
}

fn fixed_bytes_strategy(len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        Just(vec![0u8; len]),
        prop::collection::vec(0u8..16, len),
        prop::collection::vec(any::<u8>(), len),
    ]
}

proptest! {
    #[test]
    fn prop_hash_json_round_trip(bytes in fixed_bytes_strategy(32)) {
        let ty = TypeDescriptor::Hash;
        let value = Value::Bytes(bytes);
        prop_assert_eq!(value_from_json(&ty, &value_to_json(&ty, &value)).unwrap(), value);
    }

    #[test]
    fn prop_blob_json_round_trip(bytes in fixed_bytes_strategy(36)) {
        let ty = TypeDescriptor::Blob;
        let value = Value::Bytes(bytes);
        let json = value_to_json(&ty, &value);
        let read = value_from_json(&ty, &json).unwrap();
        prop_assert_eq!(serialize(&ty, &read).unwrap(), serialize(&ty, &value).unwrap());
        prop_assert_eq!(read, value);
    }

    #[test]
    fn prop_uint_round_trip(value in any::<u128>()) {
        for ty in ["uint128", "uint256", "uint512"] {
            prop_assert_eq!(round_trip(ty, &Value::from(value)), Value::from(value));
        }
    }

    #[test]
    fn prop_int_round_trip(value in any::<i64>()) {
        for ty in ["int64", "int128", "int256", "int512"] {
            prop_assert_eq!(round_trip(ty, &Value::from(value)), Value::from(value));
        }
    }

    #[test]
    fn prop_bigint_round_trip(value in int_strategy()) {
        let value = Value::Integer(value);
        prop_assert_eq!(round_trip("bigint", &value), value);
    }

    #[test]
    fn prop_float_round_trip(value in any::<f64>().prop_filter("finite", |v| v.is_finite())) {
        let float = Value::Float(Float::from_f64(value).unwrap());
        for ty in ["float256", "float512", "float1024"] {
            let decoded = round_trip(ty, &float);
            prop_assert_eq!(&decoded, &float);
        }
    }

    #[test]
    fn prop_string_array_round_trip(items in prop::collection::vec(".{0,20}", 0..8)) {
        let value = Value::Array(items.into_iter().map(Value::from).collect());
        prop_assert_eq!(round_trip("array<string>", &value), value);
    }

    #[test]
    fn prop_map_round_trip(entries in prop::collection::vec((any::<u32>(), any::<u64>(), any::<i32>()), 0..8)) {
        let value = Value::Map(
            entries
                .iter()
                .map(|(k, id, amount)| (Value::from(*k), Value::Token(Token::new(*id, *amount))))
                .collect(),
        );
        prop_assert_eq!(round_trip("map<uint32,token>", &value), value);
    }

    #[test]
    fn prop_struct_round_trip(a in any::<bool>(), b in any::<u16>(), c in ".{0,10}", d in prop::collection::vec(any::<u8>(), 32)) {
        let value = Value::Struct(vec![
            Value::Bool(a),
            Value::from(b),
            Value::Struct(vec![Value::from(c), Value::Bytes(d)]),
        ]);
        prop_assert_eq!(round_trip("struct<bool,enum,struct<string,hash>>", &value), value);
    }
}
