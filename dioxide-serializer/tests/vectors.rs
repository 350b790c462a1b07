//! Reference byte vectors for the argument serializer

use dioxide_serializer::{serialize_str, value_from_json};
use dioxide_spec::{BigInt, Float, Token, TypeDescriptor, Value};
use serde_json::json;

fn enc(ty: &str, value: Value) -> String {
    hex::encode(serialize_str(ty, &value).unwrap())
}

fn enc_json(ty: &str, json: serde_json::Value) -> String {
    let ty = TypeDescriptor::parse(ty).unwrap();
    let value = value_from_json(&ty, &json).unwrap();
    hex::encode(dioxide_serializer::serialize(&ty, &value).unwrap())
}

// ============================================================================
// Scalar Vectors
// ============================================================================

#[test]
fn test_scalar_vectors() {
    assert_eq!(enc("int32", Value::from(-1024)), "00fcffff");
    assert_eq!(enc("uint64", Value::from(1023u64)), "ff03000000000000");
    assert_eq!(enc("int128", Value::from(-1024)), "00fcffffffffffffffffffffffffffff");
    assert_eq!(enc("uint256", Value::from(2047)), format!("ff07{}", "00".repeat(30)));
    assert_eq!(enc("string", Value::from("hello")), "050068656c6c6f");
    assert_eq!(enc("string", Value::from("")), "0000");
    assert_eq!(enc("bool", Value::from(true)), "01");
    assert_eq!(enc("bool", Value::from(false)), "00");
    assert_eq!(enc("enum", Value::from(65535)), "ffff");
}

#[test]
fn test_fixed_byte_vectors() {
    let mut blob = vec![0u8; 36];
    blob[0] = 0x64;
    assert_eq!(enc("blob", Value::Bytes(blob)), format!("64{}", "00".repeat(35)));

    let mut hash = vec![0u8; 32];
    hash[0] = 0x64;
    assert_eq!(enc("hash", Value::Bytes(hash)), format!("64{}", "00".repeat(31)));

    let mut address = vec![0u8; 36];
    address[1] = 0x63;
    assert_eq!(enc("address", Value::Bytes(address)), format!("0063{}", "00".repeat(34)));
}

#[test]
fn test_bigint_vectors() {
    let positive = "03c7711cc7711c0b4de3051d6b170fb62c38743f9a07000000";
    let bytes = hex::decode(&positive[2..]).unwrap();
    let magnitude = BigInt::from(dioxide_spec::BigUint::from_bytes_le(&bytes));

    assert_eq!(enc("bigint", Value::Integer(magnitude.clone())), positive);
    assert_eq!(enc("bigint", Value::Integer(-magnitude)), format!("83{}", &positive[2..]));
}

#[test]
fn test_float_vector() {
    let expected = format!("41ffffffffffffff{}80{}", "00".repeat(23), "00cccccc");
    assert_eq!(enc("float256", Value::Float(Float::from_f64(1.0).unwrap())), expected);
    assert_eq!(enc_json("float256", json!(1.0)), expected);
}

// ============================================================================
// Composite Vectors
// ============================================================================

#[test]
fn test_array_vectors() {
    assert_eq!(enc_json("array<uint32>", json!([1, 2, 3])), "03000000010000000200000003000000");
    assert_eq!(enc_json("array<uint8>", json!([255, 0, 128])), "03000000ff0080");
    assert_eq!(
        enc_json("array<array<uint32>>", json!([[1, 2, 3], [1, 2], [1, 2, 4]])),
        "030000001c00000028000000380000000300000001000000020000000300000002000000010000000200000003000000010000000200000004000000"
    );
}

#[test]
fn test_map_vectors() {
    assert_eq!(
        enc_json("map<uint32,uint32>", json!({"0": 1, "100": 2, "400": 5})),
        "03000000000000006400000090010000010000000200000005000000"
    );
    assert_eq!(
        enc_json(
            "map<uint32,map<uint32,uint32>>",
            json!({
                "174": {"0": 1, "100": 2, "400": 5},
                "233": {"0": 100, "2": 200, "100": 2, "400": 5}
            })
        ),
        "02000000ae000000e900000003000000000000006400000090010000010000000200000005000000040000000000000002000000640000009001000064000000c80000000200000005000000"
    );
}

#[test]
fn test_token_and_struct_vectors() {
    assert_eq!(enc("token", Value::Token(Token::new(1, 4))), "0100000000000000010400000000000000");
    assert_eq!(
        enc_json("token", json!({"id": 1, "amount": 4})),
        "0100000000000000010400000000000000"
    );
    assert_eq!(
        enc_json("struct<uint32,array<uint32>>", json!([100, [5, 3]])),
        "230000000c0000001800000064000000020000000500000003000000"
    );
}
