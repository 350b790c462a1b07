//! Value formatting to JSON and text
//!
//! Integers that fit 64 bits become JSON numbers, wider ones decimal
//! strings. Fixed byte kinds become lowercase base32, except addresses with
//! a valid checksum, which use their text form. The output is accepted back
//! by the serializer's JSON reader.

use dioxide_spec::address::encode_base32;
use dioxide_spec::{Address, Signature, TypeDescriptor, Value};
use num_traits::ToPrimitive;
use serde_json::{Map, Number, Value as Json};

/// Convert a decoded value to JSON
pub fn value_to_json(ty: &TypeDescriptor, value: &Value) -> Json {
    match (ty, value) {
        (_, Value::Bool(b)) => Json::Bool(*b),
        (_, Value::Integer(v)) => integer_to_json(v),
        (_, Value::Float(f)) => Number::from_f64(f.to_f64())
            .map(Json::Number)
            .unwrap_or_else(|| Json::String(f.to_string())),
        (TypeDescriptor::Address, Value::Bytes(bytes)) => Json::String(
            Address::from_bytes(bytes)
                .map(|a| a.to_text())
                .unwrap_or_else(|_| encode_base32(bytes)),
        ),
        (_, Value::Bytes(bytes)) => Json::String(encode_base32(bytes)),
        (_, Value::String(s)) => Json::String(s.clone()),
        (_, Value::Token(token)) => {
            let mut obj = Map::new();
            obj.insert("id".to_string(), Json::from(token.id));
            obj.insert("amount".to_string(), integer_to_json(&token.amount));
            Json::Object(obj)
        }
        (TypeDescriptor::Array(elem), Value::Array(items)) => {
            Json::Array(items.iter().map(|item| value_to_json(elem, item)).collect())
        }
        (TypeDescriptor::Map(key_ty, value_ty), Value::Map(entries)) => {
            let mut obj = Map::new();
            for (key, value) in entries {
                obj.insert(map_key_text(key_ty, key), value_to_json(value_ty, value));
            }
            Json::Object(obj)
        }
        (TypeDescriptor::Struct(members), Value::Struct(values)) => Json::Array(
            members
                .iter()
                .zip(values)
                .map(|(member, value)| value_to_json(member, value))
                .collect(),
        ),
        // Shape does not match the descriptor; fall back to the value alone
        (_, Value::Array(items)) | (_, Value::Struct(items)) => {
            Json::Array(items.iter().map(|item| value_to_json(&TypeDescriptor::Blob, item)).collect())
        }
        (_, Value::Map(entries)) => Json::Array(
            entries
                .iter()
                .map(|(k, v)| {
                    Json::Array(vec![
                        value_to_json(&TypeDescriptor::Blob, k),
                        value_to_json(&TypeDescriptor::Blob, v),
                    ])
                })
                .collect(),
        ),
    }
}

/// Named arguments as a JSON object in signature order
pub fn args_to_json(signature: &Signature, args: &[(String, Value)]) -> Json {
    let mut obj = Map::new();
    for (param, (name, value)) in signature.iter().zip(args) {
        obj.insert(name.clone(), value_to_json(&param.ty, value));
    }
    Json::Object(obj)
}

/// One-line text form of a value
pub fn format_value(ty: &TypeDescriptor, value: &Value) -> String {
    match value_to_json(ty, value) {
        Json::String(s) if matches!(value, Value::String(_)) => format!("{:?}", s),
        Json::String(s) => s,
        json => json.to_string(),
    }
}

/// `name=value` pairs separated by `, `
pub fn format_args(signature: &Signature, args: &[(String, Value)]) -> String {
    signature
        .iter()
        .zip(args)
        .map(|(param, (name, value))| format!("{}={}", name, format_value(&param.ty, value)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn integer_to_json(v: &num_bigint::BigInt) -> Json {
    if let Some(n) = v.to_u64() {
        Json::from(n)
    } else if let Some(n) = v.to_i64() {
        Json::from(n)
    } else {
        Json::String(v.to_string())
    }
}

fn map_key_text(key_ty: &TypeDescriptor, key: &Value) -> String {
    match value_to_json(key_ty, key) {
        Json::String(s) => s,
        json => json.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dioxide_spec::{AddressType, BigInt, Float, Token};
    use serde_json::json;

    fn ty(text: &str) -> TypeDescriptor {
        TypeDescriptor::parse(text).unwrap()
    }

    #[test]
    fn test_scalars_to_json() {
        assert_eq!(value_to_json(&ty("bool"), &Value::Bool(true)), json!(true));
        assert_eq!(value_to_json(&ty("int32"), &Value::from(-5)), json!(-5));
        assert_eq!(value_to_json(&ty("uint64"), &Value::from(u64::MAX)), json!(u64::MAX));
        let wide: BigInt = BigInt::from(1) << 100;
        assert_eq!(
            value_to_json(&ty("uint128"), &Value::Integer(wide.clone())),
            json!(wide.to_string())
        );
        assert_eq!(
            value_to_json(&ty("float256"), &Value::Float(Float::from_f64(1.5).unwrap())),
            json!(1.5)
        );
    }

    #[test]
    fn test_bytes_to_json() {
        let address = Address::from_name("testa", AddressType::Dapp).unwrap();
        assert_eq!(
            value_to_json(&ty("address"), &Value::Bytes(address.as_bytes().to_vec())),
            json!("testa:dapp")
        );
        let raw = vec![0u8; 36];
        assert_eq!(
            value_to_json(&ty("address"), &Value::Bytes(raw.clone())),
            json!(encode_base32(&raw))
        );
        assert_eq!(value_to_json(&ty("hash"), &Value::Bytes(vec![0; 32])), json!("0".repeat(52)));
    }

    #[test]
    fn test_composites_to_json() {
        let map = Value::Map(vec![(Value::from(0), Value::from(1)), (Value::from(100), Value::from(2))]);
        assert_eq!(value_to_json(&ty("map<uint32,uint32>"), &map), json!({"0": 1, "100": 2}));

        let token = Value::Token(Token::new(1, 4));
        assert_eq!(value_to_json(&ty("token"), &token), json!({"id": 1, "amount": 4}));

        let st = Value::Struct(vec![Value::from(100), Value::Array(vec![Value::from(5)])]);
        assert_eq!(value_to_json(&ty("struct<uint32,array<uint32>>"), &st), json!([100, [5]]));
    }

    #[test]
    fn test_format_args() {
        let sig = Signature::parse("uint32:a,string:b,bool").unwrap();
        let args = vec![
            ("a".to_string(), Value::from(1)),
            ("b".to_string(), Value::from("hi")),
            ("value#2".to_string(), Value::Bool(false)),
        ];
        assert_eq!(format_args(&sig, &args), "a=1, b=\"hi\", value#2=false");
        assert_eq!(args_to_json(&sig, &args), json!({"a": 1, "b": "hi", "value#2": false}));
    }
}
