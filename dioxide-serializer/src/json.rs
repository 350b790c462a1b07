//! JSON to typed value conversion
//!
//! JSON has no notion of the wire types, so the descriptor decides how each
//! JSON node is read:
//!
//! | Descriptor                 | Accepted JSON                                   |
//! |----------------------------|-------------------------------------------------|
//! | integers, `enum`, `bigint` | number, decimal string, `0x` hex string         |
//! | `bool`                     | `true`/`false`, `"true"`/`"false"`              |
//! | `floatN`                   | number or numeric string                        |
//! | `blob`, `hash`             | base32 or hex string, told apart by length      |
//! | `address`                  | address text form, base32 or hex string         |
//!
//! A `0x` prefix always means hex.
//! | `token`                    | `{"id": .., "amount": ..}`                      |
//! | `array<T>`                 | array                                           |
//! | `map<K,V>`                 | object (keys read as `K`) or array of pairs     |
//! | `struct<..>`               | array, or object whose values are in order      |

use std::str::FromStr;

use dioxide_spec::address::decode_base32;
use dioxide_spec::{Address, Float, ADDRESS_SIZE, Token, TypeDescriptor, Value};
use num_bigint::BigInt;
use num_traits::{Num, ToPrimitive};
use serde_json::Value as Json;

use crate::error::{Result, SerializeError};

/// Convert a JSON node into a value of the given type
pub fn value_from_json(ty: &TypeDescriptor, json: &Json) -> Result<Value> {
    let mismatch = || SerializeError::validation(ty, format!("cannot read {} from JSON {}", ty, json_kind(json)));

    let value = match ty {
        TypeDescriptor::Bool => match json {
            Json::Bool(b) => Value::Bool(*b),
            Json::String(s) if s == "true" => Value::Bool(true),
            Json::String(s) if s == "false" => Value::Bool(false),
            _ => return Err(mismatch()),
        },
        TypeDescriptor::Uint(_) | TypeDescriptor::Int(_) | TypeDescriptor::Enum | TypeDescriptor::BigInt => {
            Value::Integer(integer_from_json(ty, json)?)
        }
        TypeDescriptor::Float(_) => {
            let f = match json {
                Json::Number(n) => n.as_f64(),
                Json::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            let f = f.ok_or_else(mismatch)?;
            Value::Float(Float::from_f64(f).ok_or_else(|| SerializeError::validation(ty, "not a finite number"))?)
        }
        TypeDescriptor::Blob | TypeDescriptor::Hash => {
            let text = json.as_str().ok_or_else(mismatch)?;
            let len = ty.fixed_size().unwrap_or_default();
            Value::Bytes(fixed_bytes_from_text(text, len).ok_or_else(|| {
                SerializeError::validation(ty, format!("expected {} bytes as base32 or hex", len))
            })?)
        }
        TypeDescriptor::Address => {
            let text = json.as_str().ok_or_else(mismatch)?;
            Value::Bytes(address_from_text(text).ok_or_else(|| {
                SerializeError::validation(ty, format!("invalid address '{}'", text))
            })?)
        }
        TypeDescriptor::String => Value::String(json.as_str().ok_or_else(mismatch)?.to_string()),
        TypeDescriptor::Token => {
            let obj = json.as_object().ok_or_else(mismatch)?;
            let (Some(id), Some(amount)) = (obj.get("id"), obj.get("amount")) else {
                return Err(SerializeError::validation(ty, "token needs 'id' and 'amount' fields"));
            };
            let id = integer_from_json(ty, id)?
                .to_u64()
                .ok_or_else(|| SerializeError::validation(ty, "token id out of range"))?;
            Value::Token(Token::new(id, integer_from_json(ty, amount)?))
        }
        TypeDescriptor::Array(elem) => {
            let items = json.as_array().ok_or_else(mismatch)?;
            Value::Array(items.iter().map(|item| value_from_json(elem, item)).collect::<Result<_>>()?)
        }
        TypeDescriptor::Map(key_ty, value_ty) => match json {
            Json::Object(obj) => Value::Map(
                obj.iter()
                    .map(|(k, v)| Ok((map_key_from_text(key_ty, k)?, value_from_json(value_ty, v)?)))
                    .collect::<Result<_>>()?,
            ),
            Json::Array(pairs) => Value::Map(
                pairs
                    .iter()
                    .map(|pair| match pair.as_array().map(Vec::as_slice) {
                        Some([k, v]) => Ok((value_from_json(key_ty, k)?, value_from_json(value_ty, v)?)),
                        _ => Err(SerializeError::validation(ty, "map entries must be [key, value] pairs")),
                    })
                    .collect::<Result<_>>()?,
            ),
            _ => return Err(mismatch()),
        },
        TypeDescriptor::Struct(members) => {
            let fields: Vec<&Json> = match json {
                Json::Array(items) => items.iter().collect(),
                Json::Object(obj) => obj.values().collect(),
                _ => return Err(mismatch()),
            };
            if fields.len() != members.len() {
                return Err(SerializeError::validation(
                    ty,
                    format!("expected {} members, found {}", members.len(), fields.len()),
                ));
            }
            Value::Struct(
                members
                    .iter()
                    .zip(fields)
                    .map(|(member, field)| value_from_json(member, field))
                    .collect::<Result<_>>()?,
            )
        }
    };
    Ok(value)
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn integer_from_json(ty: &TypeDescriptor, json: &Json) -> Result<BigInt> {
    let parsed = match json {
        Json::Number(n) => n
            .as_u64()
            .map(BigInt::from)
            .or_else(|| n.as_i64().map(BigInt::from)),
        Json::String(s) => parse_integer(s.trim()),
        _ => None,
    };
    parsed.ok_or_else(|| SerializeError::validation(ty, format!("expected an integer, found {}", json)))
}

/// Decimal or `0x`-prefixed hex, with an optional leading `-`
fn parse_integer(text: &str) -> Option<BigInt> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let magnitude = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() => BigInt::from_str_radix(hex, 16).ok()?,
        Some(_) => return None,
        None if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            BigInt::from_str(digits).ok()?
        }
        None => return None,
    };
    Some(if negative { -magnitude } else { magnitude })
}

/// Exactly `len` bytes from base32 or hex text
///
/// Base32 of `len` bytes is never `2 * len` characters long, so the text
/// length picks the alphabet. Digit-only base32 is never read as hex.
fn fixed_bytes_from_text(text: &str, len: usize) -> Option<Vec<u8>> {
    let text = text.trim();
    if let Some(hex_digits) = text.strip_prefix("0x") {
        return hex::decode(hex_digits).ok().filter(|bytes| bytes.len() == len);
    }
    if text.len() == 2 * len {
        return hex::decode(text).ok();
    }
    decode_base32(text).filter(|bytes| bytes.len() == len)
}

fn address_from_text(text: &str) -> Option<Vec<u8>> {
    if let Ok(address) = Address::from_str(text) {
        return Some(address.as_bytes().to_vec());
    }
    fixed_bytes_from_text(text, ADDRESS_SIZE)
}

/// JSON object keys are always strings; reinterpret them as the key type
fn map_key_from_text(key_ty: &TypeDescriptor, key: &str) -> Result<Value> {
    match key_ty {
        TypeDescriptor::Array(_) | TypeDescriptor::Map(_, _) | TypeDescriptor::Struct(_) | TypeDescriptor::Token => {
            let parsed: Json = serde_json::from_str(key)
                .map_err(|e| SerializeError::validation(key_ty, format!("bad map key '{}': {}", key, e)))?;
            value_from_json(key_ty, &parsed)
        }
        _ => value_from_json(key_ty, &Json::String(key.to_string())),
    }
}
