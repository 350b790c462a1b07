//! Typed value encoder
//!
//! All multi-byte integers are little-endian. Fixed-size kinds are written
//! as-is; variable-size kinds carry their own length metadata so a decoder
//! can walk them in one pass.

use dioxide_spec::descriptor::{FloatWidth, IntWidth, TypeDescriptor};
use dioxide_spec::{
    Float, Token, Value, BIGINT_SIGN_BIT, MAX_BIGINT_LIMBS, MAX_STRING_LEN, STRUCT_COUNT_SHIFT,
    STRUCT_HEADER_TAG,
};
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};

use crate::error::{Result, SerializeError};

/// Sign word of a negative float
const FLOAT_SIGN_NEGATIVE: [u8; 4] = [0x80, 0xCC, 0xCC, 0xCC];

/// Sign word of a non-negative float
const FLOAT_SIGN_POSITIVE: [u8; 4] = [0x00, 0xCC, 0xCC, 0xCC];

/// Serialize a value under a parsed type descriptor
pub fn serialize(ty: &TypeDescriptor, value: &Value) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(ty.fixed_size().unwrap_or(16));
    encode_into(ty, value, &mut out)?;
    Ok(out)
}

/// Serialize a value under a descriptor string
pub fn serialize_str(ty: &str, value: &Value) -> Result<Vec<u8>> {
    let ty = TypeDescriptor::parse(ty)?;
    serialize(&ty, value)
}

/// Append the encoding of `value` to `out`
pub fn encode_into(ty: &TypeDescriptor, value: &Value, out: &mut Vec<u8>) -> Result<()> {
    match (ty, value) {
        (TypeDescriptor::Bool, Value::Bool(b)) => out.push(u8::from(*b)),
        (TypeDescriptor::Uint(width), Value::Integer(v)) => encode_uint(ty, *width, v, out)?,
        (TypeDescriptor::Int(width), Value::Integer(v)) => encode_int(ty, *width, v, out)?,
        (TypeDescriptor::Enum, Value::Integer(v)) => encode_uint(ty, IntWidth::W16, v, out)?,
        (TypeDescriptor::Float(width), Value::Float(f)) => encode_float(ty, *width, f, out)?,
        (TypeDescriptor::Float(width), Value::Integer(v)) => {
            let (sign, magnitude) = v.clone().into_parts();
            let f = Float::new(sign == Sign::Minus, magnitude, 0);
            encode_float(ty, *width, &f, out)?
        }
        (TypeDescriptor::Blob | TypeDescriptor::Hash | TypeDescriptor::Address, Value::Bytes(bytes)) => {
            encode_fixed_bytes(ty, bytes, out)?
        }
        (TypeDescriptor::String, Value::String(s)) => encode_string(s, out)?,
        (TypeDescriptor::BigInt, Value::Integer(v)) => encode_bigint(v, out)?,
        (TypeDescriptor::Token, Value::Token(token)) => encode_token(token, out)?,
        (TypeDescriptor::Array(elem), Value::Array(items)) => {
            write_count(ty, items.len(), out)?;
            if elem.is_variable_size() {
                encode_with_offsets(ty, items.iter().map(|item| (elem.as_ref(), item)), items.len(), out)?;
            } else {
                for item in items {
                    encode_into(elem, item, out)?;
                }
            }
        }
        (TypeDescriptor::Map(key_ty, value_ty), Value::Map(entries)) => {
            write_count(ty, entries.len(), out)?;
            for (key, _) in entries {
                encode_into(key_ty, key, out)?;
            }
            for (_, value) in entries {
                encode_into(value_ty, value, out)?;
            }
        }
        (TypeDescriptor::Struct(members), Value::Struct(values)) => {
            if members.len() != values.len() {
                return Err(SerializeError::validation(
                    ty,
                    format!("expected {} members, found {}", members.len(), values.len()),
                ));
            }
            let header = u32::try_from(members.len())
                .ok()
                .and_then(|n| n.checked_shl(STRUCT_COUNT_SHIFT))
                .filter(|h| h >> STRUCT_COUNT_SHIFT == members.len() as u32)
                .ok_or_else(|| SerializeError::validation(ty, "too many members"))?;
            out.extend_from_slice(&(header | STRUCT_HEADER_TAG).to_le_bytes());
            encode_with_offsets(ty, members.iter().zip(values.iter()), members.len(), out)?;
        }
        (ty, value) => {
            return Err(SerializeError::validation(
                ty,
                format!("cannot encode {} value", value.kind()),
            ))
        }
    }
    Ok(())
}

fn write_count(ty: &TypeDescriptor, count: usize, out: &mut Vec<u8>) -> Result<()> {
    let count = u32::try_from(count).map_err(|_| SerializeError::validation(ty, "too many elements"))?;
    out.extend_from_slice(&count.to_le_bytes());
    Ok(())
}

/// Offset table followed by the element bodies
///
/// Each offset is measured from the start of the table to the end of its
/// element.
fn encode_with_offsets<'a>(
    ty: &TypeDescriptor,
    items: impl Iterator<Item = (&'a TypeDescriptor, &'a Value)>,
    count: usize,
    out: &mut Vec<u8>,
) -> Result<()> {
    let table_size = count * 4;
    let mut bodies = Vec::new();
    let mut offsets = Vec::with_capacity(count);
    for (item_ty, item) in items {
        encode_into(item_ty, item, &mut bodies)?;
        let offset = u32::try_from(table_size + bodies.len())
            .map_err(|_| SerializeError::validation(ty, "payload exceeds 4 GiB"))?;
        offsets.push(offset);
    }
    for offset in offsets {
        out.extend_from_slice(&offset.to_le_bytes());
    }
    out.extend_from_slice(&bodies);
    Ok(())
}

fn encode_uint(ty: &TypeDescriptor, width: IntWidth, v: &BigInt, out: &mut Vec<u8>) -> Result<()> {
    let (sign, magnitude) = v.to_bytes_le();
    if sign == Sign::Minus || magnitude.len() > width.bytes() {
        return Err(SerializeError::validation(ty, format!("value {} out of range", v)));
    }
    out.extend_from_slice(&magnitude);
    out.resize(out.len() + width.bytes() - magnitude.len(), 0);
    Ok(())
}

fn encode_int(ty: &TypeDescriptor, width: IntWidth, v: &BigInt, out: &mut Vec<u8>) -> Result<()> {
    let bound = BigInt::one() << (width.bits() - 1);
    if *v >= bound || *v < -bound {
        return Err(SerializeError::validation(ty, format!("value {} out of range", v)));
    }
    let bytes = v.to_signed_bytes_le();
    let fill = if v.sign() == Sign::Minus { 0xFF } else { 0x00 };
    out.extend_from_slice(&bytes);
    out.resize(out.len() + width.bytes() - bytes.len(), fill);
    Ok(())
}

/// `exponent(8) · mantissa(N/8 - 8) · sign(4)`, mantissa normalized so its
/// top bit is set
fn encode_float(ty: &TypeDescriptor, width: FloatWidth, f: &Float, out: &mut Vec<u8>) -> Result<()> {
    let mantissa_bytes = width.mantissa_bytes();
    let mantissa_bits = (mantissa_bytes * 8) as u64;

    let (exponent, mantissa) = if f.is_zero() {
        (0i64, BigUint::zero())
    } else {
        let bits = f.mantissa().bits();
        if bits > mantissa_bits {
            return Err(SerializeError::validation(
                ty,
                format!("mantissa of {} bits exceeds {} bits", bits, mantissa_bits),
            ));
        }
        let shift = mantissa_bits - bits;
        let exponent = f
            .exponent()
            .checked_sub(shift as i64)
            .ok_or_else(|| SerializeError::validation(ty, "exponent out of range"))?;
        (exponent, f.mantissa() << shift)
    };

    out.extend_from_slice(&exponent.to_le_bytes());
    let digits = mantissa.to_bytes_le();
    if mantissa.is_zero() {
        out.resize(out.len() + mantissa_bytes, 0);
    } else {
        out.extend_from_slice(&digits);
        out.resize(out.len() + mantissa_bytes - digits.len(), 0);
    }
    out.extend_from_slice(if f.is_negative() {
        &FLOAT_SIGN_NEGATIVE
    } else {
        &FLOAT_SIGN_POSITIVE
    });
    Ok(())
}

fn encode_fixed_bytes(ty: &TypeDescriptor, bytes: &[u8], out: &mut Vec<u8>) -> Result<()> {
    let expected = ty.fixed_size().unwrap_or_default();
    if bytes.len() != expected {
        return Err(SerializeError::validation(
            ty,
            format!("expected {} bytes, found {}", expected, bytes.len()),
        ));
    }
    out.extend_from_slice(bytes);
    Ok(())
}

fn encode_string(s: &str, out: &mut Vec<u8>) -> Result<()> {
    if s.len() > MAX_STRING_LEN {
        return Err(SerializeError::validation(
            "string",
            format!("length {} exceeds {}", s.len(), MAX_STRING_LEN),
        ));
    }
    out.extend_from_slice(&(s.len() as u16).to_le_bytes());
    out.extend_from_slice(s.as_bytes());
    Ok(())
}

/// Header byte `limb_count | sign`, then u64 limbs least significant first
fn encode_bigint(v: &BigInt, out: &mut Vec<u8>) -> Result<()> {
    let limbs = v.magnitude().to_u64_digits();
    if limbs.len() > MAX_BIGINT_LIMBS {
        return Err(SerializeError::validation(
            "bigint",
            format!("{} limbs exceeds {}", limbs.len(), MAX_BIGINT_LIMBS),
        ));
    }
    let sign = if v.sign() == Sign::Minus { BIGINT_SIGN_BIT } else { 0 };
    out.push(limbs.len() as u8 | sign);
    for limb in limbs {
        out.extend_from_slice(&limb.to_le_bytes());
    }
    Ok(())
}

fn encode_token(token: &Token, out: &mut Vec<u8>) -> Result<()> {
    out.extend_from_slice(&token.id.to_le_bytes());
    encode_bigint(&token.amount, out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(ty: &str, value: Value) -> String {
        hex::encode(serialize_str(ty, &value).unwrap())
    }

    #[test]
    fn test_integers() {
        assert_eq!(enc("int32", Value::from(-1024)), "00fcffff");
        assert_eq!(enc("uint64", Value::from(1023u64)), "ff03000000000000");
        assert_eq!(enc("int128", Value::from(-1024)), "00fcffffffffffffffffffffffffffff");
        assert_eq!(enc("enum", Value::from(65535u32)), "ffff");
        assert_eq!(enc("int8", Value::from(-128)), "80");
        assert_eq!(enc("uint8", Value::from(0u8)), "00");
    }

    #[test]
    fn test_integer_range() {
        assert!(serialize_str("uint8", &Value::from(256)).unwrap_err().is_type_validation());
        assert!(serialize_str("uint8", &Value::from(-1)).unwrap_err().is_type_validation());
        assert!(serialize_str("int8", &Value::from(128)).unwrap_err().is_type_validation());
        assert!(serialize_str("int8", &Value::from(-129)).unwrap_err().is_type_validation());
        assert!(serialize_str("enum", &Value::from(65536)).unwrap_err().is_type_validation());
    }

    #[test]
    fn test_bool_and_string() {
        assert_eq!(enc("bool", Value::Bool(true)), "01");
        assert_eq!(enc("bool", Value::Bool(false)), "00");
        assert_eq!(enc("string", Value::from("hello")), "050068656c6c6f");
        assert_eq!(enc("string", Value::from("")), "0000");
        let long = "x".repeat(MAX_STRING_LEN + 1);
        assert!(serialize_str("string", &Value::from(long)).is_err());
    }

    #[test]
    fn test_bigint() {
        assert_eq!(enc("bigint", Value::from(0)), "00");
        assert_eq!(enc("bigint", Value::from(4)), "010400000000000000");
        assert_eq!(enc("bigint", Value::from(-4)), "810400000000000000");
        assert_eq!(enc("bigint", Value::from(u64::MAX as u128 + 1)), "0200000000000000000100000000000000");
        let too_big = BigInt::one() << (64 * 127);
        assert!(serialize_str("bigint", &Value::Integer(too_big)).is_err());
    }

    #[test]
    fn test_float_one() {
        let one = Value::Float(Float::from_f64(1.0).unwrap());
        let expected = format!("41ffffffffffffff{}80{}", "00".repeat(23), "00cccccc");
        assert_eq!(enc("float256", one.clone()), expected);

        let bytes = serialize_str("float512", &one).unwrap();
        assert_eq!(bytes.len(), 68);
        assert_eq!(i64::from_le_bytes(bytes[..8].try_into().unwrap()), -447);
        assert_eq!(bytes[8 + 55], 0x80);

        let bytes = serialize_str("float1024", &one).unwrap();
        assert_eq!(bytes.len(), 132);
        assert_eq!(i64::from_le_bytes(bytes[..8].try_into().unwrap()), -959);
    }

    #[test]
    fn test_float_sign_and_zero() {
        let neg = serialize_str("float256", &Value::Float(Float::from_f64(-1.0).unwrap())).unwrap();
        assert_eq!(&neg[32..], &[0x80, 0xCC, 0xCC, 0xCC]);
        let zero = serialize_str("float256", &Value::Float(Float::zero())).unwrap();
        assert!(zero[..32].iter().all(|&b| b == 0));
        let int = serialize_str("float256", &Value::from(1)).unwrap();
        assert_eq!(int, serialize_str("float256", &Value::Float(Float::from_f64(1.0).unwrap())).unwrap());
    }

    #[test]
    fn test_float_mantissa_overflow() {
        let wide = Float::new(false, (BigUint::one() << 200u32) + BigUint::one(), 0);
        assert!(serialize_str("float256", &Value::Float(wide.clone())).is_err());
        assert!(serialize_str("float512", &Value::Float(wide)).is_ok());
    }

    #[test]
    fn test_fixed_bytes() {
        let mut blob = vec![0u8; 36];
        blob[0] = 0x64;
        assert_eq!(enc("blob", Value::Bytes(blob)), format!("64{}", "00".repeat(35)));
        assert!(serialize_str("hash", &Value::Bytes(vec![0; 31])).unwrap_err().is_type_validation());
        assert!(serialize_str("address", &Value::Bytes(vec![0; 32])).is_err());
    }

    #[test]
    fn test_composites() {
        let arr = Value::Array(vec![Value::from(1u32), Value::from(2u32), Value::from(3u32)]);
        assert_eq!(enc("array<uint32>", arr), "03000000010000000200000003000000");
        assert_eq!(enc("array<uint32>", Value::Array(vec![])), "00000000");

        let map = Value::Map(vec![
            (Value::from(0u32), Value::from(1u32)),
            (Value::from(100u32), Value::from(2u32)),
            (Value::from(400u32), Value::from(5u32)),
        ]);
        assert_eq!(
            enc("map<uint32,uint32>", map),
            "03000000000000006400000090010000010000000200000005000000"
        );

        let token = Value::Token(Token::new(1, 4));
        assert_eq!(enc("token", token), "0100000000000000010400000000000000");

        let st = Value::Struct(vec![
            Value::from(100u32),
            Value::Array(vec![Value::from(5u32), Value::from(3u32)]),
        ]);
        assert_eq!(
            enc("struct<uint32,array<uint32>>", st),
            "230000000c0000001800000064000000020000000500000003000000"
        );
        assert_eq!(enc("struct<>", Value::Struct(vec![])), "03000000");
    }

    #[test]
    fn test_kind_mismatch() {
        let err = serialize_str("token", &Value::from(1)).unwrap_err();
        assert!(err.is_type_validation());
        let err = serialize_str("struct<uint8>", &Value::Struct(vec![])).unwrap_err();
        assert!(err.is_type_validation());
    }

    #[test]
    fn test_unsupported_type() {
        assert!(serialize_str("uint7", &Value::from(1)).unwrap_err().is_unsupported_type());
        assert!(serialize_str("unknown", &Value::from(1)).unwrap_err().is_unsupported_type());
    }
}
