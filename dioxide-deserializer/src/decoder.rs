//! Typed value decoder
//!
//! Every read goes through [`take`], which advances a borrowed slice and
//! fails instead of reading past its end. Element counts come from the
//! input, so containers are never pre-allocated beyond what the remaining
//! bytes could hold.

use dioxide_spec::descriptor::{FloatWidth, IntWidth, TypeDescriptor};
use dioxide_spec::{Float, Token, Value, BIGINT_SIGN_BIT, STRUCT_COUNT_SHIFT, STRUCT_HEADER_TAG};
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;

use crate::error::{DeserializeError, Result};

/// Sign word padding after the sign byte
const FLOAT_SIGN_PADDING: [u8; 3] = [0xCC, 0xCC, 0xCC];

/// Decode one value starting at `offset`; returns the value and the offset
/// just past it
pub fn deserialize(ty: &TypeDescriptor, bytes: &[u8], offset: usize) -> Result<(Value, usize)> {
    let mut input = bytes.get(offset..).ok_or(DeserializeError::OffsetOutOfBounds {
        offset,
        len: bytes.len(),
    })?;
    let value = decode(ty, &mut input)?;
    Ok((value, bytes.len() - input.len()))
}

/// Decode one value under a descriptor string
pub fn deserialize_str(ty: &str, bytes: &[u8], offset: usize) -> Result<(Value, usize)> {
    let ty = TypeDescriptor::parse(ty)?;
    deserialize(&ty, bytes, offset)
}

/// Decode a value that must span the whole buffer
pub fn deserialize_exact(ty: &TypeDescriptor, bytes: &[u8]) -> Result<Value> {
    let mut input = bytes;
    let value = decode(ty, &mut input)?;
    if !input.is_empty() {
        return Err(DeserializeError::TrailingBytes(input.len()));
    }
    Ok(value)
}

/// Decode a value from the front of `input`, advancing it
pub fn decode(ty: &TypeDescriptor, input: &mut &[u8]) -> Result<Value> {
    let value = match ty {
        TypeDescriptor::Bool => match read_u8(input)? {
            0 => Value::Bool(false),
            1 => Value::Bool(true),
            b => return Err(DeserializeError::InvalidBool(b)),
        },
        TypeDescriptor::Uint(width) => Value::Integer(decode_uint(*width, input)?),
        TypeDescriptor::Int(width) => {
            Value::Integer(BigInt::from_signed_bytes_le(take(input, width.bytes())?))
        }
        TypeDescriptor::Enum => Value::Integer(decode_uint(IntWidth::W16, input)?),
        TypeDescriptor::Float(width) => Value::Float(decode_float(*width, input)?),
        TypeDescriptor::Blob | TypeDescriptor::Hash | TypeDescriptor::Address => {
            let size = ty.fixed_size().unwrap_or_default();
            Value::Bytes(take(input, size)?.to_vec())
        }
        TypeDescriptor::String => {
            let len = read_u16(input)? as usize;
            let bytes = take(input, len)?;
            Value::String(std::str::from_utf8(bytes)?.to_string())
        }
        TypeDescriptor::BigInt => Value::Integer(decode_bigint(input)?),
        TypeDescriptor::Token => {
            let id = read_u64(input)?;
            Value::Token(Token::new(id, decode_bigint(input)?))
        }
        TypeDescriptor::Array(elem) => {
            let count = read_u32(input)? as usize;
            let items = if elem.is_variable_size() {
                decode_with_offsets(std::iter::repeat(elem.as_ref()).take(count), count, input)?
            } else {
                let mut items = Vec::with_capacity(count.min(input.len()));
                for _ in 0..count {
                    items.push(decode(elem, input)?);
                }
                items
            };
            Value::Array(items)
        }
        TypeDescriptor::Map(key_ty, value_ty) => {
            let count = read_u32(input)? as usize;
            let mut keys = Vec::with_capacity(count.min(input.len()));
            for _ in 0..count {
                keys.push(decode(key_ty, input)?);
            }
            let mut entries = Vec::with_capacity(keys.len());
            for key in keys {
                entries.push((key, decode(value_ty, input)?));
            }
            Value::Map(entries)
        }
        TypeDescriptor::Struct(members) => {
            let header = read_u32(input)?;
            if header & 0xF != STRUCT_HEADER_TAG {
                return Err(DeserializeError::InvalidStructHeader(header));
            }
            let found = (header >> STRUCT_COUNT_SHIFT) as usize;
            if found != members.len() {
                return Err(DeserializeError::StructMemberCount {
                    expected: members.len(),
                    found,
                });
            }
            Value::Struct(decode_with_offsets(members.iter(), members.len(), input)?)
        }
    };
    Ok(value)
}

/// Offset table followed by element bodies; each element must decode to
/// exactly the bytes between its neighbours' offsets
fn decode_with_offsets<'t>(
    types: impl Iterator<Item = &'t TypeDescriptor>,
    count: usize,
    input: &mut &[u8],
) -> Result<Vec<Value>> {
    let table_size = count
        .checked_mul(4)
        .ok_or_else(|| DeserializeError::InvalidOffsetTable(format!("{} entries", count)))?;
    let mut table = take(input, table_size)?;
    let mut ends = Vec::with_capacity(count);
    let mut previous = 0;
    for _ in 0..count {
        let offset = read_u32(&mut table)? as usize;
        let end = offset.checked_sub(table_size).ok_or_else(|| {
            DeserializeError::InvalidOffsetTable(format!("offset {} points into the table", offset))
        })?;
        if end < previous {
            return Err(DeserializeError::InvalidOffsetTable(format!(
                "offset {} precedes {}",
                offset,
                previous + table_size
            )));
        }
        ends.push(end);
        previous = end;
    }

    let body = take(input, previous)?;

    let mut items = Vec::with_capacity(count);
    let mut start = 0;
    for (ty, end) in types.zip(ends) {
        let mut slice = &body[start..end];
        items.push(decode(ty, &mut slice)?);
        if !slice.is_empty() {
            return Err(DeserializeError::InvalidOffsetTable(format!(
                "element left {} unread bytes",
                slice.len()
            )));
        }
        start = end;
    }
    Ok(items)
}

fn decode_uint(width: IntWidth, input: &mut &[u8]) -> Result<BigInt> {
    Ok(BigInt::from(BigUint::from_bytes_le(take(input, width.bytes())?)))
}

fn decode_bigint(input: &mut &[u8]) -> Result<BigInt> {
    let header = read_u8(input)?;
    let limbs = (header & !BIGINT_SIGN_BIT) as usize;
    let raw = take(input, limbs * 8)?;
    // limb count must be minimal
    if raw.len() >= 8 && raw[raw.len() - 8..] == [0; 8] {
        return Err(DeserializeError::NonCanonical(format!("bigint with {} limbs has a zero top limb", limbs)));
    }
    let negative = header & BIGINT_SIGN_BIT != 0;
    if negative && limbs == 0 {
        return Err(DeserializeError::NonCanonical("negative zero bigint".into()));
    }
    let sign = if negative { Sign::Minus } else { Sign::Plus };
    Ok(BigInt::from_biguint(sign, BigUint::from_bytes_le(raw)))
}

fn decode_float(width: FloatWidth, input: &mut &[u8]) -> Result<Float> {
    let exponent = read_u64(input)? as i64;
    let mantissa = BigUint::from_bytes_le(take(input, width.mantissa_bytes())?);
    let sign = take(input, 4)?;
    let negative = match sign[0] {
        0x00 => false,
        0x80 => true,
        _ => return Err(DeserializeError::InvalidFloatSign([sign[0], sign[1], sign[2], sign[3]])),
    };
    if sign[1..] != FLOAT_SIGN_PADDING {
        return Err(DeserializeError::InvalidFloatSign([sign[0], sign[1], sign[2], sign[3]]));
    }

    let mantissa_bits = (width.mantissa_bytes() * 8) as u64;
    if mantissa.is_zero() {
        if exponent != 0 || negative {
            return Err(DeserializeError::NonCanonical(format!(
                "zero float with exponent {} and negative={}",
                exponent, negative
            )));
        }
    } else if mantissa.bits() != mantissa_bits {
        return Err(DeserializeError::NonCanonical(format!(
            "float mantissa uses {} of {} bits",
            mantissa.bits(),
            mantissa_bits
        )));
    } else if exponent.checked_add(mantissa_bits as i64).is_none() {
        return Err(DeserializeError::NonCanonical(format!("float exponent {} out of range", exponent)));
    }
    Ok(Float::new(negative, mantissa, exponent))
}

// ============================================================================
// Readers
// ============================================================================

fn take<'a>(input: &mut &'a [u8], n: usize) -> Result<&'a [u8]> {
    if input.len() < n {
        return Err(DeserializeError::UnexpectedEof {
            needed: n,
            available: input.len(),
        });
    }
    let (head, rest) = input.split_at(n);
    *input = rest;
    Ok(head)
}

fn read_u8(input: &mut &[u8]) -> Result<u8> {
    Ok(take(input, 1)?[0])
}

fn read_u16(input: &mut &[u8]) -> Result<u16> {
    let b = take(input, 2)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

fn read_u32(input: &mut &[u8]) -> Result<u32> {
    let b = take(input, 4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

fn read_u64(input: &mut &[u8]) -> Result<u64> {
    let b = take(input, 8)?;
    Ok(u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
}
