//! # Typed Values
//!
//! The in-memory form of every value the argument codec can carry. One enum
//! covers all type descriptors; which variant is legal for which descriptor
//! is checked by the serializer.
//!
//! | Descriptor                  | Variant            |
//! |-----------------------------|--------------------|
//! | `bool`                      | `Bool`             |
//! | `uintN`, `intN`, `enum`, `bigint` | `Integer`    |
//! | `float256/512/1024`         | `Float`            |
//! | `blob`, `hash`, `address`   | `Bytes`            |
//! | `string`                    | `String`           |
//! | `token`                     | `Token`            |
//! | `array<T>`                  | `Array`            |
//! | `map<K,V>`                  | `Map`              |
//! | `struct<...>`               | `Struct`           |

use num_bigint::{BigInt, BigUint};
use num_traits::{ToPrimitive, Zero};
use std::fmt;

/// A typed argument value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Integer(BigInt),
    Float(Float),
    Bytes(Vec<u8>),
    String(String),
    Token(Token),
    Array(Vec<Value>),
    /// Entries in wire order
    Map(Vec<(Value, Value)>),
    Struct(Vec<Value>),
}

impl Value {
    /// Short kind name for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Token(_) => "token",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Struct(_) => "struct",
        }
    }

    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Value::Integer(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! integer_value_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Integer(BigInt::from(v))
                }
            }
        )*
    };
}

integer_value_from!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128);

impl From<BigInt> for Value {
    fn from(v: BigInt) -> Self {
        Value::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Float> for Value {
    fn from(v: Float) -> Self {
        Value::Float(v)
    }
}

impl From<Token> for Value {
    fn from(v: Token) -> Self {
        Value::Token(v)
    }
}

/// Token amount: 64-bit token id plus an arbitrary-precision amount
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub id: u64,
    pub amount: BigInt,
}

impl Token {
    pub fn new(id: u64, amount: impl Into<BigInt>) -> Self {
        Self {
            id,
            amount: amount.into(),
        }
    }
}

/// Arbitrary-precision binary float: `(-1)^negative * mantissa * 2^exponent`
///
/// Kept canonical: the mantissa is odd (trailing zero bits folded into the
/// exponent), and zero has exponent 0 and positive sign.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Float {
    negative: bool,
    exponent: i64,
    mantissa: BigUint,
}

impl Float {
    pub fn zero() -> Self {
        Self {
            negative: false,
            exponent: 0,
            mantissa: BigUint::zero(),
        }
    }

    /// Build and canonicalize a float
    pub fn new(negative: bool, mantissa: BigUint, exponent: i64) -> Self {
        if mantissa.is_zero() {
            return Self::zero();
        }
        let trailing = mantissa.trailing_zeros().unwrap_or(0);
        Self {
            negative,
            exponent: exponent.saturating_add(trailing as i64),
            mantissa: mantissa >> trailing,
        }
    }

    /// Exact conversion from an IEEE-754 double; `None` for NaN and infinities
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let bits = value.to_bits();
        let negative = bits >> 63 == 1;
        let biased = ((bits >> 52) & 0x7FF) as i64;
        let fraction = bits & ((1u64 << 52) - 1);
        let (mantissa, exponent) = if biased == 0 {
            (fraction, -1074)
        } else {
            (fraction | (1u64 << 52), biased - 1075)
        };
        Some(Self::new(negative, BigUint::from(mantissa), exponent))
    }

    /// Nearest double (truncating mantissas wider than 64 bits)
    pub fn to_f64(&self) -> f64 {
        if self.mantissa.is_zero() {
            return 0.0;
        }
        let bits = self.mantissa.bits();
        let (mantissa, mut exponent) = if bits > 64 {
            let shift = bits - 64;
            (&self.mantissa >> shift, self.exponent.saturating_add(shift as i64))
        } else {
            (self.mantissa.clone(), self.exponent)
        };
        let mut value = mantissa.to_u64().map(|m| m as f64).unwrap_or(f64::MAX);
        // powi is exact for powers of two within the normal range
        while exponent != 0 {
            let step = exponent.clamp(-1000, 1000);
            value *= 2f64.powi(step as i32);
            exponent -= step;
            if value == 0.0 || value.is_infinite() {
                break;
            }
        }
        if self.negative {
            -value
        } else {
            value
        }
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    pub fn mantissa(&self) -> &BigUint {
        &self.mantissa
    }
}

impl fmt::Display for Float {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}
