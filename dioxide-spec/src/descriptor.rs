//! # Type Descriptors
//!
//! Parsed form of the argument type grammar:
//!
//! ```text
//! type := base_type
//!       | "array<" type ">"
//!       | "map<" type "," type ">"
//!       | "struct<" [type ("," type)*] ">"
//! ```
//!
//! Descriptors are parsed once (see [`crate::parser`]) and then drive the
//! serializer and deserializer directly.

use std::fmt;
use std::str::FromStr;

use crate::address::ADDRESS_SIZE;
use crate::error::SpecError;

/// Size of a `blob` value
pub const BLOB_SIZE: usize = 36;

/// Size of a `hash` value
pub const HASH_SIZE: usize = 32;

/// Size of a float exponent
pub const FLOAT_EXPONENT_SIZE: usize = 8;

/// Size of a float sign word
pub const FLOAT_SIGN_SIZE: usize = 4;

/// Integer widths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
    W128,
    W256,
    W512,
}

impl IntWidth {
    pub const ALL: [IntWidth; 7] = [
        IntWidth::W8,
        IntWidth::W16,
        IntWidth::W32,
        IntWidth::W64,
        IntWidth::W128,
        IntWidth::W256,
        IntWidth::W512,
    ];

    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            8 => Some(IntWidth::W8),
            16 => Some(IntWidth::W16),
            32 => Some(IntWidth::W32),
            64 => Some(IntWidth::W64),
            128 => Some(IntWidth::W128),
            256 => Some(IntWidth::W256),
            512 => Some(IntWidth::W512),
            _ => None,
        }
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            IntWidth::W8 => 8,
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
            IntWidth::W64 => 64,
            IntWidth::W128 => 128,
            IntWidth::W256 => 256,
            IntWidth::W512 => 512,
        }
    }

    #[inline]
    pub const fn bytes(self) -> usize {
        self.bits() as usize / 8
    }
}

/// Float widths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FloatWidth {
    F256,
    F512,
    F1024,
}

impl FloatWidth {
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            256 => Some(FloatWidth::F256),
            512 => Some(FloatWidth::F512),
            1024 => Some(FloatWidth::F1024),
            _ => None,
        }
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            FloatWidth::F256 => 256,
            FloatWidth::F512 => 512,
            FloatWidth::F1024 => 1024,
        }
    }

    /// Mantissa size in bytes (`N/8 - 8`)
    #[inline]
    pub const fn mantissa_bytes(self) -> usize {
        self.bits() as usize / 8 - FLOAT_EXPONENT_SIZE
    }

    /// Total wire size: exponent + mantissa + sign word
    #[inline]
    pub const fn bytes(self) -> usize {
        FLOAT_EXPONENT_SIZE + self.mantissa_bytes() + FLOAT_SIGN_SIZE
    }
}

/// A parsed type descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Bool,
    Uint(IntWidth),
    Int(IntWidth),
    Float(FloatWidth),
    Blob,
    Hash,
    Address,
    Enum,
    String,
    BigInt,
    Token,
    Array(Box<TypeDescriptor>),
    Map(Box<TypeDescriptor>, Box<TypeDescriptor>),
    Struct(Vec<TypeDescriptor>),
}

impl TypeDescriptor {
    /// Parse a descriptor string
    pub fn parse(text: &str) -> Result<Self, SpecError> {
        crate::parser::parse_type(text)
    }

    /// Resolve a base type name (no generic arguments)
    pub fn base(name: &str) -> Option<Self> {
        let ty = match name {
            "bool" => TypeDescriptor::Bool,
            "blob" => TypeDescriptor::Blob,
            "hash" => TypeDescriptor::Hash,
            "address" => TypeDescriptor::Address,
            "enum" => TypeDescriptor::Enum,
            "string" => TypeDescriptor::String,
            "bigint" => TypeDescriptor::BigInt,
            "token" => TypeDescriptor::Token,
            _ => {
                if let Some(bits) = name.strip_prefix("uint") {
                    TypeDescriptor::Uint(IntWidth::from_bits(width_suffix(bits)?)?)
                } else if let Some(bits) = name.strip_prefix("int") {
                    TypeDescriptor::Int(IntWidth::from_bits(width_suffix(bits)?)?)
                } else if let Some(bits) = name.strip_prefix("float") {
                    TypeDescriptor::Float(FloatWidth::from_bits(width_suffix(bits)?)?)
                } else {
                    return None;
                }
            }
        };
        Some(ty)
    }

    /// Wire size for fixed-size kinds, `None` for variable-size kinds
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            TypeDescriptor::Bool => Some(1),
            TypeDescriptor::Uint(w) | TypeDescriptor::Int(w) => Some(w.bytes()),
            TypeDescriptor::Float(w) => Some(w.bytes()),
            TypeDescriptor::Blob => Some(BLOB_SIZE),
            TypeDescriptor::Hash => Some(HASH_SIZE),
            TypeDescriptor::Address => Some(ADDRESS_SIZE),
            TypeDescriptor::Enum => Some(2),
            TypeDescriptor::String
            | TypeDescriptor::BigInt
            | TypeDescriptor::Token
            | TypeDescriptor::Array(_)
            | TypeDescriptor::Map(_, _)
            | TypeDescriptor::Struct(_) => None,
        }
    }

    /// Variable-size kinds are stored behind an offset table inside arrays
    /// and structs
    pub fn is_variable_size(&self) -> bool {
        self.fixed_size().is_none()
    }
}

/// Decimal width suffix of `uintN` / `intN` / `floatN`
fn width_suffix(digits: &str) -> Option<u32> {
    if digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl FromStr for TypeDescriptor {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Bool => write!(f, "bool"),
            TypeDescriptor::Uint(w) => write!(f, "uint{}", w.bits()),
            TypeDescriptor::Int(w) => write!(f, "int{}", w.bits()),
            TypeDescriptor::Float(w) => write!(f, "float{}", w.bits()),
            TypeDescriptor::Blob => write!(f, "blob"),
            TypeDescriptor::Hash => write!(f, "hash"),
            TypeDescriptor::Address => write!(f, "address"),
            TypeDescriptor::Enum => write!(f, "enum"),
            TypeDescriptor::String => write!(f, "string"),
            TypeDescriptor::BigInt => write!(f, "bigint"),
            TypeDescriptor::Token => write!(f, "token"),
            TypeDescriptor::Array(elem) => write!(f, "array<{}>", elem),
            TypeDescriptor::Map(key, value) => write!(f, "map<{},{}>", key, value),
            TypeDescriptor::Struct(members) => {
                write!(f, "struct<")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", member)?;
                }
                write!(f, ">")
            }
        }
    }
}

/// One named parameter of a function signature
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    pub name: String,
    pub ty: TypeDescriptor,
}

/// Ordered parameter list (`"type1:name1,type2:name2"`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    pub fn new(params: Vec<Param>) -> Self {
        Self { params }
    }

    pub fn parse(text: &str) -> Result<Self, SpecError> {
        crate::parser::parse_signature(text)
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Param> {
        self.params.iter()
    }
}

impl<'a> IntoIterator for &'a Signature {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

impl FromStr for Signature {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}:{}", param.ty, param.name)?;
        }
        Ok(())
    }
}
