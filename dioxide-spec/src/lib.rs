//! # Dioxide Wire Specification
//!
//! Core types shared by the Dioxide serializer, deserializer and client.
//!
//! ## Key Features
//! - Typed argument values (`Value`) including arbitrary-precision integers
//!   and binary floats
//! - Type descriptor AST with a lexer/parser for `array<..>`, `map<..>` and
//!   `struct<..>` generics
//! - 36-byte CRC-32C checksummed addresses with base32 and `name:type` text
//!   forms
//! - Packed 64-bit contract identifiers
//! - Transaction header layout constants and defaults

pub mod address;
pub mod config;
pub mod contract;
pub mod descriptor;
pub mod encoding;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod value;

pub use address::{AccountType, Address, AddressType, ADDRESS_PAYLOAD_SIZE, ADDRESS_SIZE};
pub use config::{ConfigError, TxConfig};
pub use contract::{ContractId, ContractInvokeId, ContractScopeId, ContractVersionId, Scope};
pub use descriptor::{FloatWidth, IntWidth, Param, Signature, TypeDescriptor};
pub use error::{Result, SpecError};
pub use parser::{parse_signature, parse_type};
pub use value::{Float, Token, Value};

pub use num_bigint::{BigInt, BigUint};

/// Largest string payload (u16 length prefix)
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// Largest transaction input payload (u16 length prefix)
pub const MAX_INPUT_LEN: usize = u16::MAX as usize;

/// Most limbs a bigint header can count (7 bits)
pub const MAX_BIGINT_LIMBS: usize = 0x7F;

/// Bigint header sign bit (set = negative)
pub const BIGINT_SIGN_BIT: u8 = 0x80;

/// Struct header low nibble
pub const STRUCT_HEADER_TAG: u32 = 3;

/// Struct member count shift in the header word
pub const STRUCT_COUNT_SHIFT: u32 = 4;
