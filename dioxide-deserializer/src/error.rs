//! Deserializer errors

use dioxide_spec::SpecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("Spec error: {0}")]
    Spec(#[from] SpecError),

    #[error("Unexpected end of input: needed {needed} bytes, {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    #[error("Offset {offset} is past the end of a {len} byte buffer")]
    OffsetOutOfBounds { offset: usize, len: usize },

    #[error("Invalid UTF-8 string: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("Invalid bool byte: 0x{0:02x}")]
    InvalidBool(u8),

    #[error("Invalid float sign word: {0:02x?}")]
    InvalidFloatSign([u8; 4]),

    #[error("Invalid struct header: 0x{0:08x}")]
    InvalidStructHeader(u32),

    #[error("Struct member count mismatch: expected {expected}, found {found}")]
    StructMemberCount { expected: usize, found: usize },

    #[error("Invalid offset table: {0}")]
    InvalidOffsetTable(String),

    #[error("Non-canonical encoding: {0}")]
    NonCanonical(String),

    #[error("{0} trailing bytes")]
    TrailingBytes(usize),
}

impl DeserializeError {
    /// Bytes were malformed (as opposed to the descriptor)
    pub fn is_deserialization(&self) -> bool {
        !matches!(self, DeserializeError::Spec(_))
    }

    /// Descriptor was unknown or malformed
    pub fn is_unsupported_type(&self) -> bool {
        matches!(self, DeserializeError::Spec(e) if e.is_unsupported_type())
    }
}

pub type Result<T> = std::result::Result<T, DeserializeError>;
