//! # Error Types for the Dioxide Wire Specification

use crate::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecError {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    // Type descriptor errors
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("Malformed type descriptor '{descriptor}': {message}")]
    MalformedType { descriptor: String, message: String },

    #[error("Malformed signature '{signature}': {message}")]
    MalformedSignature { signature: String, message: String },

    // Address errors
    #[error("Invalid address length: expected {expected} bytes, found {found} bytes")]
    InvalidAddressLength { expected: usize, found: usize },

    #[error("Invalid address checksum: expected {expected:#010x}, found {found:#010x}")]
    InvalidChecksum { expected: u32, found: u32 },

    #[error("Invalid {kind} name: {name}")]
    InvalidDelegatedName { kind: &'static str, name: String },

    #[error("Invalid address text: {0}")]
    InvalidAddressText(String),

    // Value errors
    #[error("Float out of range: {0}")]
    FloatOutOfRange(String),
}

impl SpecError {
    /// Check if this error came from an unknown or malformed type descriptor
    pub fn is_unsupported_type(&self) -> bool {
        matches!(
            self,
            SpecError::UnsupportedType(_)
                | SpecError::MalformedType { .. }
                | SpecError::MalformedSignature { .. }
        )
    }

    /// Check if this error came from address validation
    pub fn is_invalid_address(&self) -> bool {
        matches!(
            self,
            SpecError::InvalidAddressLength { .. }
                | SpecError::InvalidChecksum { .. }
                | SpecError::InvalidDelegatedName { .. }
                | SpecError::InvalidAddressText(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SpecError>;
