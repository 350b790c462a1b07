//! # Transaction Defaults
//!
//! Default header values applied to every composed transaction. Callers
//! override them per transaction through the builder, or globally by handing
//! a different `TxConfig` to the client.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::encoding::MAX_TTL;

/// Transaction header defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TxConfig {
    /// Chain protocol version byte
    pub version: u8,
    /// Gas price (encoded lossily as mantissa + exponent)
    pub gas_price: u64,
    /// Gas limit
    pub gas_limit: u32,
    /// Time-to-live in blocks (1-512)
    pub ttl: u16,
}

impl TxConfig {
    /// Default configuration
    /// - Version: 108
    /// - Gas price: 100
    /// - Gas limit: 500000
    /// - TTL: 120 blocks
    pub const DEFAULT: Self = Self {
        version: 108,
        gas_price: 100,
        gas_limit: 500_000,
        ttl: 120,
    };

    /// Create a new configuration with validation
    pub const fn new(version: u8, gas_price: u64, gas_limit: u32, ttl: u16) -> Result<Self, ConfigError> {
        let config = Self {
            version,
            gas_price,
            gas_limit,
            ttl,
        };

        if version == 0 {
            return Err(ConfigError::InvalidVersion);
        }
        if gas_limit == 0 {
            return Err(ConfigError::ZeroGasLimit);
        }
        if ttl < 1 || ttl > MAX_TTL {
            return Err(ConfigError::InvalidTtl);
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::new(self.version, self.gas_price, self.gas_limit, self.ttl).map(|_| ())
    }
}

impl Default for TxConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for TxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TxConfig {{ version: {}, gas_price: {}, gas_limit: {}, ttl: {} }}",
            self.version, self.gas_price, self.gas_limit, self.ttl,
        )
    }
}

/// Configuration error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Version byte must be non-zero
    InvalidVersion,
    /// Gas limit must be non-zero
    ZeroGasLimit,
    /// TTL must be in range [1, 512]
    InvalidTtl,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidVersion => write!(f, "version must be non-zero"),
            ConfigError::ZeroGasLimit => write!(f, "gas_limit must be non-zero"),
            ConfigError::InvalidTtl => write!(f, "ttl must be in range [1, 512]"),
        }
    }
}

impl std::error::Error for ConfigError {}
