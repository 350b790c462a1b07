//! # Unsigned Transaction Builder
//!
//! Wire layout (all integers little-endian):
//!
//! ```text
//! offset  size  field
//!      0     1  version
//!      1     1  packflag
//!      2     6  timestamp (ms)
//!      8     4  isn
//!     12     2  ttl-1 (9 bits) | signers-1 (4 bits) << 9 | tokens (2 bits) << 13
//!     14     2  mode: generation | target | flags
//!     16     1  opcode
//!     17     1  core contract byte
//!     18     4  gas price mantissa
//!     22     2  gas price exponent
//!     24     4  gas limit
//!     28   1|8  build (core contracts) or invoke id (RVM contracts)
//!        0|36  delegatee address
//!            2  input length
//!            n  input
//! ```

use std::ops::{BitOr, BitOrAssign};
use std::time::{SystemTime, UNIX_EPOCH};

use dioxide_spec::encoding::{
    encode_gas_price, pack_ttl_sc_tsc, CORE_CONTRACT_SCOPE_SHIFT, MAX_SIGNER_COUNT, MAX_TTL,
    TIMESTAMP_BYTES, TX_FIXED_HEADER_SIZE,
};
use dioxide_spec::{Address, ContractInvokeId, Scope, TxConfig, ADDRESS_SIZE, MAX_INPUT_LEN};
use tracing::debug;

use crate::error::{ClientError, Result};

/// Target selection, low nibble of the mode field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TargetMode {
    None = 0,
    ScopeAddress = 1,
    ScopeUint32 = 2,
    ScopeUint64 = 3,
    ScopeUint96 = 4,
    ScopeUint128 = 5,
    ScopeUint160 = 6,
    ScopeUint256 = 7,
    ScopeUint336 = 8,
    ScopeUint512 = 9,
    Miner = 10,
    FirstSigner = 11,
    Shard = 12,
    Global = 13,
    GlobalToShards = 14,
}

impl TargetMode {
    pub const MASK: u16 = 0x000F;

    pub fn from_mode(mode: u16) -> Option<Self> {
        use TargetMode::*;
        let mode = match mode & Self::MASK {
            0 => None,
            1 => ScopeAddress,
            2 => ScopeUint32,
            3 => ScopeUint64,
            4 => ScopeUint96,
            5 => ScopeUint128,
            6 => ScopeUint160,
            7 => ScopeUint256,
            8 => ScopeUint336,
            9 => ScopeUint512,
            10 => Miner,
            11 => FirstSigner,
            12 => Shard,
            13 => Global,
            14 => GlobalToShards,
            _ => return Option::None,
        };
        Some(mode)
    }
}

/// How the transaction came to be, bits 4-7 of the mode field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u16)]
pub enum GenerationMode {
    #[default]
    UserSigned = 0x00,
    PeriodicUser = 0x10,
    PeriodicSystem = 0x20,
    Relay = 0x50,
    Deferred = 0x60,
    GlobalToShards = 0x70,
}

impl GenerationMode {
    pub const MASK: u16 = 0x00F0;

    pub fn from_mode(mode: u16) -> Option<Self> {
        match mode & Self::MASK {
            0x00 => Some(GenerationMode::UserSigned),
            0x10 => Some(GenerationMode::PeriodicUser),
            0x20 => Some(GenerationMode::PeriodicSystem),
            0x50 => Some(GenerationMode::Relay),
            0x60 => Some(GenerationMode::Deferred),
            0x70 => Some(GenerationMode::GlobalToShards),
            _ => None,
        }
    }
}

/// Mode flags, bits 8-11 of the mode field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TxFlags(u16);

impl TxFlags {
    pub const NONE: Self = Self(0);
    pub const GROUPED: Self = Self(0x100);
    pub const EMITTER_EMBEDDED: Self = Self(0x200);
    pub const ZERO_ARG: Self = Self(0x400);
    pub const EXTERNAL: Self = Self(0x800);
    pub const MASK: u16 = 0x0F00;

    pub const fn from_mode(mode: u16) -> Self {
        Self(mode & Self::MASK)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for TxFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TxFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Milliseconds since the Unix epoch
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Target mode implied by the contract scope and the presence of a delegatee
pub fn default_target_mode(core_contract_byte: u8, has_delegatee: bool) -> TargetMode {
    if (core_contract_byte >> CORE_CONTRACT_SCOPE_SHIFT) as u16 == Scope::Address as u16 {
        if has_delegatee {
            TargetMode::ScopeAddress
        } else {
            TargetMode::FirstSigner
        }
    } else {
        TargetMode::Shard
    }
}

/// Builder for the unsigned transaction bytes
#[derive(Debug, Clone)]
pub struct UnsignedTransaction {
    invoke_id: ContractInvokeId,
    opcode: u8,
    version: u8,
    packflag: u8,
    timestamp: u64,
    isn: u32,
    ttl: u16,
    signer_count: u8,
    gas_price: u64,
    gas_limit: u32,
    generation_mode: GenerationMode,
    target_mode: Option<TargetMode>,
    flags: TxFlags,
    delegatee: Option<Address>,
    input: Vec<u8>,
}

impl UnsignedTransaction {
    /// Start a transaction with the default header values
    pub fn new(invoke_id: ContractInvokeId, opcode: u8) -> Self {
        Self::with_config(invoke_id, opcode, &TxConfig::DEFAULT)
    }

    /// Start a transaction with header values taken from `config`
    pub fn with_config(invoke_id: ContractInvokeId, opcode: u8, config: &TxConfig) -> Self {
        Self {
            invoke_id,
            opcode,
            version: config.version,
            packflag: 0,
            timestamp: now_millis(),
            isn: 0,
            ttl: config.ttl,
            signer_count: 1,
            gas_price: config.gas_price,
            gas_limit: config.gas_limit,
            generation_mode: GenerationMode::UserSigned,
            target_mode: None,
            flags: TxFlags::NONE,
            delegatee: None,
            input: Vec::new(),
        }
    }

    pub fn isn(mut self, isn: u32) -> Self {
        self.isn = isn;
        self
    }

    pub fn gas_price(mut self, gas_price: u64) -> Self {
        self.gas_price = gas_price;
        self
    }

    pub fn gas_limit(mut self, gas_limit: u32) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn ttl(mut self, ttl: u16) -> Self {
        self.ttl = ttl;
        self
    }

    /// Timestamp in milliseconds (48 bits on the wire)
    pub fn timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn signer_count(mut self, signer_count: u8) -> Self {
        self.signer_count = signer_count;
        self
    }

    pub fn delegatee(mut self, delegatee: Address) -> Self {
        self.delegatee = Some(delegatee);
        self
    }

    /// Serialized argument payload
    pub fn input(mut self, input: Vec<u8>) -> Self {
        self.input = input;
        self
    }

    pub fn generation_mode(mut self, mode: GenerationMode) -> Self {
        self.generation_mode = mode;
        self
    }

    /// Override the target mode derived from the contract scope
    pub fn target_mode(mut self, mode: TargetMode) -> Self {
        self.target_mode = Some(mode);
        self
    }

    pub fn flags(mut self, flags: TxFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Mode word as it will be written
    pub fn mode(&self) -> u16 {
        let target = self.target_mode.unwrap_or_else(|| {
            self.invoke_id
                .core_contract_byte()
                .map_or(TargetMode::Shard, |byte| default_target_mode(byte, self.delegatee.is_some()))
        });
        let mut flags = self.flags;
        if self.input.is_empty() {
            flags |= TxFlags::ZERO_ARG;
        }
        self.generation_mode as u16 | target as u16 | flags.bits()
    }

    fn validate(&self) -> Result<()> {
        if self.ttl == 0 || self.ttl > MAX_TTL {
            return Err(ClientError::InvalidTransaction(format!("ttl {} out of range 1..={}", self.ttl, MAX_TTL)));
        }
        if self.signer_count == 0 || self.signer_count > MAX_SIGNER_COUNT {
            return Err(ClientError::InvalidTransaction(format!(
                "signer count {} out of range 1..={}",
                self.signer_count, MAX_SIGNER_COUNT
            )));
        }
        if self.input.len() > MAX_INPUT_LEN {
            return Err(ClientError::InvalidTransaction(format!(
                "input of {} bytes exceeds {}",
                self.input.len(),
                MAX_INPUT_LEN
            )));
        }
        if self.timestamp >> (TIMESTAMP_BYTES * 8) != 0 {
            return Err(ClientError::InvalidTransaction(format!("timestamp {} exceeds 48 bits", self.timestamp)));
        }
        Ok(())
    }

    /// Produce the wire bytes
    pub fn serialize(self) -> Result<Vec<u8>> {
        self.validate()?;

        let core_contract = self.invoke_id.core_contract_byte().ok_or_else(|| {
            ClientError::InvalidTransaction(format!("{} has no core contract byte", self.invoke_id))
        })?;
        let is_core = self.invoke_id.is_core_dapp();
        let mode = self.mode();
        let (mantissa, exponent) = encode_gas_price(self.gas_price);

        let mut out = Vec::with_capacity(
            TX_FIXED_HEADER_SIZE + 8 + ADDRESS_SIZE * usize::from(self.delegatee.is_some()) + 2 + self.input.len(),
        );
        out.push(self.version);
        out.push(self.packflag);
        out.extend_from_slice(&self.timestamp.to_le_bytes()[..TIMESTAMP_BYTES]);
        out.extend_from_slice(&self.isn.to_le_bytes());
        out.extend_from_slice(&pack_ttl_sc_tsc(self.ttl, self.signer_count, 0).to_le_bytes());
        out.extend_from_slice(&mode.to_le_bytes());
        out.push(self.opcode);
        out.push(core_contract);
        out.extend_from_slice(&mantissa.to_le_bytes());
        out.extend_from_slice(&exponent.to_le_bytes());
        out.extend_from_slice(&self.gas_limit.to_le_bytes());
        if is_core {
            out.push(self.invoke_id.build());
        } else {
            out.extend_from_slice(&self.invoke_id.to_raw().to_le_bytes());
        }
        if let Some(delegatee) = &self.delegatee {
            out.extend_from_slice(delegatee.as_bytes());
        }
        out.extend_from_slice(&(self.input.len() as u16).to_le_bytes());
        out.extend_from_slice(&self.input);

        debug!(
            contract = %self.invoke_id,
            mode = format_args!("{:#06x}", mode),
            size = out.len(),
            "composed transaction"
        );
        Ok(out)
    }
}
