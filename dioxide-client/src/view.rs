//! # Transaction View
//!
//! Read-only walk over serialized transaction bytes, the inverse of
//! [`UnsignedTransaction::serialize`](crate::transaction::UnsignedTransaction::serialize).
//!
//! The layout carries no delegatee flag, so its presence is inferred from
//! length consistency: exactly one of `[len(2) | input]` and
//! `[delegatee(36) | len(2) | input]` must account for the remaining bytes.
//! A signed transaction additionally ends with
//! `sid(1) | public key(32) | signature(64) | nonces(12)`.

use dioxide_spec::encoding::{
    decode_gas_price, extract_signer_count, extract_token_count, extract_ttl, CORE_CONTRACT_RVM,
    CORE_CONTRACT_SN_MASK, TIMESTAMP_BYTES, TX_FIXED_HEADER_SIZE,
};
use dioxide_spec::{AccountType, Address, ContractInvokeId, ADDRESS_PAYLOAD_SIZE, ADDRESS_SIZE};

use crate::error::{ClientError, Result};
use crate::transaction::{GenerationMode, TargetMode, TxFlags};

/// Ed25519 public key size
pub const PUBLIC_KEY_SIZE: usize = ADDRESS_PAYLOAD_SIZE;

/// Ed25519 signature size
pub const SIGNATURE_SIZE: usize = 64;

/// Size of the three PoW nonces
pub const NONCES_SIZE: usize = 12;

/// Bytes appended by signing and PoW: sid, public key, signature, nonces
pub const SIGNED_TAIL_SIZE: usize = 1 + PUBLIC_KEY_SIZE + SIGNATURE_SIZE + NONCES_SIZE;

/// Fixed header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxHeader {
    pub version: u8,
    pub packflag: u8,
    pub timestamp: u64,
    pub isn: u32,
    pub ttl: u16,
    pub signer_count: u8,
    pub token_count: u8,
    pub mode: u16,
    pub opcode: u8,
    pub core_contract: u8,
    pub gas_mantissa: u32,
    pub gas_exponent: u16,
    pub gas_limit: u32,
}

impl TxHeader {
    pub fn gas_price(&self) -> Option<u64> {
        decode_gas_price(self.gas_mantissa, self.gas_exponent)
    }

    pub fn target_mode(&self) -> Option<TargetMode> {
        TargetMode::from_mode(self.mode)
    }

    pub fn generation_mode(&self) -> Option<GenerationMode> {
        GenerationMode::from_mode(self.mode)
    }

    pub fn flags(&self) -> TxFlags {
        TxFlags::from_mode(self.mode)
    }

    /// True when the core byte selects an RVM contract
    pub fn is_rvm(&self) -> bool {
        self.core_contract & CORE_CONTRACT_SN_MASK == CORE_CONTRACT_RVM
    }
}

/// Contract reference following the fixed header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractTarget {
    /// Build number of a core contract
    Build(u8),
    /// Full invoke id of an RVM contract
    Invoke(ContractInvokeId),
}

/// Signature block and PoW nonces of a finalized transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedTail {
    pub sid: u8,
    pub public_key: [u8; PUBLIC_KEY_SIZE],
    pub signature: [u8; SIGNATURE_SIZE],
    pub nonces: [u32; 3],
}

impl SignedTail {
    pub fn account_type(&self) -> Option<AccountType> {
        AccountType::from_tag(self.sid)
    }

    /// Address derived from the signer's public key
    pub fn signer(&self) -> Option<Address> {
        self.account_type().map(|ty| Address::from_public_key(&self.public_key, ty))
    }
}

/// Parsed view over transaction bytes
#[derive(Debug, Clone)]
pub struct TransactionView<'a> {
    bytes: &'a [u8],
    unsigned_len: usize,
    header: TxHeader,
    target: ContractTarget,
    delegatee: Option<Address>,
    input_offset: usize,
    input_len: usize,
    tail: Option<SignedTail>,
}

impl<'a> TransactionView<'a> {
    /// Parse unsigned or finalized transaction bytes
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        match Self::parse_unsigned(bytes) {
            Ok(view) => Ok(view),
            Err(err) => {
                if bytes.len() < SIGNED_TAIL_SIZE {
                    return Err(err);
                }
                let split = bytes.len() - SIGNED_TAIL_SIZE;
                if bytes[split] != AccountType::Ed25519 as u8 {
                    return Err(err);
                }
                let mut view = Self::parse_unsigned(&bytes[..split])?;
                view.bytes = bytes;
                view.tail = Some(parse_tail(&bytes[split..])?);
                Ok(view)
            }
        }
    }

    fn parse_unsigned(bytes: &'a [u8]) -> Result<Self> {
        let mut input = bytes;
        let version = read_u8(&mut input)?;
        let packflag = read_u8(&mut input)?;
        let mut ts = [0u8; 8];
        ts[..TIMESTAMP_BYTES].copy_from_slice(take(&mut input, TIMESTAMP_BYTES)?);
        let timestamp = u64::from_le_bytes(ts);
        let isn = read_u32(&mut input)?;
        let packed = read_u16(&mut input)?;
        let mode = read_u16(&mut input)?;
        let opcode = read_u8(&mut input)?;
        let core_contract = read_u8(&mut input)?;
        let gas_mantissa = read_u32(&mut input)?;
        let gas_exponent = read_u16(&mut input)?;
        let gas_limit = read_u32(&mut input)?;
        debug_assert_eq!(bytes.len() - input.len(), TX_FIXED_HEADER_SIZE);

        let header = TxHeader {
            version,
            packflag,
            timestamp,
            isn,
            ttl: extract_ttl(packed),
            signer_count: extract_signer_count(packed),
            token_count: extract_token_count(packed),
            mode,
            opcode,
            core_contract,
            gas_mantissa,
            gas_exponent,
            gas_limit,
        };

        let target = if header.is_rvm() {
            ContractTarget::Invoke(ContractInvokeId::from_raw(read_u64(&mut input)?))
        } else {
            ContractTarget::Build(read_u8(&mut input)?)
        };

        let rest_offset = bytes.len() - input.len();
        let plain = input_len_at(input, 0).filter(|&n| 2 + n == input.len());
        let delegated = input_len_at(input, ADDRESS_SIZE)
            .filter(|&n| ADDRESS_SIZE + 2 + n == input.len())
            .and_then(|n| Address::from_bytes(&input[..ADDRESS_SIZE]).ok().map(|a| (a, n)));

        let (delegatee, input_offset, input_len) = match (plain, delegated) {
            (Some(_), Some((address, n))) if header.target_mode() == Some(TargetMode::ScopeAddress) => {
                (Some(address), rest_offset + ADDRESS_SIZE + 2, n)
            }
            (Some(n), _) => (None, rest_offset + 2, n),
            (None, Some((address, n))) => (Some(address), rest_offset + ADDRESS_SIZE + 2, n),
            (None, None) => {
                return Err(ClientError::InvalidTransaction(format!(
                    "{} trailing bytes match neither input layout",
                    input.len()
                )))
            }
        };

        Ok(Self {
            bytes,
            unsigned_len: bytes.len(),
            header,
            target,
            delegatee,
            input_offset,
            input_len,
            tail: None,
        })
    }

    pub fn header(&self) -> &TxHeader {
        &self.header
    }

    pub fn target(&self) -> ContractTarget {
        self.target
    }

    pub fn delegatee(&self) -> Option<&Address> {
        self.delegatee.as_ref()
    }

    /// Offset of the argument payload within the parsed bytes
    pub fn input_offset(&self) -> usize {
        self.input_offset
    }

    /// Argument payload
    pub fn input(&self) -> &'a [u8] {
        &self.bytes[self.input_offset..self.input_offset + self.input_len]
    }

    /// Bytes before the signature block
    pub fn unsigned_bytes(&self) -> &'a [u8] {
        &self.bytes[..self.unsigned_len]
    }

    /// Bytes covered by the signature and the PoW search
    pub fn signed_bytes(&self) -> Option<&'a [u8]> {
        self.tail.as_ref().map(|_| &self.bytes[..self.bytes.len() - NONCES_SIZE])
    }

    pub fn signed_tail(&self) -> Option<&SignedTail> {
        self.tail.as_ref()
    }

    pub fn is_signed(&self) -> bool {
        self.tail.is_some()
    }
}

fn input_len_at(rest: &[u8], at: usize) -> Option<usize> {
    rest.get(at..at + 2).map(|b| u16::from_le_bytes([b[0], b[1]]) as usize)
}

fn parse_tail(bytes: &[u8]) -> Result<SignedTail> {
    let mut input = bytes;
    let sid = read_u8(&mut input)?;
    let mut public_key = [0u8; PUBLIC_KEY_SIZE];
    public_key.copy_from_slice(take(&mut input, PUBLIC_KEY_SIZE)?);
    let mut signature = [0u8; SIGNATURE_SIZE];
    signature.copy_from_slice(take(&mut input, SIGNATURE_SIZE)?);
    let nonces = [read_u32(&mut input)?, read_u32(&mut input)?, read_u32(&mut input)?];
    Ok(SignedTail {
        sid,
        public_key,
        signature,
        nonces,
    })
}

fn take<'a>(input: &mut &'a [u8], n: usize) -> Result<&'a [u8]> {
    if input.len() < n {
        return Err(ClientError::InvalidTransaction(format!(
            "truncated: needed {} bytes, {} available",
            n,
            input.len()
        )));
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
    let mut word = [0u8; 8];
    word.copy_from_slice(b);
    Ok(u64::from_le_bytes(word))
}
