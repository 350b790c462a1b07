//! # Wire Layout Constants and Helpers
//!
//! Centralized constants and bit helpers for the packed identifiers and the
//! fixed transaction header.
//!
//! ## ContractId Layout (64-bit)
//!
//! ```text
//! [dapp:28][engine:4][sn:12][scope:12][build:8]
//!  63..36   35..32    31..20  19..8     7..0
//! ```
//!
//! ## Transaction Header (little-endian)
//!
//! ```text
//! Offset  Size  Field
//! 0       1     version
//! 1       1     packflag
//! 2       6     timestamp (ms, 48 bits)
//! 8       4     isn
//! 12      2     ttl | signer count | token count
//! 14      2     mode
//! 16      1     opcode
//! 17      1     core contract byte
//! 18      4     gas price mantissa
//! 22      2     gas price exponent
//! 24      4     gas limit
//! 28      ...   build (1) or invoke id (8), delegatee (36, optional),
//!               input length (2), input
//! ```

// ============================================================================
// ContractId Bit Positions
// ============================================================================

/// Build number field: bits 0-7
pub const BUILD_SHIFT: u32 = 0;

/// Scope field: bits 8-19
pub const SCOPE_SHIFT: u32 = 8;

/// Serial number field: bits 20-31
pub const SN_SHIFT: u32 = 20;

/// Engine id field: bits 32-35
pub const ENGINE_SHIFT: u32 = 32;

/// DApp id field: bits 36-63
pub const DAPP_SHIFT: u32 = 36;

// ============================================================================
// ContractId Field Masks
// ============================================================================

/// Build mask (8 bits)
pub const BUILD_MASK: u64 = 0xFF;

/// Scope mask (12 bits)
pub const SCOPE_MASK: u64 = 0xFFF;

/// Serial number mask (12 bits)
pub const SN_MASK: u64 = 0xFFF;

/// Engine id mask (4 bits)
pub const ENGINE_MASK: u64 = 0xF;

/// DApp id mask (28 bits)
pub const DAPP_MASK: u64 = 0x0FFF_FFFF;

/// Low 20 bits carrying scope and build
pub const SCOPE_BUILD_MASK: u64 = 0xF_FFFF;

// ============================================================================
// Core Contract Byte
// ============================================================================

/// Low 6 bits of the core contract byte select a core contract
pub const CORE_CONTRACT_SN_MASK: u8 = 0x3F;

/// Scope occupies the top 2 bits of the core contract byte
pub const CORE_CONTRACT_SCOPE_SHIFT: u32 = 6;

/// Sentinel selecting a generic RVM contract (followed by an 8-byte invoke id)
pub const CORE_CONTRACT_RVM: u8 = 0x3F;

// ============================================================================
// Transaction Header
// ============================================================================

/// Size of the fixed header preceding the contract selector
pub const TX_FIXED_HEADER_SIZE: usize = 28;

/// Offset of the packed ttl/signer/token field
pub const TX_TTL_OFFSET: usize = 12;

/// Offset of the mode field
pub const TX_MODE_OFFSET: usize = 14;

/// Offset of the opcode byte
pub const TX_OPCODE_OFFSET: usize = 16;

/// Offset of the core contract byte
pub const TX_CORE_CONTRACT_OFFSET: usize = 17;

/// Timestamp is truncated to 48 bits
pub const TIMESTAMP_BYTES: usize = 6;

/// TTL field: bits 0-8 (stored as ttl - 1)
pub const TTL_MASK: u16 = 0x1FF;

/// Signer count field: bits 9-12 (stored as count - 1)
pub const SIGNER_COUNT_SHIFT: u32 = 9;
pub const SIGNER_COUNT_MASK: u16 = 0xF;

/// Token count field: bits 13-14
pub const TOKEN_COUNT_SHIFT: u32 = 13;
pub const TOKEN_COUNT_MASK: u16 = 0x3;

/// Largest TTL the 9-bit field can carry
pub const MAX_TTL: u16 = 512;

/// Largest signer count the 4-bit field can carry
pub const MAX_SIGNER_COUNT: u8 = 16;

/// Largest token count the 2-bit field can carry
pub const MAX_TOKEN_COUNT: u8 = 3;

/// Gas price mantissa width in bits
pub const GAS_MANTISSA_BITS: u32 = 32;

// ============================================================================
// Field Extraction Functions
// ============================================================================

/// Extract build number (bits 0-7)
#[inline]
pub const fn extract_build(raw: u64) -> u8 {
    ((raw >> BUILD_SHIFT) & BUILD_MASK) as u8
}

/// Extract scope (bits 8-19)
#[inline]
pub const fn extract_scope(raw: u64) -> u16 {
    ((raw >> SCOPE_SHIFT) & SCOPE_MASK) as u16
}

/// Extract serial number (bits 20-31)
#[inline]
pub const fn extract_sn(raw: u64) -> u16 {
    ((raw >> SN_SHIFT) & SN_MASK) as u16
}

/// Extract engine id (bits 32-35)
#[inline]
pub const fn extract_engine(raw: u64) -> u8 {
    ((raw >> ENGINE_SHIFT) & ENGINE_MASK) as u8
}

/// Extract dapp id (bits 36-63)
#[inline]
pub const fn extract_dapp(raw: u64) -> u32 {
    ((raw >> DAPP_SHIFT) & DAPP_MASK) as u32
}

/// Extract TTL from the packed header field
#[inline]
pub const fn extract_ttl(packed: u16) -> u16 {
    (packed & TTL_MASK) + 1
}

/// Extract signer count from the packed header field
#[inline]
pub const fn extract_signer_count(packed: u16) -> u8 {
    (((packed >> SIGNER_COUNT_SHIFT) & SIGNER_COUNT_MASK) + 1) as u8
}

/// Extract token count from the packed header field
#[inline]
pub const fn extract_token_count(packed: u16) -> u8 {
    ((packed >> TOKEN_COUNT_SHIFT) & TOKEN_COUNT_MASK) as u8
}

// ============================================================================
// Packing Functions
// ============================================================================

/// Pack contract id components into the 64-bit layout
#[inline]
pub const fn pack_contract_id(dapp: u32, engine: u8, sn: u16, scope: u16, build: u8) -> u64 {
    (((dapp as u64) & DAPP_MASK) << DAPP_SHIFT)
        | (((engine as u64) & ENGINE_MASK) << ENGINE_SHIFT)
        | (((sn as u64) & SN_MASK) << SN_SHIFT)
        | (((scope as u64) & SCOPE_MASK) << SCOPE_SHIFT)
        | (((build as u64) & BUILD_MASK) << BUILD_SHIFT)
}

/// Pack TTL, signer count and token count into the 16-bit header field
///
/// `ttl` and `signer_count` are stored minus one; callers validate ranges.
#[inline]
pub const fn pack_ttl_sc_tsc(ttl: u16, signer_count: u8, token_count: u8) -> u16 {
    (((token_count as u16) & TOKEN_COUNT_MASK) << TOKEN_COUNT_SHIFT)
        | (((signer_count.wrapping_sub(1) as u16) & SIGNER_COUNT_MASK) << SIGNER_COUNT_SHIFT)
        | (ttl.wrapping_sub(1) & TTL_MASK)
}

// ============================================================================
// Gas Price
// ============================================================================

/// Encode a gas price as a 32-bit mantissa and 16-bit exponent
///
/// Prices wider than 32 bits lose their low bits.
#[inline]
pub const fn encode_gas_price(gas_price: u64) -> (u32, u16) {
    if gas_price == 0 {
        return (0, 0);
    }
    let bits = u64::BITS - gas_price.leading_zeros();
    if bits > GAS_MANTISSA_BITS {
        let exponent = bits - GAS_MANTISSA_BITS;
        ((gas_price >> exponent) as u32, exponent as u16)
    } else {
        (gas_price as u32, 0)
    }
}

/// Reconstruct a gas price from mantissa and exponent
///
/// Returns `None` if the result does not fit in 64 bits.
#[inline]
pub const fn decode_gas_price(mantissa: u32, exponent: u16) -> Option<u64> {
    let mantissa = mantissa as u64;
    if mantissa == 0 {
        return Some(0);
    }
    let bits = u64::BITS - mantissa.leading_zeros();
    if bits + exponent as u32 > u64::BITS {
        return None;
    }
    Some(mantissa << exponent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_id_fields() {
        let raw = 73152856577u64;
        assert_eq!(extract_dapp(raw), 1);
        assert_eq!(extract_engine(raw), 1);
        assert_eq!(extract_sn(raw), 132);
        assert_eq!(extract_scope(raw), 2);
        assert_eq!(extract_build(raw), 1);
        assert_eq!(pack_contract_id(1, 1, 132, 2, 1), raw);
    }

    #[test]
    fn test_ttl_field() {
        let packed = pack_ttl_sc_tsc(120, 1, 0);
        assert_eq!(packed, 0x0077);
        assert_eq!(extract_ttl(packed), 120);
        assert_eq!(extract_signer_count(packed), 1);
        assert_eq!(extract_token_count(packed), 0);

        let packed = pack_ttl_sc_tsc(512, 16, 3);
        assert_eq!(extract_ttl(packed), 512);
        assert_eq!(extract_signer_count(packed), 16);
        assert_eq!(extract_token_count(packed), 3);
    }

    #[test]
    fn test_gas_price_small() {
        assert_eq!(encode_gas_price(0), (0, 0));
        assert_eq!(encode_gas_price(100), (100, 0));
        assert_eq!(encode_gas_price(u32::MAX as u64), (u32::MAX, 0));
        assert_eq!(decode_gas_price(100, 0), Some(100));
    }

    #[test]
    fn test_gas_price_wide() {
        let price = (1u64 << 40) + 12345;
        let (mantissa, exponent) = encode_gas_price(price);
        assert_eq!(exponent, 9);
        assert_eq!(mantissa, 0x8000_0018);
        let back = decode_gas_price(mantissa, exponent).unwrap();
        assert!(back <= price && price - back < (1 << exponent));
    }

    #[test]
    fn test_gas_price_overflow() {
        assert_eq!(decode_gas_price(u32::MAX, 33), None);
        assert_eq!(decode_gas_price(u32::MAX, 32), Some((u32::MAX as u64) << 32));
    }
}
