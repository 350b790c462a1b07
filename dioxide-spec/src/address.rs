//! # Addresses
//!
//! A Dioxide address is 36 bytes: a 32-byte payload followed by a 4-byte
//! little-endian checksum. The low nibble of the checksum holds the address
//! tag; the upper 28 bits are the CRC-32C of the payload seeded with the tag.
//!
//! ```text
//! Offset  Size  Field
//! 0       32    payload (public key, hash, or zero-padded name)
//! 32      4     tag | (crc32c(payload, seed = tag) & 0xFFFFFFF0)
//! ```
//!
//! Text forms:
//! - default (key-derived): lowercase Crockford base32 of all 36 bytes
//! - delegated: `<name>:dapp`, `<name>:token`, `<name>:name`
//! - hash: `<base32>:hash`

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SpecError};

/// Total address size in bytes
pub const ADDRESS_SIZE: usize = 36;

/// Payload size in bytes
pub const ADDRESS_PAYLOAD_SIZE: usize = 32;

/// Tag nibble of the checksum word
pub const ADDRESS_TAG_MASK: u32 = 0xF;

/// CRC bits kept in the checksum word
pub const ADDRESS_CRC_MASK: u32 = 0xFFFF_FFF0;

/// Address kinds, identified by the checksum tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AddressType {
    Default = 0,
    Hash = 8,
    Name = 9,
    Dapp = 10,
    Token = 11,
}

impl AddressType {
    /// Text suffix used by the `name:type` form
    pub fn suffix(self) -> &'static str {
        match self {
            AddressType::Default => "default",
            AddressType::Hash => "hash",
            AddressType::Name => "name",
            AddressType::Dapp => "dapp",
            AddressType::Token => "token",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix.to_ascii_lowercase().as_str() {
            "hash" => Some(AddressType::Hash),
            "name" => Some(AddressType::Name),
            "dapp" => Some(AddressType::Dapp),
            "token" => Some(AddressType::Token),
            _ => None,
        }
    }

    /// Classify a checksum tag; account tags (0-7) are default addresses
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            8 => AddressType::Hash,
            9 => AddressType::Name,
            10 => AddressType::Dapp,
            11 => AddressType::Token,
            _ => AddressType::Default,
        }
    }

    /// Length range of delegated names
    fn name_length(self) -> Option<(usize, usize)> {
        match self {
            AddressType::Dapp => Some((4, 8)),
            AddressType::Token => Some((3, 8)),
            AddressType::Name => Some((3, 32)),
            AddressType::Default | AddressType::Hash => None,
        }
    }

    /// Charset of delegated names
    fn name_char_allowed(self, c: u8) -> bool {
        match self {
            AddressType::Dapp => c.is_ascii_alphanumeric() || c == b'_',
            AddressType::Token => {
                c.is_ascii_uppercase() || c.is_ascii_digit() || c == b'-' || c == b'#'
            }
            AddressType::Name => c.is_ascii_alphanumeric() || b"_-!#$@&^*()[]{}<>,;?~".contains(&c),
            AddressType::Default | AddressType::Hash => false,
        }
    }
}

/// Signature schemes of key-derived addresses; the value is the address tag
/// and the `sid` byte of a signed transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AccountType {
    Ethereum = 1,
    BitcoinP2pkh = 2,
    Ed25519 = 3,
    Sm2 = 4,
}

impl AccountType {
    pub fn name(self) -> &'static str {
        match self {
            AccountType::Ethereum => "ethereum",
            AccountType::BitcoinP2pkh => "bitcoin_p2pkh",
            AccountType::Ed25519 => "ed25519",
            AccountType::Sm2 => "sm2",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ethereum" => Some(AccountType::Ethereum),
            "bitcoin_p2pkh" => Some(AccountType::BitcoinP2pkh),
            "ed25519" => Some(AccountType::Ed25519),
            "sm2" => Some(AccountType::Sm2),
            _ => None,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(AccountType::Ethereum),
            2 => Some(AccountType::BitcoinP2pkh),
            3 => Some(AccountType::Ed25519),
            4 => Some(AccountType::Sm2),
            _ => None,
        }
    }
}

/// Checksum word for a payload under a tag
pub fn checksum(payload: &[u8; ADDRESS_PAYLOAD_SIZE], tag: u8) -> u32 {
    let tag = tag as u32 & ADDRESS_TAG_MASK;
    tag | (crc32c::crc32c_append(tag, payload) & ADDRESS_CRC_MASK)
}

/// Check a delegated name against the charset and length rule of its type
pub fn validate_delegated_name(name: &str, address_type: AddressType) -> Result<()> {
    let invalid = || SpecError::InvalidDelegatedName {
        kind: address_type.suffix(),
        name: name.to_string(),
    };
    let (min, max) = address_type.name_length().ok_or_else(invalid)?;
    let bytes = name.as_bytes();
    if bytes.len() < min
        || bytes.len() > max
        || !bytes.iter().all(|&c| address_type.name_char_allowed(c))
    {
        return Err(invalid());
    }
    Ok(())
}

/// A 36-byte checksummed address
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    /// Build an address from a payload and tag, computing the checksum
    pub fn from_payload(payload: [u8; ADDRESS_PAYLOAD_SIZE], tag: u8) -> Self {
        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes[..ADDRESS_PAYLOAD_SIZE].copy_from_slice(&payload);
        bytes[ADDRESS_PAYLOAD_SIZE..].copy_from_slice(&checksum(&payload, tag).to_le_bytes());
        Self(bytes)
    }

    /// Key-derived address
    pub fn from_public_key(public_key: &[u8; ADDRESS_PAYLOAD_SIZE], account: AccountType) -> Self {
        Self::from_payload(*public_key, account as u8)
    }

    /// Delegated address for a dapp, token or name
    pub fn from_name(name: &str, address_type: AddressType) -> Result<Self> {
        validate_delegated_name(name, address_type)?;
        let mut payload = [0u8; ADDRESS_PAYLOAD_SIZE];
        payload[..name.len()].copy_from_slice(name.as_bytes());
        Ok(Self::from_payload(payload, address_type as u8))
    }

    /// Parse 36 raw bytes, verifying the checksum
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; ADDRESS_SIZE] = bytes.try_into().map_err(|_| SpecError::InvalidAddressLength {
            expected: ADDRESS_SIZE,
            found: bytes.len(),
        })?;
        let address = Self(raw);
        let expected = checksum(&address.payload_array(), address.tag());
        let found = address.checksum_word();
        if expected != found {
            return Err(SpecError::InvalidChecksum { expected, found });
        }
        Ok(address)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    pub fn payload(&self) -> &[u8] {
        &self.0[..ADDRESS_PAYLOAD_SIZE]
    }

    fn payload_array(&self) -> [u8; ADDRESS_PAYLOAD_SIZE] {
        let mut payload = [0u8; ADDRESS_PAYLOAD_SIZE];
        payload.copy_from_slice(self.payload());
        payload
    }

    fn checksum_word(&self) -> u32 {
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.0[ADDRESS_PAYLOAD_SIZE..]);
        u32::from_le_bytes(word)
    }

    /// Tag nibble of the checksum
    pub fn tag(&self) -> u8 {
        self.0[ADDRESS_PAYLOAD_SIZE] & ADDRESS_TAG_MASK as u8
    }

    pub fn address_type(&self) -> AddressType {
        AddressType::from_tag(self.tag())
    }

    /// Signature scheme for key-derived addresses
    pub fn account_type(&self) -> Option<AccountType> {
        AccountType::from_tag(self.tag())
    }

    pub fn is_delegated(&self) -> bool {
        matches!(
            self.address_type(),
            AddressType::Name | AddressType::Dapp | AddressType::Token
        )
    }

    /// Delegated name with the zero padding stripped
    pub fn name(&self) -> Option<String> {
        if !self.is_delegated() {
            return None;
        }
        let end = self.payload().iter().position(|&b| b == 0).unwrap_or(ADDRESS_PAYLOAD_SIZE);
        Some(String::from_utf8_lossy(&self.payload()[..end]).into_owned())
    }

    /// Canonical text form
    pub fn to_text(&self) -> String {
        match (self.address_type(), self.name()) {
            (AddressType::Hash, _) => format!("{}:{}", encode_base32(&self.0), AddressType::Hash.suffix()),
            (ty, Some(name)) => format!("{}:{}", name, ty.suffix()),
            _ => encode_base32(&self.0),
        }
    }

    /// Text form with the account suffix used when addressing a signer
    pub fn to_account_text(&self) -> String {
        match self.account_type() {
            Some(account) => format!("{}:{}", encode_base32(&self.0), account.name()),
            None => self.to_text(),
        }
    }
}

/// Lowercase Crockford base32
pub fn encode_base32(bytes: &[u8]) -> String {
    base32::encode(base32::Alphabet::Crockford, bytes).to_ascii_lowercase()
}

/// Decode Crockford base32 (case-insensitive)
pub fn decode_base32(text: &str) -> Option<Vec<u8>> {
    base32::decode(base32::Alphabet::Crockford, &text.to_ascii_uppercase())
}

fn decode_base32_address(text: &str) -> Result<Address> {
    let bytes = decode_base32(text).ok_or_else(|| SpecError::InvalidAddressText(text.to_string()))?;
    Address::from_bytes(&bytes)
}

impl FromStr for Address {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let Some((prefix, suffix)) = s.split_once(':') else {
            return decode_base32_address(s);
        };

        if let Some(address_type) = AddressType::from_suffix(suffix) {
            if address_type == AddressType::Hash {
                let address = decode_base32_address(prefix)?;
                if address.address_type() != AddressType::Hash {
                    return Err(SpecError::InvalidAddressText(s.to_string()));
                }
                return Ok(address);
            }
            return Address::from_name(prefix, address_type);
        }

        match AccountType::from_name(suffix) {
            Some(account) => {
                let address = decode_base32_address(prefix)?;
                if address.tag() != account as u8 {
                    return Err(SpecError::InvalidAddressText(s.to_string()));
                }
                Ok(address)
            }
            None => Err(SpecError::InvalidAddressText(s.to_string())),
        }
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = SpecError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Address::from_bytes(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_text())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_text())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32c_check_value() {
        assert_eq!(crc32c::crc32c(b"123456789"), 0xe306_9283);
    }

    #[test]
    fn test_dapp_address_bytes() {
        let addr = Address::from_name("testa", AddressType::Dapp).unwrap();
        assert_eq!(
            hex::encode(addr.as_bytes()),
            "74657374610000000000000000000000000000000000000000000000000000002af1c50a"
        );
        assert_eq!(addr.to_text(), "testa:dapp");
        assert_eq!(addr.name().as_deref(), Some("testa"));
    }

    #[test]
    fn test_token_and_name_bytes() {
        let token = Address::from_name("DIO", AddressType::Token).unwrap();
        assert_eq!(
            hex::encode(token.as_bytes()),
            "44494f0000000000000000000000000000000000000000000000000000000000eb23a3c3"
        );
        let name = Address::from_name("testa", AddressType::Name).unwrap();
        assert_eq!(
            hex::encode(name.as_bytes()),
            "746573746100000000000000000000000000000000000000000000000000000079802e4c"
        );
        assert_ne!(name, Address::from_name("testa", AddressType::Dapp).unwrap());
    }

    #[test]
    fn test_public_key_address_text() {
        let pk: [u8; 32] = std::array::from_fn(|i| i as u8);
        let addr = Address::from_public_key(&pk, AccountType::Ed25519);
        assert_eq!(addr.tag(), 3);
        assert_eq!(addr.account_type(), Some(AccountType::Ed25519));
        let text = addr.to_text();
        assert_eq!(text, "000g40r40m30e209185gr38e1w8124gk2gahc5rr34d1p70x3rfh621p00");
        assert_eq!(text.parse::<Address>().unwrap(), addr);
        assert_eq!(format!("{}:ed25519", text).parse::<Address>().unwrap(), addr);
        assert!(format!("{}:sm2", text).parse::<Address>().is_err());
    }

    #[test]
    fn test_name_rules() {
        assert!(Address::from_name("abc", AddressType::Dapp).is_err());
        assert!(Address::from_name("abcdefghi", AddressType::Dapp).is_err());
        assert!(Address::from_name("my_app", AddressType::Dapp).is_ok());
        assert!(Address::from_name("my-app", AddressType::Dapp).is_err());

        assert!(Address::from_name("DIO", AddressType::Token).is_ok());
        assert!(Address::from_name("USD-1#", AddressType::Token).is_ok());
        assert!(Address::from_name("dio", AddressType::Token).is_err());
        assert!(Address::from_name("DI", AddressType::Token).is_err());

        assert!(Address::from_name("alice(1)!", AddressType::Name).is_ok());
        assert!(Address::from_name(&"a".repeat(32), AddressType::Name).is_ok());
        assert!(Address::from_name(&"a".repeat(33), AddressType::Name).is_err());
        assert!(Address::from_name("a b c", AddressType::Name).is_err());

        assert!(Address::from_name("abcd", AddressType::Default).is_err());
    }

    #[test]
    fn test_checksum_verification() {
        let addr = Address::from_name("testa", AddressType::Dapp).unwrap();
        let mut bytes = *addr.as_bytes();
        assert_eq!(Address::from_bytes(&bytes).unwrap(), addr);
        bytes[0] ^= 1;
        assert!(matches!(Address::from_bytes(&bytes), Err(SpecError::InvalidChecksum { .. })));
        assert!(matches!(
            Address::from_bytes(&bytes[..35]),
            Err(SpecError::InvalidAddressLength { expected: 36, found: 35 })
        ));
    }

    #[test]
    fn test_text_roundtrip() {
        for text in ["testa:dapp", "DIO:token", "alice:name"] {
            let addr: Address = text.parse().unwrap();
            assert_eq!(addr.to_string(), text);
        }
        let hash = Address::from_payload([7u8; 32], AddressType::Hash as u8);
        assert_eq!(hash.to_text().parse::<Address>().unwrap(), hash);
        assert!("testa:bogus".parse::<Address>().is_err());
        assert!("not base32!".parse::<Address>().is_err());
    }
}
