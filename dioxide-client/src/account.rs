//! # Ed25519 Account
//!
//! Signs composed transactions. A finalized transaction is
//!
//! ```text
//! txdata | sid(1) | public key(32) | signature(64) | nonces(12)
//! ```
//!
//! where the signature covers `txdata | sid | public key` and the PoW search
//! covers everything before the nonces.

use std::fmt;
use std::time::Instant;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

use dioxide_spec::address::decode_base32;
use dioxide_spec::{AccountType, Address};

use crate::error::{ClientError, Result};
use crate::pow;
use crate::view::{TransactionView, PUBLIC_KEY_SIZE};

/// Secret key size
pub const SECRET_KEY_SIZE: usize = 32;

/// Persisted account form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountJson {
    /// base64 of the 64-byte keypair (secret followed by public key)
    pub private_key: String,
    /// base64 of the public key
    pub public_key: String,
    pub address: String,
    pub address_type: String,
}

/// Ed25519 signer with its derived address
#[derive(Clone)]
pub struct Ed25519Account {
    signing_key: SigningKey,
    address: Address,
}

impl Ed25519Account {
    pub fn from_secret(secret: &[u8; SECRET_KEY_SIZE]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(secret))
    }

    /// Fresh random account
    pub fn generate<R: CryptoRngCore + ?Sized>(rng: &mut R) -> Self {
        Self::from_signing_key(SigningKey::generate(rng))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let address = Address::from_public_key(signing_key.verifying_key().as_bytes(), AccountType::Ed25519);
        Self { signing_key, address }
    }

    /// Account from base64 key material; only the first 32 bytes are used
    pub fn from_base64(key: &str) -> Result<Self> {
        let bytes = BASE64.decode(key.trim())?;
        let secret: [u8; SECRET_KEY_SIZE] = bytes
            .get(..SECRET_KEY_SIZE)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| ClientError::InvalidKey(format!("{} bytes of key material", bytes.len())))?;
        Ok(Self::from_secret(&secret))
    }

    pub fn public_key(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.signing_key.verifying_key().to_bytes()
    }

    pub fn secret_key(&self) -> [u8; SECRET_KEY_SIZE] {
        self.signing_key.to_bytes()
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn account_type(&self) -> AccountType {
        AccountType::Ed25519
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Append `sid | public key | signature` to `txdata`
    pub fn sign_transaction(&self, txdata: &[u8]) -> Vec<u8> {
        let mut signed = Vec::with_capacity(txdata.len() + 1 + PUBLIC_KEY_SIZE + 64 + pow::NONCE_COUNT * 4);
        signed.extend_from_slice(txdata);
        signed.push(self.account_type() as u8);
        signed.extend_from_slice(&self.public_key());
        let signature = self.sign(&signed);
        signed.extend_from_slice(&signature);
        signed
    }

    /// Sign `txdata`, search the PoW nonces and append them
    pub fn finalize(&self, txdata: &[u8], deadline: Instant) -> Result<Vec<u8>> {
        let mut signed = self.sign_transaction(txdata);
        let nonces = pow::solve(&signed, deadline)?;
        pow::append_nonces(&mut signed, &nonces);
        debug!(signer = %self.address, size = signed.len(), "finalized transaction");
        Ok(signed)
    }

    pub fn to_json(&self) -> AccountJson {
        AccountJson {
            private_key: BASE64.encode(self.signing_key.to_keypair_bytes()),
            public_key: BASE64.encode(self.public_key()),
            address: self.address.to_account_text(),
            address_type: self.account_type().name().to_ascii_uppercase(),
        }
    }

    /// Restore an account, checking the stored public key and address
    pub fn from_json(json: &AccountJson) -> Result<Self> {
        if AccountType::from_name(&json.address_type) != Some(AccountType::Ed25519) {
            return Err(ClientError::InvalidKey(format!("unsupported address type {}", json.address_type)));
        }
        let account = Self::from_base64(&json.private_key)?;
        if BASE64.decode(json.public_key.trim())? != account.public_key() {
            return Err(ClientError::InvalidKey("public key does not match private key".to_string()));
        }
        let stored = json.address.split(':').next().and_then(decode_base32);
        if stored.as_deref() != Some(&account.address.as_bytes()[..]) {
            return Err(ClientError::InvalidKey(format!("address {} does not match key", json.address)));
        }
        Ok(account)
    }
}

impl fmt::Debug for Ed25519Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519Account").field("address", &self.address).finish_non_exhaustive()
    }
}

/// Verify the signature and nonces of a finalized transaction
pub fn verify_transaction(bytes: &[u8]) -> Result<bool> {
    let view = TransactionView::parse(bytes)?;
    let (tail, signed) = match (view.signed_tail(), view.signed_bytes()) {
        (Some(tail), Some(signed)) => (tail, signed),
        _ => return Ok(false),
    };
    if tail.account_type() != Some(AccountType::Ed25519) {
        return Ok(false);
    }
    let key = VerifyingKey::from_bytes(&tail.public_key)
        .map_err(|e| ClientError::InvalidKey(e.to_string()))?;
    let message = &signed[..signed.len() - tail.signature.len()];
    if key.verify_strict(message, &Signature::from_bytes(&tail.signature)).is_err() {
        return Ok(false);
    }
    pow::verify(signed, &tail.nonces)
}
