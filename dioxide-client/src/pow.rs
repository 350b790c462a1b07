//! # Proof-of-Work Nonce Search
//!
//! A finalized transaction carries three 32-bit nonces. Each nonce `n` must
//! make `sha256(seed || n_le)` satisfy the difficulty target, where `seed` is
//! the first 60 bytes of `sha512(tx)`. The difficulty grows with the
//! transaction size and TTL.

use std::time::Instant;

use dioxide_spec::encoding::{TTL_MASK, TX_TTL_OFFSET};
use sha2::{Digest, Sha256, Sha512};
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::view::NONCES_SIZE;

/// Number of nonces in a finalized transaction
pub const NONCE_COUNT: usize = 3;

/// Bytes of the sha512 digest used as the search seed
pub const SEED_SIZE: usize = 60;

/// Candidates tried between deadline checks
pub const DEADLINE_CHECK_INTERVAL: u32 = 4096;

/// Smallest accepted denominator; keeps the zero tail inside a 32-byte hash
pub const MIN_DENOMINATOR: u64 = 256;

/// Largest accepted denominator
pub const MAX_DENOMINATOR: u64 = 1 << 63;

const HASH_SIZE: usize = 32;

/// Difficulty target derived from a denominator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowDifficulty {
    target: u32,
    non_zero_bytes: usize,
}

impl PowDifficulty {
    /// Derive the target for `denominator`, clamped to
    /// `MIN_DENOMINATOR..=MAX_DENOMINATOR`
    pub fn new(denominator: u64) -> Self {
        let denominator = denominator.clamp(MIN_DENOMINATOR, MAX_DENOMINATOR);
        let mut num = MAX_DENOMINATOR / denominator;
        let shift = num.leading_zeros();
        num <<= shift;

        let exp = (HASH_SIZE as u32) * 8 - 63 - shift;
        let mut bytes = (exp / 8) as usize;
        let residue = exp % 8;
        if residue != 0 {
            bytes += 1;
            num >>= 8 - residue;
        }

        Self {
            target: (num >> 32) as u32,
            non_zero_bytes: bytes + 8,
        }
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    /// Offset where the mandatory zero tail begins
    pub fn non_zero_bytes(&self) -> usize {
        self.non_zero_bytes
    }

    /// Check a candidate hash against the target
    pub fn is_satisfied(&self, hash: &[u8; HASH_SIZE]) -> bool {
        let nz = self.non_zero_bytes;
        let mut word = [0u8; 4];
        word.copy_from_slice(&hash[nz - 4..nz]);
        u32::from_le_bytes(word) < self.target && hash[nz..].iter().all(|&b| b == 0)
    }
}

/// Denominator for a transaction of `len` bytes (nonces excluded) and `ttl`
pub fn denominator_for(len: usize, ttl: u16) -> u64 {
    (1000 + (len as u64 + NONCES_SIZE as u64) * (ttl as u64 * 10 + 100)) / 3
}

/// TTL stored in the transaction header
pub fn ttl_from_tx(tx: &[u8]) -> Result<u16> {
    let field = tx
        .get(TX_TTL_OFFSET..TX_TTL_OFFSET + 2)
        .ok_or_else(|| ClientError::InvalidTransaction(format!("{} bytes too short for a header", tx.len())))?;
    Ok(1 + (u16::from_le_bytes([field[0], field[1]]) & TTL_MASK))
}

/// Difficulty that `tx` must meet
pub fn difficulty_for(tx: &[u8]) -> Result<PowDifficulty> {
    Ok(PowDifficulty::new(denominator_for(tx.len(), ttl_from_tx(tx)?)))
}

fn seed(tx: &[u8]) -> [u8; SEED_SIZE + 4] {
    let digest = Sha512::digest(tx);
    let mut buf = [0u8; SEED_SIZE + 4];
    buf[..SEED_SIZE].copy_from_slice(&digest[..SEED_SIZE]);
    buf
}

fn candidate(buf: &mut [u8; SEED_SIZE + 4], nonce: u32) -> [u8; HASH_SIZE] {
    buf[SEED_SIZE..].copy_from_slice(&nonce.to_le_bytes());
    Sha256::digest(&buf[..]).into()
}

/// Find the three nonces for `tx`
///
/// The counter continues across slots, so the nonces are strictly
/// increasing. Returns `Timeout` once `deadline` has passed and
/// `PowExhausted` if the 32-bit counter runs out.
pub fn solve(tx: &[u8], deadline: Instant) -> Result<[u32; NONCE_COUNT]> {
    let difficulty = difficulty_for(tx)?;
    let mut buf = seed(tx);
    let mut nonces = [0u32; NONCE_COUNT];
    let mut nonce: u32 = 0;
    let mut tried: u32 = 0;

    debug!(
        size = tx.len(),
        target = difficulty.target(),
        non_zero_bytes = difficulty.non_zero_bytes(),
        "searching nonces"
    );

    for slot in nonces.iter_mut() {
        loop {
            if difficulty.is_satisfied(&candidate(&mut buf, nonce)) {
                *slot = nonce;
                break;
            }
            tried = tried.wrapping_add(1);
            if tried % DEADLINE_CHECK_INTERVAL == 0 && Instant::now() >= deadline {
                return Err(ClientError::Timeout(format!("proof-of-work stopped at nonce {}", nonce)));
            }
            nonce = nonce.checked_add(1).ok_or(ClientError::PowExhausted)?;
        }
        nonce = nonce.checked_add(1).ok_or(ClientError::PowExhausted)?;
    }

    debug!(?nonces, "nonces found");
    Ok(nonces)
}

/// Check previously found nonces
pub fn verify(tx: &[u8], nonces: &[u32; NONCE_COUNT]) -> Result<bool> {
    let difficulty = difficulty_for(tx)?;
    let mut buf = seed(tx);
    Ok(nonces.iter().all(|&n| difficulty.is_satisfied(&candidate(&mut buf, n))))
}

/// Append nonces in little-endian order
pub fn append_nonces(tx: &mut Vec<u8>, nonces: &[u32; NONCE_COUNT]) {
    tx.reserve(NONCES_SIZE);
    for nonce in nonces {
        tx.extend_from_slice(&nonce.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const RVM: &str = "6c000068e5cf8b01090000001d000b0004bf180000800900e803000003027000520000000700050068656c6c6f";

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(600)
    }

    #[test]
    fn test_denominator() {
        assert_eq!(denominator_for(45, 30), 7933);
        assert_eq!(denominator_for(67, 120), 34566);
    }

    #[test]
    fn test_ttl_from_tx() {
        let tx = hex::decode(RVM).unwrap();
        assert_eq!(ttl_from_tx(&tx).unwrap(), 30);
        assert!(ttl_from_tx(&tx[..13]).is_err());
    }

    #[test]
    fn test_difficulty_bounds() {
        let easiest = PowDifficulty::new(1);
        assert_eq!(easiest, PowDifficulty::new(MIN_DENOMINATOR));
        assert_eq!(easiest.non_zero_bytes(), 32);

        let hardest = PowDifficulty::new(u64::MAX);
        assert_eq!(hardest.non_zero_bytes(), 25);
        assert!(hardest.target() > 0);
    }

    #[test]
    fn test_difficulty_monotonic() {
        let a = PowDifficulty::new(7933);
        let b = PowDifficulty::new(34566);
        assert!(a.non_zero_bytes() >= b.non_zero_bytes());
        assert!(a.non_zero_bytes() > b.non_zero_bytes() || a.target() >= b.target());
    }

    #[test]
    fn test_is_satisfied() {
        let difficulty = PowDifficulty::new(7933);
        let nz = difficulty.non_zero_bytes();
        let mut hash = [0u8; 32];
        assert!(difficulty.is_satisfied(&hash));
        hash[nz - 4..nz].copy_from_slice(&difficulty.target().to_le_bytes());
        assert!(!difficulty.is_satisfied(&hash));
        hash[nz - 4..nz].copy_from_slice(&(difficulty.target() - 1).to_le_bytes());
        assert!(difficulty.is_satisfied(&hash));
        if nz < 32 {
            hash[31] = 1;
            assert!(!difficulty.is_satisfied(&hash));
        }
    }

    #[test]
    fn test_solve_vector() {
        let tx = hex::decode(RVM).unwrap();
        let nonces = solve(&tx, far_deadline()).unwrap();
        assert_eq!(nonces, [5325, 11027, 16451]);
        assert!(verify(&tx, &nonces).unwrap());
        assert!(!verify(&tx, &[5326, 11027, 16451]).unwrap());
    }

    #[test]
    fn test_solve_past_deadline() {
        let tx = hex::decode(RVM).unwrap();
        let err = solve(&tx, Instant::now()).unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err.code(), -10000);
    }

    #[test]
    fn test_append_nonces() {
        let mut tx = vec![0xaa];
        append_nonces(&mut tx, &[1, 0x0203, u32::MAX]);
        assert_eq!(hex::encode(tx), "aa0100000003020000ffffffff");
    }
}
