//! Hashing utilities for FanTicket

use sha3::{Digest, Keccak256};

/// Compute keccak-256 of data
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Compute keccak-256 of the concatenation of items
pub fn keccak256_all(items: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for item in items {
        hasher.update(item);
    }
    hasher.finalize().into()
}

/// Compute keccak-256 and return as 0x-prefixed hex
pub fn keccak256_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(keccak256(data)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_empty() {
        assert_eq!(
            keccak256_hex(b""),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_hash_all_matches_concat() {
        let joined = keccak256(b"helloworld");
        assert_eq!(keccak256_all(&[b"hello", b"world"]), joined);
    }
}
