//! Deterministic instance addresses

use fanticket_crypto::{keccak256, keccak256_all};
use fanticket_types::Address;

/// Salt for a (name, symbol) pair: `keccak256(keccak256(name) ‖ keccak256(symbol))`
pub fn token_salt(name: &str, symbol: &str) -> [u8; 32] {
    keccak256_all(&[&keccak256(name.as_bytes()), &keccak256(symbol.as_bytes())])
}

/// `keccak256(0xff ‖ deployer ‖ salt ‖ code_hash)[12..]`
pub fn create2_address(deployer: &Address, salt: &[u8; 32], code_hash: &[u8; 32]) -> Address {
    let hash = keccak256_all(&[&[0xffu8], deployer.as_bytes(), salt, code_hash]);
    Address::from_word(&hash)
}

/// Address of the `deploy_count`-th plain deployment by `deployer`
pub fn create_address(deployer: &Address, deploy_count: u64) -> Address {
    let hash = keccak256_all(&[deployer.as_bytes(), &deploy_count.to_be_bytes()]);
    Address::from_word(&hash)
}
