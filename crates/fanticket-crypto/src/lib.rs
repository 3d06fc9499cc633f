//! FanTicket Crypto - The signature authorization protocol
//!
//! This crate provides:
//! - Keccak-256 hashing
//! - Typed structured-data hashing bound to a signing domain
//! - Recoverable secp256k1 signatures and `Wallet` signing identities
//! - The authorization procedure every signed operation runs through
//! - Per-key `NonceBook`s
//!
//! # Security Invariant
//!
//! **A signature authorizes exactly one payload, in exactly one domain, once.**
//! The domain separator binds it to one verifying instance on one chain, the
//! nonce binds it to one position in the signer's sequence.

pub mod hash;
pub mod typed_data;
pub mod signature;
pub mod keys;
pub mod authorize;

pub use hash::*;
pub use typed_data::*;
pub use signature::*;
pub use keys::*;
pub use authorize::*;

use thiserror::Error;

/// Cryptographic errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Malformed signature: {0}")]
    MalformedSignature(String),

    #[error("Signature s value is not in the lower half order")]
    MalleableSignature,

    #[error("Public key recovery failed: {0}")]
    RecoveryFailed(String),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
