//! Signing identities for FanTicket

use crate::{
    signature::address_of, typed_data::signing_digest, CryptoError, CryptoResult, Domain,
    Signature, TypedData,
};
use fanticket_types::Address;
use k256::ecdsa::{RecoveryId, SigningKey};
use rand::rngs::OsRng;
use std::fmt;

/// A secp256k1 key with its derived address
#[derive(Clone)]
pub struct Wallet {
    signing_key: SigningKey,
    address: Address,
}

impl Wallet {
    /// Generate a new random wallet
    pub fn generate() -> CryptoResult<Self> {
        let signing_key = SigningKey::random(&mut OsRng);
        Ok(Self::from_key(signing_key))
    }

    /// Create from 32 bytes of secret key material
    pub fn from_seed(seed: &[u8; 32]) -> CryptoResult<Self> {
        let signing_key = SigningKey::from_bytes(seed.into())
            .map_err(|e| CryptoError::KeyGenerationFailed(e.to_string()))?;
        Ok(Self::from_key(signing_key))
    }

    /// Deterministic wallet for a name (test fixtures, local fixtures)
    pub fn for_name(name: &str) -> CryptoResult<Self> {
        let seed = blake3::derive_key("fanticket wallet secp256k1 key v1", name.as_bytes());
        Self::from_seed(&seed)
    }

    fn from_key(signing_key: SigningKey) -> Self {
        let address = address_of(signing_key.verifying_key());
        Self {
            signing_key,
            address,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a 32-byte digest, producing a low-s signature
    pub fn sign_digest(&self, digest: &[u8; 32]) -> CryptoResult<Signature> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

        let (signature, recovery_id) = match signature.normalize_s() {
            Some(normalized) => (
                normalized,
                RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
            ),
            None => (signature, recovery_id),
        };

        let bytes = signature.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Ok(Signature {
            r,
            s,
            v: 27 + recovery_id.to_byte(),
        })
    }

    /// Sign `payload` under `domain`
    pub fn sign_typed<T: TypedData>(&self, domain: &Domain, payload: &T) -> CryptoResult<Signature> {
        self.sign_digest(&signing_digest(domain, payload))
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
