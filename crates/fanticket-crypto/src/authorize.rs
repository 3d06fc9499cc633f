//! The authorization procedure for signed operations
//!
//! Every signature-authorized operation runs the same steps in the same order:
//!
//! 1. Rebuild the typed payload and its digest under the verifying domain
//! 2. Recover the signer from the signature
//! 3. Compare it against the expected signer (`InvalidSignature`)
//! 4. Check `deadline >= now` (`Expired`)
//! 5. Check the payload nonce equals the stored nonce (`InvalidNonce`)
//!
//! The caller applies the effect and only then advances the nonce, so a
//! failed effect leaves the nonce unconsumed.

use crate::{signing_digest, Domain, Signature, TypedData};
use fanticket_types::{Address, LedgerError, Result, U256};
use std::collections::BTreeMap;
use tracing::warn;

/// Who may sign a given payload
pub trait SignerPolicy {
    fn admits(&self, signer: &Address) -> bool;

    /// Human-readable description for error reports
    fn describe(&self) -> String;
}

impl SignerPolicy for Address {
    fn admits(&self, signer: &Address) -> bool {
        self == signer
    }

    fn describe(&self) -> String {
        format!("expected signer {}", self)
    }
}

/// A typed payload that may carry a deadline and a nonce
pub trait SignedPayload: TypedData {
    fn deadline(&self) -> Option<U256> {
        None
    }

    fn nonce(&self) -> Option<U256> {
        None
    }
}

/// Run the authorization steps and return the recovered signer.
///
/// `stored_nonce` is only consulted when the payload carries a nonce.
pub fn authorize<P: SignedPayload>(
    domain: &Domain,
    payload: &P,
    signature: &Signature,
    expected: &dyn SignerPolicy,
    now: u64,
    stored_nonce: U256,
) -> Result<Address> {
    let digest = signing_digest(domain, payload);

    let signer = match signature.recover(&digest) {
        Ok(signer) => signer,
        Err(e) => {
            warn!(domain = %domain.name, error = %e, "Unrecoverable signature");
            return Err(LedgerError::invalid_signature(None, expected.describe()));
        }
    };

    if !expected.admits(&signer) {
        warn!(domain = %domain.name, %signer, "Signer rejected");
        return Err(LedgerError::invalid_signature(Some(signer), expected.describe()));
    }

    if let Some(deadline) = payload.deadline() {
        if deadline < U256::from(now) {
            return Err(LedgerError::Expired { deadline, now });
        }
    }

    if let Some(nonce) = payload.nonce() {
        if nonce != stored_nonce {
            return Err(LedgerError::InvalidNonce {
                signer,
                expected: stored_nonce,
                supplied: nonce,
            });
        }
    }

    Ok(signer)
}

/// Exact-sequence nonces keyed by signer (or by any other key)
#[derive(Debug, Clone)]
pub struct NonceBook<K: Ord> {
    nonces: BTreeMap<K, U256>,
}

impl<K: Ord> Default for NonceBook<K> {
    fn default() -> Self {
        Self {
            nonces: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone> NonceBook<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next nonce the key must sign with
    pub fn current(&self, key: &K) -> U256 {
        self.nonces.get(key).copied().unwrap_or_default()
    }

    /// Consume the current nonce, returning the new one
    pub fn advance(&mut self, key: &K) -> Result<U256> {
        let next = self
            .current(key)
            .checked_add(U256::one())
            .ok_or_else(|| LedgerError::overflow("nonce"))?;
        self.nonces.insert(key.clone(), next);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldEncoder, Wallet};
    use fanticket_types::ChainId;
    use proptest::prelude::*;

    struct Note {
        owner: Address,
        nonce: U256,
        deadline: U256,
    }

    impl TypedData for Note {
        const TYPE: &'static str = "Note(address owner,uint256 nonce,uint256 deadline)";

        fn encode_fields(&self, enc: &mut FieldEncoder) {
            enc.address(&self.owner)
                .uint256(&self.nonce)
                .uint256(&self.deadline);
        }
    }

    impl SignedPayload for Note {
        fn deadline(&self) -> Option<U256> {
            Some(self.deadline)
        }

        fn nonce(&self) -> Option<U256> {
            Some(self.nonce)
        }
    }

    fn domain() -> Domain {
        Domain::new("Notes", ChainId::LOCAL, Address::new([9u8; 20]))
    }

    fn signed(wallet: &Wallet, nonce: u64, deadline: u64) -> (Note, Signature) {
        let note = Note {
            owner: wallet.address(),
            nonce: U256::from(nonce),
            deadline: U256::from(deadline),
        };
        let sig = wallet.sign_typed(&domain(), &note).unwrap();
        (note, sig)
    }

    #[test]
    fn test_authorize_ok() {
        let alice = Wallet::for_name("alice").unwrap();
        let (note, sig) = signed(&alice, 0, 100);
        let signer = authorize(&domain(), &note, &sig, &alice.address(), 50, U256::zero()).unwrap();
        assert_eq!(signer, alice.address());
    }

    #[test]
    fn test_wrong_signer() {
        let alice = Wallet::for_name("alice").unwrap();
        let mallory = Wallet::for_name("mallory").unwrap();
        let (note, sig) = signed(&mallory, 0, 100);
        let err = authorize(&domain(), &note, &sig, &alice.address(), 50, U256::zero()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_SIGNATURE");
    }

    #[test]
    fn test_deadline_is_inclusive() {
        let alice = Wallet::for_name("alice").unwrap();
        let (note, sig) = signed(&alice, 0, 100);
        assert!(authorize(&domain(), &note, &sig, &alice.address(), 100, U256::zero()).is_ok());
        let err = authorize(&domain(), &note, &sig, &alice.address(), 101, U256::zero()).unwrap_err();
        assert_eq!(err.error_code(), "EXPIRED");
    }

    #[test]
    fn test_signature_checked_before_deadline() {
        let alice = Wallet::for_name("alice").unwrap();
        let bob = Wallet::for_name("bob").unwrap();
        let (note, sig) = signed(&bob, 0, 1);
        let err = authorize(&domain(), &note, &sig, &alice.address(), 500, U256::zero()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_SIGNATURE");
    }

    #[test]
    fn test_nonce_mismatch() {
        let alice = Wallet::for_name("alice").unwrap();
        let (note, sig) = signed(&alice, 0, 100);
        let err = authorize(&domain(), &note, &sig, &alice.address(), 1, U256::one()).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidNonce { .. }));
    }

    #[test]
    fn test_other_domain_rejected() {
        let alice = Wallet::for_name("alice").unwrap();
        let (note, sig) = signed(&alice, 0, 100);
        let other = Domain::new("Notes", ChainId(1), Address::new([9u8; 20]));
        let err = authorize(&other, &note, &sig, &alice.address(), 1, U256::zero()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_SIGNATURE");
    }

    proptest! {
        #[test]
        fn prop_nonces_strictly_increase(steps in 1usize..50) {
            let mut book: NonceBook<Address> = NonceBook::new();
            let key = Address::new([1u8; 20]);
            let mut last = book.current(&key);
            for _ in 0..steps {
                let next = book.advance(&key).unwrap();
                prop_assert_eq!(next, last + U256::one());
                last = next;
            }
            prop_assert_eq!(book.current(&key), U256::from(steps));
            prop_assert_eq!(book.current(&Address::ZERO), U256::zero());
        }
    }
}
