//! Typed structured-data hashing
//!
//! A payload is hashed as `keccak256(typeHash ‖ field words...)` and signed
//! under `keccak256(0x19 0x01 ‖ domainSeparator ‖ structHash)`. The domain
//! separator binds the signature to one verifying instance on one chain.

use crate::hash::{keccak256, keccak256_all};
use fanticket_types::{Address, ChainId, U256, PROTOCOL_VERSION};
use serde::{Deserialize, Serialize};

const DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

/// Signing domain of one verifying instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    pub version: String,
    pub chain_id: ChainId,
    pub verifying_contract: Address,
}

impl Domain {
    /// Domain at the current protocol version
    pub fn new(name: impl Into<String>, chain_id: ChainId, verifying_contract: Address) -> Self {
        Self {
            name: name.into(),
            version: PROTOCOL_VERSION.to_string(),
            chain_id,
            verifying_contract,
        }
    }

    pub fn separator(&self) -> [u8; 32] {
        let mut enc = FieldEncoder::new(keccak256(DOMAIN_TYPE.as_bytes()));
        enc.string(&self.name)
            .string(&self.version)
            .uint256(&U256::from(self.chain_id.0))
            .address(&self.verifying_contract);
        enc.finish()
    }
}

/// Encodes payload fields as 32-byte words in declaration order
#[derive(Debug, Clone)]
pub struct FieldEncoder {
    buf: Vec<u8>,
}

impl FieldEncoder {
    pub fn new(type_hash: [u8; 32]) -> Self {
        let mut buf = Vec::with_capacity(32 * 6);
        buf.extend_from_slice(&type_hash);
        Self { buf }
    }

    pub fn address(&mut self, value: &Address) -> &mut Self {
        self.buf.extend_from_slice(&value.to_word());
        self
    }

    pub fn uint256(&mut self, value: &U256) -> &mut Self {
        self.buf.extend_from_slice(&fanticket_types::to_word(value));
        self
    }

    pub fn uint32(&mut self, value: u32) -> &mut Self {
        self.uint256(&U256::from(value))
    }

    /// Dynamic strings are encoded as their hash
    pub fn string(&mut self, value: &str) -> &mut Self {
        self.buf.extend_from_slice(&keccak256(value.as_bytes()));
        self
    }

    pub fn finish(self) -> [u8; 32] {
        keccak256(&self.buf)
    }
}

/// A payload with a fixed type string and field layout
pub trait TypedData {
    /// Canonical type string, e.g. `Transfer(address from,...)`
    const TYPE: &'static str;

    fn encode_fields(&self, enc: &mut FieldEncoder);

    fn type_hash() -> [u8; 32] {
        keccak256(Self::TYPE.as_bytes())
    }

    fn struct_hash(&self) -> [u8; 32] {
        let mut enc = FieldEncoder::new(Self::type_hash());
        self.encode_fields(&mut enc);
        enc.finish()
    }
}

/// The 32-byte digest a signer signs for `payload` in `domain`
pub fn signing_digest<T: TypedData>(domain: &Domain, payload: &T) -> [u8; 32] {
    keccak256_all(&[&[0x19u8, 0x01], &domain.separator(), &payload.struct_hash()])
}
