//! Signed payloads verified by a token instance
//!
//! All three are signed under the token's own domain (its name, version "1",
//! the chain id and the token address) and consume the signer's nonce on
//! that token.

use fanticket_crypto::{FieldEncoder, SignedPayload, TypedData};
use fanticket_types::{Address, Amount, U256};
use serde::{Deserialize, Serialize};

/// Direct transfer out of `from`, signed by `from`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferAuthorization {
    pub from: Address,
    pub to: Address,
    pub value: Amount,
    pub nonce: U256,
    pub deadline: U256,
}

impl TypedData for TransferAuthorization {
    const TYPE: &'static str =
        "Transfer(address from,address to,uint256 value,uint256 nonce,uint256 deadline)";

    fn encode_fields(&self, enc: &mut FieldEncoder) {
        enc.address(&self.from)
            .address(&self.to)
            .uint256(&self.value)
            .uint256(&self.nonce)
            .uint256(&self.deadline);
    }
}

impl SignedPayload for TransferAuthorization {
    fn deadline(&self) -> Option<U256> {
        Some(self.deadline)
    }

    fn nonce(&self) -> Option<U256> {
        Some(self.nonce)
    }
}

/// Mint to `to`, signed by `minter`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintAuthorization {
    pub minter: Address,
    pub to: Address,
    pub value: Amount,
    pub nonce: U256,
    pub deadline: U256,
}

impl TypedData for MintAuthorization {
    const TYPE: &'static str =
        "Mint(address minter,address to,uint256 value,uint256 nonce,uint256 deadline)";

    fn encode_fields(&self, enc: &mut FieldEncoder) {
        enc.address(&self.minter)
            .address(&self.to)
            .uint256(&self.value)
            .uint256(&self.nonce)
            .uint256(&self.deadline);
    }
}

impl SignedPayload for MintAuthorization {
    fn deadline(&self) -> Option<U256> {
        Some(self.deadline)
    }

    fn nonce(&self) -> Option<U256> {
        Some(self.nonce)
    }
}

/// Gasless allowance grant, signed by `owner`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitAuthorization {
    pub owner: Address,
    pub spender: Address,
    pub value: Amount,
    pub nonce: U256,
    pub deadline: U256,
}

impl TypedData for PermitAuthorization {
    const TYPE: &'static str =
        "Permit(address owner,address spender,uint256 value,uint256 nonce,uint256 deadline)";

    fn encode_fields(&self, enc: &mut FieldEncoder) {
        enc.address(&self.owner)
            .address(&self.spender)
            .uint256(&self.value)
            .uint256(&self.nonce)
            .uint256(&self.deadline);
    }
}

impl SignedPayload for PermitAuthorization {
    fn deadline(&self) -> Option<U256> {
        Some(self.deadline)
    }

    fn nonce(&self) -> Option<U256> {
        Some(self.nonce)
    }
}
