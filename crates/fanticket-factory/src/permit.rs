//! Creation permits
//!
//! Signed by a network admin under the factory's domain. They carry no
//! nonce or deadline: symbol uniqueness makes each permit single-use.

use fanticket_crypto::{FieldEncoder, SignedPayload, TypedData};
use fanticket_types::{Address, Amount, U256};
use serde::{Deserialize, Serialize};

/// Permit to create a locally issued token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationPermit {
    pub name: String,
    pub symbol: String,
    /// Fixed minter; receives the initial supply
    pub owner: Address,
    pub initial_supply: Amount,
    pub token_id: u32,
}

impl TypedData for CreationPermit {
    const TYPE: &'static str =
        "CreationPermit(string name,string symbol,address owner,uint256 initialSupply,uint32 tokenId)";

    fn encode_fields(&self, enc: &mut FieldEncoder) {
        enc.string(&self.name)
            .string(&self.symbol)
            .address(&self.owner)
            .uint256(&self.initial_supply)
            .uint32(self.token_id);
    }
}

impl SignedPayload for CreationPermit {}

/// Permit to create the bridged counterpart of a token on another chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterChainCreationPermit {
    pub origin_address: Address,
    pub name: String,
    pub symbol: String,
    pub token_id: u32,
    pub origin_chain_id: U256,
}

impl TypedData for InterChainCreationPermit {
    const TYPE: &'static str =
        "CreationPermit(address originAddress,string name,string symbol,uint32 tokenId,uint256 originChainId)";

    fn encode_fields(&self, enc: &mut FieldEncoder) {
        enc.address(&self.origin_address)
            .string(&self.name)
            .string(&self.symbol)
            .uint32(self.token_id)
            .uint256(&self.origin_chain_id);
    }
}

impl SignedPayload for InterChainCreationPermit {}
