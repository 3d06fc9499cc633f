//! Transaction order wire format

use fanticket_crypto::Signature;
use fanticket_ledger::{MintAuthorization, TransferAuthorization};
use fanticket_types::{Address, Amount, U256};
use serde::{Deserialize, Serialize};

/// Wire tag: 0 = transfer, 1 = mint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    Transfer,
    Mint,
}

impl OrderKind {
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Transfer => 0,
            Self::Mint => 1,
        }
    }

    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Transfer),
            1 => Some(Self::Mint),
            _ => None,
        }
    }
}

/// One signed order in a clearing batch.
///
/// For transfers `from` is the payer and signer; for mints it is the
/// minter and signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOrder {
    pub token: Address,
    pub from: Address,
    pub to: Address,
    pub value: Amount,
    pub kind: OrderKind,
    pub nonce: U256,
    pub deadline: U256,
    pub signature: Signature,
}

impl TransactionOrder {
    pub fn transfer(token: Address, auth: TransferAuthorization, signature: Signature) -> Self {
        Self {
            token,
            from: auth.from,
            to: auth.to,
            value: auth.value,
            kind: OrderKind::Transfer,
            nonce: auth.nonce,
            deadline: auth.deadline,
            signature,
        }
    }

    pub fn mint(token: Address, auth: MintAuthorization, signature: Signature) -> Self {
        Self {
            token,
            from: auth.minter,
            to: auth.to,
            value: auth.value,
            kind: OrderKind::Mint,
            nonce: auth.nonce,
            deadline: auth.deadline,
            signature,
        }
    }

    /// The payload a transfer order's signature covers
    pub fn transfer_authorization(&self) -> TransferAuthorization {
        TransferAuthorization {
            from: self.from,
            to: self.to,
            value: self.value,
            nonce: self.nonce,
            deadline: self.deadline,
        }
    }

    /// The payload a mint order's signature covers
    pub fn mint_authorization(&self) -> MintAuthorization {
        MintAuthorization {
            minter: self.from,
            to: self.to,
            value: self.value,
            nonce: self.nonce,
            deadline: self.deadline,
        }
    }
}
