//! Observable ledger events

use crate::{Address, Amount, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Balance movement; mints use the zero address as `from`
    Transfer {
        token: Address,
        from: Address,
        to: Address,
        value: Amount,
    },
    Approval {
        token: Address,
        owner: Address,
        spender: Address,
        value: Amount,
    },
    RoleGranted {
        registry: Address,
        role: Role,
        account: Address,
        sender: Address,
    },
    RoleRevoked {
        registry: Address,
        role: Role,
        account: Address,
        sender: Address,
    },
    TokenCreated {
        factory: Address,
        token_id: u32,
        name: String,
        symbol: String,
        token: Address,
    },
    Parked {
        parking: Address,
        token: Address,
        who: Address,
        value: Amount,
    },
    Released {
        parking: Address,
        token: Address,
        who: Address,
        value: Amount,
        nonce: Amount,
    },
    OrdersCleared {
        house: Address,
        batch_id: Uuid,
        orders: usize,
    },
}

impl LedgerEvent {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Transfer { .. } => "Transfer",
            Self::Approval { .. } => "Approval",
            Self::RoleGranted { .. } => "RoleGranted",
            Self::RoleRevoked { .. } => "RoleRevoked",
            Self::TokenCreated { .. } => "TokenCreated",
            Self::Parked { .. } => "Parked",
            Self::Released { .. } => "Released",
            Self::OrdersCleared { .. } => "OrdersCleared",
        }
    }
}
