//! FanTicket Parking - Custodial bridge ledger
//!
//! Tokens headed to another chain are parked: the depositor signs an
//! ordinary transfer authorization into the parking ledger's custody
//! address, and the ledger records how much each (token, depositor) has
//! parked. Release back to a depositor needs a withdrawal permit signed by a
//! network admin, standing for an observation made on the other chain.
//!
//! The admin countersignature is trusted as is; the originating lock event
//! is not re-verified here.

use fanticket_crypto::{authorize, Domain, FieldEncoder, NonceBook, Signature, SignedPayload, TypedData};
use fanticket_ledger::{TokenArena, TransferAuthorization};
use fanticket_registry::RoleRegistry;
use fanticket_types::{
    Address, Amount, CallContext, ChainId, LedgerError, LedgerEvent, Result, Role, U256,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Name of the parking ledger's signing domain
pub const PARKING_DOMAIN: &str = "FanTicketParking";

/// Admin permit releasing `value` of `token` to `who`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawAuthorization {
    pub token: Address,
    pub who: Address,
    pub value: Amount,
    pub nonce: U256,
    pub deadline: U256,
}

impl TypedData for WithdrawAuthorization {
    const TYPE: &'static str =
        "Withdraw(address token,address who,uint256 value,uint256 nonce,uint256 deadline)";

    fn encode_fields(&self, enc: &mut FieldEncoder) {
        enc.address(&self.token)
            .address(&self.who)
            .uint256(&self.value)
            .uint256(&self.nonce)
            .uint256(&self.deadline);
    }
}

impl SignedPayload for WithdrawAuthorization {
    fn deadline(&self) -> Option<U256> {
        Some(self.deadline)
    }

    fn nonce(&self) -> Option<U256> {
        Some(self.nonce)
    }
}

#[derive(Debug, Clone)]
pub struct ParkingLedger {
    address: Address,
    registry: Address,
    deposits: BTreeMap<(Address, Address), Amount>,
    withdraw_nonces: NonceBook<(Address, Address)>,
}

impl ParkingLedger {
    pub fn deploy(address: Address, registry: Address) -> Self {
        info!(parking = %address, %registry, "Parking ledger deployed");
        Self {
            address,
            registry,
            deposits: BTreeMap::new(),
            withdraw_nonces: NonceBook::new(),
        }
    }

    /// Also the custody account holding every parked token
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn registry(&self) -> Address {
        self.registry
    }

    pub fn domain(&self, chain_id: ChainId) -> Domain {
        Domain::new(PARKING_DOMAIN, chain_id, self.address)
    }

    pub fn parked_balance(&self, token: &Address, who: &Address) -> Amount {
        self.deposits
            .get(&(*token, *who))
            .copied()
            .unwrap_or_default()
    }

    /// Next withdrawal nonce for (token, who)
    pub fn withdraw_nonce(&self, token: &Address, who: &Address) -> U256 {
        self.withdraw_nonces.current(&(*token, *who))
    }

    /// Park funds under a transfer authorization into custody
    pub fn deposit(
        &mut self,
        ctx: &mut CallContext,
        tokens: &mut TokenArena,
        token: Address,
        payload: &TransferAuthorization,
        signature: &Signature,
    ) -> Result<()> {
        if payload.to != self.address {
            return Err(LedgerError::invalid_input(
                "to",
                format!("deposits must transfer into custody {}", self.address),
            ));
        }
        let key = (token, payload.from);
        let parked = self
            .parked_balance(&token, &payload.from)
            .checked_add(payload.value)
            .ok_or_else(|| LedgerError::overflow("parked balance"))?;

        let ledger = tokens.get_mut(&token)?;
        ctx.call_as(self.address, |c| ledger.transfer_from_by_sig(c, payload, signature))?;

        self.deposits.insert(key, parked);
        debug!(parking = %self.address, %token, who = %payload.from, value = %payload.value, "Parked");
        ctx.emit(LedgerEvent::Parked {
            parking: self.address,
            token,
            who: payload.from,
            value: payload.value,
        });
        Ok(())
    }

    /// Release parked funds on a network admin's countersignature
    pub fn withdraw(
        &mut self,
        ctx: &mut CallContext,
        registry: &RoleRegistry,
        tokens: &mut TokenArena,
        payload: &WithdrawAuthorization,
        signature: &Signature,
    ) -> Result<()> {
        if registry.address() != self.registry {
            return Err(LedgerError::invalid_input(
                "registry",
                format!("parking {} is governed by {}", self.address, self.registry),
            ));
        }
        let key = (payload.token, payload.who);
        let stored = self.withdraw_nonces.current(&key);
        authorize(
            &self.domain(ctx.chain_id()),
            payload,
            signature,
            &registry.gate(Role::network_admin()),
            ctx.timestamp(),
            stored,
        )?;

        let available = self.parked_balance(&payload.token, &payload.who);
        if available < payload.value {
            return Err(LedgerError::InsufficientParkedBalance {
                token: payload.token,
                account: payload.who,
                required: payload.value,
                available,
            });
        }

        let ledger = tokens.get_mut(&payload.token)?;
        ctx.call_as(self.address, |c| ledger.transfer(c, payload.who, payload.value))?;

        self.deposits.insert(key, available - payload.value);
        self.withdraw_nonces.advance(&key)?;
        info!(
            parking = %self.address,
            token = %payload.token,
            who = %payload.who,
            value = %payload.value,
            "Released"
        );
        ctx.emit(LedgerEvent::Released {
            parking: self.address,
            token: payload.token,
            who: payload.who,
            value: payload.value,
            nonce: payload.nonce,
        });
        Ok(())
    }
}

/// Every deployed parking ledger, keyed by address
#[derive(Debug, Clone, Default)]
pub struct Parkings {
    parkings: BTreeMap<Address, ParkingLedger>,
}

impl Parkings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, parking: ParkingLedger) -> Result<()> {
        let address = parking.address();
        if self.parkings.contains_key(&address) {
            return Err(LedgerError::AddressOccupied { address });
        }
        self.parkings.insert(address, parking);
        Ok(())
    }

    pub fn get(&self, address: &Address) -> Result<&ParkingLedger> {
        self.parkings
            .get(address)
            .ok_or_else(|| LedgerError::unknown_contract("parking ledger", *address))
    }

    pub fn get_mut(&mut self, address: &Address) -> Result<&mut ParkingLedger> {
        self.parkings
            .get_mut(address)
            .ok_or_else(|| LedgerError::unknown_contract("parking ledger", *address))
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.parkings.contains_key(address)
    }
}
