//! A single token instance
//!
//! # Invariants
//!
//! 1. No negative balances: a short balance is an error
//! 2. `total_supply` equals the sum of all balances
//! 3. The initializer runs once, and only for the deploying factory
//! 4. A signer's nonce advances only after the authorized effect applied

use crate::payload::{MintAuthorization, PermitAuthorization, TransferAuthorization};
use fanticket_crypto::{authorize, Domain, NonceBook, Signature, SignerPolicy};
use fanticket_registry::{RoleGate, RoleRegistry};
use fanticket_types::{
    Address, Amount, CallContext, ChainId, LedgerError, LedgerEvent, Result, Role, U256,
    TOKEN_DECIMALS,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Which flavour of token an instance is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum TokenVariant {
    /// Issued locally; a single fixed minter may mint directly
    Standard,
    /// Bridged representation of a token living on another chain; minting
    /// only through network-admin signed authorizations
    InterChain {
        origin_chain_id: U256,
        origin_address: Address,
    },
}

impl TokenVariant {
    pub fn is_inter_chain(&self) -> bool {
        matches!(self, Self::InterChain { .. })
    }
}

/// Parameters applied by the one-time initializer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInit {
    pub name: String,
    pub symbol: String,
    pub token_id: u32,
    /// Fixed minter of a standard token; receives the initial supply
    pub owner: Address,
    pub initial_supply: Amount,
    pub variant: TokenVariant,
}

/// Read-only description of an initialized token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub token_id: u32,
    pub variant: TokenVariant,
    pub total_supply: Amount,
}

#[derive(Debug, Clone)]
pub struct TokenLedger {
    address: Address,
    factory: Address,
    registry: Address,
    initialized: bool,
    name: String,
    symbol: String,
    token_id: u32,
    minter: Address,
    variant: TokenVariant,
    total_supply: Amount,
    balances: BTreeMap<Address, Amount>,
    allowances: BTreeMap<(Address, Address), Amount>,
    nonces: NonceBook<Address>,
}

/// Who may sign a mint authorization
enum MintAuthority<'a> {
    Minter(Address),
    NetworkAdmin(RoleGate<'a>),
}

/// The payload's named minter, and only if the token's authority admits it
struct MintSigner<'a> {
    named: Address,
    authority: MintAuthority<'a>,
}

impl SignerPolicy for MintSigner<'_> {
    fn admits(&self, signer: &Address) -> bool {
        if *signer != self.named {
            return false;
        }
        match &self.authority {
            MintAuthority::Minter(minter) => minter == signer,
            MintAuthority::NetworkAdmin(gate) => gate.admits(signer),
        }
    }

    fn describe(&self) -> String {
        match &self.authority {
            MintAuthority::Minter(minter) => format!("minter {}", minter),
            MintAuthority::NetworkAdmin(gate) => {
                format!("{} named as minter {}", gate.describe(), self.named)
            }
        }
    }
}

impl TokenLedger {
    /// A fresh, uninitialized instance deployed by `factory`
    pub fn deploy(address: Address, factory: Address, registry: Address) -> Self {
        Self {
            address,
            factory,
            registry,
            initialized: false,
            name: String::new(),
            symbol: String::new(),
            token_id: 0,
            minter: Address::ZERO,
            variant: TokenVariant::Standard,
            total_supply: Amount::zero(),
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
            nonces: NonceBook::new(),
        }
    }

    /// One-time initializer, callable only by the deploying factory
    pub fn init(&mut self, ctx: &mut CallContext, init: TokenInit) -> Result<()> {
        if self.initialized {
            return Err(LedgerError::AlreadyInitialized {
                token: self.address,
            });
        }
        if ctx.caller() != self.factory {
            return Err(LedgerError::unauthorized(
                ctx.caller(),
                format!("only factory {} may initialize", self.factory),
            ));
        }

        self.initialized = true;
        self.name = init.name;
        self.symbol = init.symbol;
        self.token_id = init.token_id;
        self.variant = init.variant;
        self.minter = match self.variant {
            TokenVariant::Standard => init.owner,
            TokenVariant::InterChain { .. } => Address::ZERO,
        };

        if !init.initial_supply.is_zero() {
            self.credit(ctx, init.owner, init.initial_supply)?;
        }
        debug!(token = %self.address, symbol = %self.symbol, "Token initialized");
        Ok(())
    }

    // ========================================================================
    // Views
    // ========================================================================

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn factory(&self) -> Address {
        self.factory
    }

    pub fn registry(&self) -> Address {
        self.registry
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        TOKEN_DECIMALS
    }

    pub fn token_id(&self) -> u32 {
        self.token_id
    }

    /// Fixed minter of a standard token, zero for bridged tokens
    pub fn minter(&self) -> Address {
        self.minter
    }

    pub fn variant(&self) -> &TokenVariant {
        &self.variant
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    /// Next nonce `account` must sign with on this token
    pub fn nonce(&self, account: &Address) -> U256 {
        self.nonces.current(account)
    }

    /// Signing domain of this instance
    pub fn domain(&self, chain_id: ChainId) -> Domain {
        Domain::new(self.name.clone(), chain_id, self.address)
    }

    pub fn metadata(&self) -> TokenMetadata {
        TokenMetadata {
            address: self.address,
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            decimals: TOKEN_DECIMALS,
            token_id: self.token_id,
            variant: self.variant.clone(),
            total_supply: self.total_supply,
        }
    }

    // ========================================================================
    // Direct operations
    // ========================================================================

    /// Mint by the fixed minter; always rejected on bridged tokens
    pub fn mint(&mut self, ctx: &mut CallContext, to: Address, value: Amount) -> Result<()> {
        if self.variant.is_inter_chain() {
            return Err(LedgerError::MintDisabled {
                token: self.address,
            });
        }
        if !self.initialized || ctx.caller() != self.minter {
            return Err(LedgerError::unauthorized(ctx.caller(), "caller is not the minter"));
        }
        self.credit(ctx, to, value)
    }

    pub fn transfer(&mut self, ctx: &mut CallContext, to: Address, value: Amount) -> Result<()> {
        let from = ctx.caller();
        self.move_balance(ctx, from, to, value)
    }

    pub fn approve(&mut self, ctx: &mut CallContext, spender: Address, value: Amount) -> Result<()> {
        let owner = ctx.caller();
        self.set_allowance(ctx, owner, spender, value)
    }

    /// Allowance-based transfer by the caller as spender
    pub fn transfer_from(
        &mut self,
        ctx: &mut CallContext,
        from: Address,
        to: Address,
        value: Amount,
    ) -> Result<()> {
        let spender = ctx.caller();
        let available = self.allowance(&from, &spender);
        if available < value {
            return Err(LedgerError::InsufficientAllowance {
                owner: from,
                spender,
                required: value,
                available,
            });
        }
        self.move_balance(ctx, from, to, value)?;
        // An unlimited allowance is never drawn down
        if available != Amount::MAX {
            self.allowances.insert((from, spender), available - value);
        }
        Ok(())
    }

    // ========================================================================
    // Signature-authorized operations
    // ========================================================================

    /// Set an allowance from an owner-signed permit
    pub fn permit(
        &mut self,
        ctx: &mut CallContext,
        payload: &PermitAuthorization,
        signature: &Signature,
    ) -> Result<()> {
        let domain = self.domain(ctx.chain_id());
        let stored = self.nonces.current(&payload.owner);
        let owner = authorize(&domain, payload, signature, &payload.owner, ctx.timestamp(), stored)?;

        self.set_allowance(ctx, owner, payload.spender, payload.value)?;
        self.nonces.advance(&owner)?;
        Ok(())
    }

    /// Move funds out of `from` on the strength of `from`'s signature.
    ///
    /// The signature is checked before the balance.
    pub fn transfer_from_by_sig(
        &mut self,
        ctx: &mut CallContext,
        payload: &TransferAuthorization,
        signature: &Signature,
    ) -> Result<()> {
        let domain = self.domain(ctx.chain_id());
        let stored = self.nonces.current(&payload.from);
        let from = authorize(&domain, payload, signature, &payload.from, ctx.timestamp(), stored)?;

        self.move_balance(ctx, from, payload.to, payload.value)?;
        self.nonces.advance(&from)?;
        Ok(())
    }

    /// Mint on the strength of a minter signature.
    ///
    /// `registry` must be the registry this token was created under; it is
    /// consulted for bridged tokens, whose mints need a network admin.
    pub fn mint_by_sig(
        &mut self,
        ctx: &mut CallContext,
        registry: &RoleRegistry,
        payload: &MintAuthorization,
        signature: &Signature,
    ) -> Result<()> {
        if registry.address() != self.registry {
            return Err(LedgerError::invalid_input(
                "registry",
                format!("token {} is governed by {}", self.address, self.registry),
            ));
        }
        let authority = match self.variant {
            TokenVariant::Standard => MintAuthority::Minter(self.minter),
            TokenVariant::InterChain { .. } => {
                MintAuthority::NetworkAdmin(registry.gate(Role::network_admin()))
            }
        };
        let policy = MintSigner {
            named: payload.minter,
            authority,
        };

        let domain = self.domain(ctx.chain_id());
        let stored = self.nonces.current(&payload.minter);
        let minter = authorize(&domain, payload, signature, &policy, ctx.timestamp(), stored)?;

        self.credit(ctx, payload.to, payload.value)?;
        self.nonces.advance(&minter)?;
        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn credit(&mut self, ctx: &mut CallContext, to: Address, value: Amount) -> Result<()> {
        if to.is_zero() {
            return Err(LedgerError::invalid_input("to", "mint to the zero address"));
        }
        let supply = self
            .total_supply
            .checked_add(value)
            .ok_or_else(|| LedgerError::overflow("total supply"))?;
        let balance = self
            .balance_of(&to)
            .checked_add(value)
            .ok_or_else(|| LedgerError::overflow("balance"))?;

        self.total_supply = supply;
        self.balances.insert(to, balance);
        debug!(token = %self.address, %to, %value, "Minted");
        ctx.emit(LedgerEvent::Transfer {
            token: self.address,
            from: Address::ZERO,
            to,
            value,
        });
        Ok(())
    }

    fn move_balance(
        &mut self,
        ctx: &mut CallContext,
        from: Address,
        to: Address,
        value: Amount,
    ) -> Result<()> {
        if to.is_zero() {
            return Err(LedgerError::invalid_input("to", "transfer to the zero address"));
        }
        let available = self.balance_of(&from);
        if available < value {
            return Err(LedgerError::InsufficientBalance {
                account: from,
                required: value,
                available,
            });
        }

        self.balances.insert(from, available - value);
        let credited = self
            .balance_of(&to)
            .checked_add(value)
            .ok_or_else(|| LedgerError::overflow("balance"))?;
        self.balances.insert(to, credited);

        debug!(token = %self.address, %from, %to, %value, "Transferred");
        ctx.emit(LedgerEvent::Transfer {
            token: self.address,
            from,
            to,
            value,
        });
        Ok(())
    }

    fn set_allowance(
        &mut self,
        ctx: &mut CallContext,
        owner: Address,
        spender: Address,
        value: Amount,
    ) -> Result<()> {
        if spender.is_zero() {
            return Err(LedgerError::invalid_input("spender", "approve the zero address"));
        }
        self.allowances.insert((owner, spender), value);
        debug!(token = %self.address, %owner, %spender, %value, "Approved");
        ctx.emit(LedgerEvent::Approval {
            token: self.address,
            owner,
            spender,
            value,
        });
        Ok(())
    }
}
