//! The token factory
//!
//! # Creation steps
//!
//! 1. Verify the permit was signed by a network admin of the factory's registry
//! 2. Reject a symbol this factory already created (`SymbolTaken`)
//! 3. Build and initialize the instance at `compute_address(name, symbol)`
//! 4. Place it, mark the symbol taken and record `TokenCreated`
//!
//! Steps 3 and 4 only touch shared state once the instance is fully
//! initialized, so there is no window with a reserved symbol and no token.

use crate::addressing::{create2_address, token_salt};
use crate::permit::{CreationPermit, InterChainCreationPermit};
use fanticket_crypto::{authorize, keccak256, Domain, Signature};
use fanticket_ledger::{TokenArena, TokenInit, TokenLedger, TokenVariant};
use fanticket_registry::RoleRegistry;
use fanticket_types::{
    Address, Amount, CallContext, ChainId, LedgerError, LedgerEvent, Result, Role, U256,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Which token variant a factory creates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactoryKind {
    Standard,
    InterChain,
}

impl FactoryKind {
    /// Name of the factory's signing domain
    pub fn domain_name(&self) -> &'static str {
        match self {
            Self::Standard => "FanTicketFactory",
            Self::InterChain => "InterChainFanTicketFactory",
        }
    }

    /// Code tag of the token variant this factory deploys
    pub fn code_tag(&self) -> &'static str {
        match self {
            Self::Standard => "FanTicketV2",
            Self::InterChain => "InterChainFanTicket",
        }
    }

    /// Stand-in for the deployed code's hash in address derivation
    pub fn code_hash(&self) -> [u8; 32] {
        keccak256(self.code_tag().as_bytes())
    }
}

#[derive(Debug, Clone)]
pub struct TokenFactory {
    address: Address,
    kind: FactoryKind,
    registry: Address,
    created: BTreeMap<String, Address>,
}

impl TokenFactory {
    pub fn deploy(address: Address, kind: FactoryKind, registry: Address) -> Self {
        info!(factory = %address, ?kind, %registry, "Token factory deployed");
        Self {
            address,
            kind,
            registry,
            created: BTreeMap::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn kind(&self) -> FactoryKind {
        self.kind
    }

    pub fn registry(&self) -> Address {
        self.registry
    }

    pub fn domain(&self, chain_id: ChainId) -> Domain {
        Domain::new(self.kind.domain_name(), chain_id, self.address)
    }

    /// Where the token for (name, symbol) lives or will live. Pure: valid
    /// before and after creation, whether or not creation ever happens.
    pub fn compute_address(&self, name: &str, symbol: &str) -> Address {
        create2_address(
            &self.address,
            &token_salt(name, symbol),
            &self.kind.code_hash(),
        )
    }

    pub fn is_created(&self, symbol: &str) -> bool {
        self.created.contains_key(symbol)
    }

    /// Address of the token created for `symbol`, if any
    pub fn created_token(&self, symbol: &str) -> Option<Address> {
        self.created.get(symbol).copied()
    }

    pub fn created_count(&self) -> usize {
        self.created.len()
    }

    /// Create a locally issued token from an admin-signed permit
    pub fn new_token(
        &mut self,
        ctx: &mut CallContext,
        registry: &RoleRegistry,
        tokens: &mut TokenArena,
        permit: &CreationPermit,
        signature: &Signature,
    ) -> Result<Address> {
        self.require_kind(FactoryKind::Standard)?;
        self.verify_admin(ctx, registry, permit, signature)?;

        let init = TokenInit {
            name: permit.name.clone(),
            symbol: permit.symbol.clone(),
            token_id: permit.token_id,
            owner: permit.owner,
            initial_supply: permit.initial_supply,
            variant: TokenVariant::Standard,
        };
        self.create(ctx, tokens, init)
    }

    /// Create the bridged counterpart of a token on another chain
    pub fn new_inter_chain_token(
        &mut self,
        ctx: &mut CallContext,
        registry: &RoleRegistry,
        tokens: &mut TokenArena,
        permit: &InterChainCreationPermit,
        signature: &Signature,
    ) -> Result<Address> {
        self.require_kind(FactoryKind::InterChain)?;
        self.verify_admin(ctx, registry, permit, signature)?;

        let init = TokenInit {
            name: permit.name.clone(),
            symbol: permit.symbol.clone(),
            token_id: permit.token_id,
            owner: self.address,
            initial_supply: Amount::zero(),
            variant: TokenVariant::InterChain {
                origin_chain_id: permit.origin_chain_id,
                origin_address: permit.origin_address,
            },
        };
        self.create(ctx, tokens, init)
    }

    fn require_kind(&self, kind: FactoryKind) -> Result<()> {
        if self.kind != kind {
            return Err(LedgerError::invalid_input(
                "factory",
                format!("{} creates {:?} tokens", self.address, self.kind),
            ));
        }
        Ok(())
    }

    fn verify_admin<P: fanticket_crypto::SignedPayload>(
        &self,
        ctx: &CallContext,
        registry: &RoleRegistry,
        permit: &P,
        signature: &Signature,
    ) -> Result<Address> {
        if registry.address() != self.registry {
            return Err(LedgerError::invalid_input(
                "registry",
                format!("factory {} is governed by {}", self.address, self.registry),
            ));
        }
        authorize(
            &self.domain(ctx.chain_id()),
            permit,
            signature,
            &registry.gate(Role::network_admin()),
            ctx.timestamp(),
            U256::zero(),
        )
    }

    fn create(&mut self, ctx: &mut CallContext, tokens: &mut TokenArena, init: TokenInit) -> Result<Address> {
        if self.created.contains_key(&init.symbol) {
            return Err(LedgerError::SymbolTaken {
                symbol: init.symbol,
            });
        }

        let address = self.compute_address(&init.name, &init.symbol);
        if tokens.contains(&address) {
            return Err(LedgerError::AddressOccupied { address });
        }

        let (name, symbol, token_id) = (init.name.clone(), init.symbol.clone(), init.token_id);
        let mut token = TokenLedger::deploy(address, self.address, self.registry);
        let mark = ctx.event_mark();
        if let Err(e) = ctx.call_as(self.address, |c| token.init(c, init)) {
            ctx.rewind_events(mark);
            return Err(e);
        }

        tokens.deploy(token)?;
        self.created.insert(symbol.clone(), address);

        info!(factory = %self.address, %name, %symbol, token = %address, "Token created");
        ctx.emit(LedgerEvent::TokenCreated {
            factory: self.address,
            token_id,
            name,
            symbol,
            token: address,
        });
        Ok(address)
    }
}

/// Every deployed factory, keyed by address
#[derive(Debug, Clone, Default)]
pub struct Factories {
    factories: BTreeMap<Address, TokenFactory>,
}

impl Factories {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, factory: TokenFactory) -> Result<()> {
        let address = factory.address();
        if self.factories.contains_key(&address) {
            return Err(LedgerError::AddressOccupied { address });
        }
        self.factories.insert(address, factory);
        Ok(())
    }

    pub fn get(&self, address: &Address) -> Result<&TokenFactory> {
        self.factories
            .get(address)
            .ok_or_else(|| LedgerError::unknown_contract("token factory", *address))
    }

    pub fn get_mut(&mut self, address: &Address) -> Result<&mut TokenFactory> {
        self.factories
            .get_mut(address)
            .ok_or_else(|| LedgerError::unknown_contract("token factory", *address))
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.factories.contains_key(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanticket_crypto::Wallet;

    struct Fixture {
        admin: Wallet,
        registry: RoleRegistry,
        factory: TokenFactory,
        tokens: TokenArena,
    }

    fn ctx(caller: Address) -> CallContext {
        CallContext::new(caller, 1_000, ChainId::LOCAL)
    }

    fn fixture(kind: FactoryKind) -> Fixture {
        let admin = Wallet::for_name("network-manager").unwrap();
        let registry = RoleRegistry::deploy(&mut ctx(admin.address()), Address::new([0xee; 20]));
        let factory = TokenFactory::deploy(Address::new([0xfa; 20]), kind, registry.address());
        Fixture {
            admin,
            registry,
            factory,
            tokens: TokenArena::new(),
        }
    }

    fn permit(name: &str, symbol: &str, owner: Address) -> CreationPermit {
        CreationPermit {
            name: name.into(),
            symbol: symbol.into(),
            owner,
            initial_supply: Amount::from(1_000u64),
            token_id: 114514,
        }
    }

    #[test]
    fn test_create_lands_at_computed_address() {
        let mut f = fixture(FactoryKind::Standard);
        let owner = Address::new([1u8; 20]);
        let p = permit("小富币", "FWC", owner);
        let predicted = f.factory.compute_address(&p.name, &p.symbol);
        let sig = f.admin.sign_typed(&f.factory.domain(ChainId::LOCAL), &p).unwrap();

        let mut c = ctx(Address::new([9u8; 20]));
        let created = f
            .factory
            .new_token(&mut c, &f.registry, &mut f.tokens, &p, &sig)
            .unwrap();
        assert_eq!(created, predicted);
        assert_eq!(f.factory.compute_address(&p.name, &p.symbol), predicted);

        let token = f.tokens.get(&created).unwrap();
        assert_eq!(token.symbol(), "FWC");
        assert_eq!(token.balance_of(&owner), Amount::from(1_000u64));
        assert!(matches!(
            c.events().last(),
            Some(LedgerEvent::TokenCreated { token, .. }) if *token == predicted
        ));
    }

    #[test]
    fn test_same_symbol_taken() {
        let mut f = fixture(FactoryKind::Standard);
        let domain = f.factory.domain(ChainId::LOCAL);
        let first = permit("小富币", "FWC", Address::new([1u8; 20]));
        let second = permit("小FU币", "FWC", Address::new([2u8; 20]));
        let sig1 = f.admin.sign_typed(&domain, &first).unwrap();
        let sig2 = f.admin.sign_typed(&domain, &second).unwrap();

        let mut c = ctx(Address::ZERO);
        f.factory
            .new_token(&mut c, &f.registry, &mut f.tokens, &first, &sig1)
            .unwrap();
        let err = f
            .factory
            .new_token(&mut c, &f.registry, &mut f.tokens, &second, &sig2)
            .unwrap_err();
        assert_eq!(err.error_code(), "SYMBOL_TAKEN");
        assert_eq!(f.tokens.len(), 1);
    }

    #[test]
    fn test_non_admin_permit_rejected() {
        let mut f = fixture(FactoryKind::Standard);
        let stranger = Wallet::for_name("stranger").unwrap();
        let p = permit("小富币", "FWC", Address::new([1u8; 20]));
        let sig = stranger.sign_typed(&f.factory.domain(ChainId::LOCAL), &p).unwrap();

        let err = f
            .factory
            .new_token(&mut ctx(Address::ZERO), &f.registry, &mut f.tokens, &p, &sig)
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_SIGNATURE");
        assert!(!f.factory.is_created("FWC"));
        assert!(f.tokens.is_empty());
    }

    #[test]
    fn test_variant_changes_address() {
        let standard = fixture(FactoryKind::Standard).factory;
        let bridged = TokenFactory::deploy(standard.address(), FactoryKind::InterChain, standard.registry());
        assert_ne!(
            standard.compute_address("A", "B"),
            bridged.compute_address("A", "B")
        );
    }

    #[test]
    fn test_inter_chain_creation() {
        let mut f = fixture(FactoryKind::InterChain);
        let p = InterChainCreationPermit {
            origin_address: Address::ZERO,
            name: "小富币".into(),
            symbol: "FWC".into(),
            token_id: 114514,
            origin_chain_id: U256::one(),
        };
        let sig = f.admin.sign_typed(&f.factory.domain(ChainId::LOCAL), &p).unwrap();
        let created = f
            .factory
            .new_inter_chain_token(&mut ctx(Address::ZERO), &f.registry, &mut f.tokens, &p, &sig)
            .unwrap();
        let token = f.tokens.get(&created).unwrap();
        assert!(token.variant().is_inter_chain());
        assert_eq!(token.total_supply(), Amount::zero());
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let mut f = fixture(FactoryKind::InterChain);
        let p = permit("A", "A", Address::new([1u8; 20]));
        let sig = f.admin.sign_typed(&f.factory.domain(ChainId::LOCAL), &p).unwrap();
        let err = f
            .factory
            .new_token(&mut ctx(Address::ZERO), &f.registry, &mut f.tokens, &p, &sig)
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }
}
