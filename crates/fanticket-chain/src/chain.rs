//! The `Chain` handle
//!
//! Owns every deployed instance behind one async lock. Mutations take the
//! write lock and run as a single `WorldState::transact` unit of work, so
//! they are applied in one global order and either land whole or not at
//! all. Views take the read lock.

use crate::config::ChainSettings;
use crate::operation::{AuthorizedOperation, OperationOutcome};
use crate::state::{Clock, Ledgers, WorldState};
use fanticket_clearing::{ClearingHouse, ClearingReport, OrderOutcome, TransactionOrder};
use fanticket_crypto::{Domain, Signature};
use fanticket_factory::{CreationPermit, FactoryKind, InterChainCreationPermit, TokenFactory};
use fanticket_ledger::{
    MintAuthorization, PermitAuthorization, TokenInit, TokenMetadata, TransferAuthorization,
};
use fanticket_parking::{ParkingLedger, WithdrawAuthorization};
use fanticket_registry::RoleRegistry;
use fanticket_types::{
    Address, Amount, CallContext, ChainId, LedgerError, LedgerEvent, Result, Role, U256,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Shared handle to one chain
#[derive(Debug, Clone)]
pub struct Chain {
    state: Arc<RwLock<WorldState>>,
}

impl Chain {
    pub fn new(settings: &ChainSettings) -> Self {
        let clock = match settings.fixed_timestamp {
            Some(ts) => Clock::Fixed(ts),
            None => Clock::Wall { skew: 0 },
        };
        info!(chain_id = settings.chain_id, ?clock, "Chain started");
        Self {
            state: Arc::new(RwLock::new(WorldState::new(ChainId(settings.chain_id), clock))),
        }
    }

    /// Local development chain on the wall clock
    pub fn local() -> Self {
        Self::new(&ChainSettings::default())
    }

    async fn transact<T>(
        &self,
        caller: Address,
        f: impl FnOnce(&mut Ledgers, &mut CallContext) -> Result<T>,
    ) -> Result<T> {
        self.state.write().await.transact(caller, f)
    }

    async fn view<T>(&self, f: impl FnOnce(&Ledgers) -> T) -> T {
        f(&self.state.read().await.ledgers)
    }

    // ========================================================================
    // Clock & log
    // ========================================================================

    pub async fn chain_id(&self) -> ChainId {
        self.state.read().await.chain_id()
    }

    /// Current block time in seconds
    pub async fn now(&self) -> u64 {
        self.state.read().await.now()
    }

    /// Pin the block clock
    pub async fn set_timestamp(&self, timestamp: u64) {
        self.state.write().await.set_clock(Clock::Fixed(timestamp));
    }

    pub async fn advance_time(&self, seconds: u64) {
        self.state.write().await.clock_mut().advance(seconds);
    }

    /// Committed events, oldest first
    pub async fn events(&self) -> Vec<LedgerEvent> {
        self.state.read().await.events().to_vec()
    }

    // ========================================================================
    // Deployment
    // ========================================================================

    /// Deploy a role registry; `deployer` becomes its admin
    pub async fn deploy_registry(&self, deployer: Address) -> Result<Address> {
        self.transact(deployer, |ledgers, ctx| {
            let address = ledgers.next_address(ctx.caller())?;
            ledgers.registries.insert(RoleRegistry::deploy(ctx, address))?;
            Ok(address)
        })
        .await
    }

    pub async fn deploy_factory(
        &self,
        deployer: Address,
        kind: FactoryKind,
        registry: Address,
    ) -> Result<Address> {
        self.transact(deployer, |ledgers, ctx| {
            if !ledgers.registries.contains(&registry) {
                return Err(LedgerError::unknown_contract("role registry", registry));
            }
            let address = ledgers.next_address(ctx.caller())?;
            ledgers
                .factories
                .insert(TokenFactory::deploy(address, kind, registry))?;
            Ok(address)
        })
        .await
    }

    pub async fn deploy_clearing_house(&self, deployer: Address) -> Result<Address> {
        self.transact(deployer, |ledgers, ctx| {
            let address = ledgers.next_address(ctx.caller())?;
            ledgers.houses.insert(ClearingHouse::deploy(address))?;
            Ok(address)
        })
        .await
    }

    pub async fn deploy_parking(&self, deployer: Address, registry: Address) -> Result<Address> {
        self.transact(deployer, |ledgers, ctx| {
            if !ledgers.registries.contains(&registry) {
                return Err(LedgerError::unknown_contract("role registry", registry));
            }
            let address = ledgers.next_address(ctx.caller())?;
            ledgers
                .parkings
                .insert(ParkingLedger::deploy(address, registry))?;
            Ok(address)
        })
        .await
    }

    // ========================================================================
    // Roles
    // ========================================================================

    pub async fn grant_role(
        &self,
        caller: Address,
        registry: Address,
        role: Role,
        account: Address,
    ) -> Result<bool> {
        self.transact(caller, |ledgers, ctx| {
            ledgers.registries.get_mut(&registry)?.grant_role(ctx, role, account)
        })
        .await
    }

    pub async fn revoke_role(
        &self,
        caller: Address,
        registry: Address,
        role: Role,
        account: Address,
    ) -> Result<bool> {
        self.transact(caller, |ledgers, ctx| {
            ledgers.registries.get_mut(&registry)?.revoke_role(ctx, role, account)
        })
        .await
    }

    pub async fn renounce_role(&self, caller: Address, registry: Address, role: Role) -> Result<bool> {
        self.transact(caller, |ledgers, ctx| {
            ledgers
                .registries
                .get_mut(&registry)?
                .renounce_role(ctx, role, caller)
        })
        .await
    }

    pub async fn has_role(&self, registry: Address, role: Role, account: Address) -> Result<bool> {
        self.view(|ledgers| ledgers.registries.get(&registry).map(|r| r.has_role(role, account)))
            .await
    }

    pub async fn role_members(&self, registry: Address, role: Role) -> Result<Vec<Address>> {
        self.view(|ledgers| ledgers.registries.get(&registry).map(|r| r.members(role)))
            .await
    }

    // ========================================================================
    // Factory
    // ========================================================================

    /// Address `factory` would place the token (name, symbol) at
    pub async fn compute_address(&self, factory: Address, name: &str, symbol: &str) -> Result<Address> {
        self.view(|ledgers| ledgers.factories.get(&factory).map(|f| f.compute_address(name, symbol)))
            .await
    }

    pub async fn is_created(&self, factory: Address, symbol: &str) -> Result<bool> {
        self.view(|ledgers| ledgers.factories.get(&factory).map(|f| f.is_created(symbol)))
            .await
    }

    /// Signing domain for creation permits
    pub async fn factory_domain(&self, factory: Address) -> Result<Domain> {
        let chain_id = self.chain_id().await;
        self.view(|ledgers| ledgers.factories.get(&factory).map(|f| f.domain(chain_id)))
            .await
    }

    /// Signing domain for transfer, mint and permit authorizations
    pub async fn token_domain(&self, token: Address) -> Result<Domain> {
        let chain_id = self.chain_id().await;
        self.view(|ledgers| ledgers.tokens.get(&token).map(|t| t.domain(chain_id)))
            .await
    }

    /// Signing domain for withdrawal permits
    pub async fn parking_domain(&self, parking: Address) -> Result<Domain> {
        let chain_id = self.chain_id().await;
        self.view(|ledgers| ledgers.parkings.get(&parking).map(|p| p.domain(chain_id)))
            .await
    }

    pub async fn new_token(
        &self,
        relayer: Address,
        factory: Address,
        permit: CreationPermit,
        signature: Signature,
    ) -> Result<Address> {
        let op = AuthorizedOperation::Create {
            factory,
            permit,
            signature,
        };
        self.submit_creation(relayer, op).await
    }

    pub async fn new_inter_chain_token(
        &self,
        relayer: Address,
        factory: Address,
        permit: InterChainCreationPermit,
        signature: Signature,
    ) -> Result<Address> {
        let op = AuthorizedOperation::CreateInterChain {
            factory,
            permit,
            signature,
        };
        self.submit_creation(relayer, op).await
    }

    async fn submit_creation(&self, relayer: Address, op: AuthorizedOperation) -> Result<Address> {
        let target = op.target();
        self.submit(relayer, op).await?.created().ok_or_else(|| {
            LedgerError::invalid_input("operation", format!("nothing created at {target}"))
        })
    }

    /// Call a token's initializer directly
    pub async fn init_token(&self, caller: Address, token: Address, init: TokenInit) -> Result<()> {
        self.transact(caller, |ledgers, ctx| ledgers.tokens.get_mut(&token)?.init(ctx, init))
            .await
    }

    // ========================================================================
    // Caller-authenticated token operations
    // ========================================================================

    pub async fn mint(&self, caller: Address, token: Address, to: Address, value: Amount) -> Result<()> {
        self.transact(caller, |ledgers, ctx| ledgers.tokens.get_mut(&token)?.mint(ctx, to, value))
            .await
    }

    pub async fn transfer(
        &self,
        caller: Address,
        token: Address,
        to: Address,
        value: Amount,
    ) -> Result<()> {
        self.transact(caller, |ledgers, ctx| {
            ledgers.tokens.get_mut(&token)?.transfer(ctx, to, value)
        })
        .await
    }

    pub async fn approve(
        &self,
        caller: Address,
        token: Address,
        spender: Address,
        value: Amount,
    ) -> Result<()> {
        self.transact(caller, |ledgers, ctx| {
            ledgers.tokens.get_mut(&token)?.approve(ctx, spender, value)
        })
        .await
    }

    pub async fn transfer_from(
        &self,
        caller: Address,
        token: Address,
        from: Address,
        to: Address,
        value: Amount,
    ) -> Result<()> {
        self.transact(caller, |ledgers, ctx| {
            ledgers.tokens.get_mut(&token)?.transfer_from(ctx, from, to, value)
        })
        .await
    }

    // ========================================================================
    // Signature-authorized operations
    // ========================================================================

    /// Apply one signed operation atomically on behalf of `relayer`
    pub async fn submit(&self, relayer: Address, op: AuthorizedOperation) -> Result<OperationOutcome> {
        let outcome = self
            .transact(relayer, |ledgers, ctx| op.apply(ledgers, ctx))
            .await;
        if let Err(e) = &outcome {
            warn!(
                op = op.name(),
                target = %op.target(),
                code = e.error_code(),
                error = %e,
                "Operation rejected"
            );
        }
        outcome
    }

    pub async fn permit(
        &self,
        relayer: Address,
        token: Address,
        authorization: PermitAuthorization,
        signature: Signature,
    ) -> Result<()> {
        let op = AuthorizedOperation::Permit {
            token,
            authorization,
            signature,
        };
        self.submit(relayer, op).await.map(|_| ())
    }

    pub async fn transfer_from_by_sig(
        &self,
        relayer: Address,
        token: Address,
        authorization: TransferAuthorization,
        signature: Signature,
    ) -> Result<()> {
        let op = AuthorizedOperation::Transfer {
            token,
            authorization,
            signature,
        };
        self.submit(relayer, op).await.map(|_| ())
    }

    pub async fn mint_by_sig(
        &self,
        relayer: Address,
        token: Address,
        authorization: MintAuthorization,
        signature: Signature,
    ) -> Result<()> {
        let op = AuthorizedOperation::Mint {
            token,
            authorization,
            signature,
        };
        self.submit(relayer, op).await.map(|_| ())
    }

    // ========================================================================
    // Clearing
    // ========================================================================

    /// Settle a batch through `house`, all-or-nothing
    pub async fn handle_orders(
        &self,
        relayer: Address,
        house: Address,
        orders: &[TransactionOrder],
    ) -> Result<ClearingReport> {
        self.transact(relayer, |ledgers, ctx| {
            ledgers.houses.get_mut(&house)?.settle(
                ctx,
                &mut ledgers.tokens,
                &ledgers.registries,
                orders,
            )
        })
        .await
    }

    /// Dry-run a batch; nothing is committed
    pub async fn simulate_orders(
        &self,
        relayer: Address,
        house: Address,
        orders: &[TransactionOrder],
    ) -> Result<Vec<OrderOutcome>> {
        let state = self.state.read().await;
        let ctx = state.context(relayer);
        let ledgers = &state.ledgers;
        let house = ledgers.houses.get(&house)?;
        Ok(house.simulate(&ctx, &ledgers.tokens, &ledgers.registries, orders))
    }

    // ========================================================================
    // Parking
    // ========================================================================

    pub async fn deposit(
        &self,
        relayer: Address,
        parking: Address,
        token: Address,
        authorization: TransferAuthorization,
        signature: Signature,
    ) -> Result<()> {
        let op = AuthorizedOperation::Deposit {
            parking,
            token,
            authorization,
            signature,
        };
        self.submit(relayer, op).await.map(|_| ())
    }

    pub async fn withdraw(
        &self,
        relayer: Address,
        parking: Address,
        authorization: WithdrawAuthorization,
        signature: Signature,
    ) -> Result<()> {
        let op = AuthorizedOperation::Withdraw {
            parking,
            authorization,
            signature,
        };
        self.submit(relayer, op).await.map(|_| ())
    }

    // ========================================================================
    // Views
    // ========================================================================

    pub async fn balance_of(&self, token: Address, account: Address) -> Result<Amount> {
        self.view(|ledgers| ledgers.tokens.get(&token).map(|t| t.balance_of(&account)))
            .await
    }

    pub async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<Amount> {
        self.view(|ledgers| ledgers.tokens.get(&token).map(|t| t.allowance(&owner, &spender)))
            .await
    }

    pub async fn total_supply(&self, token: Address) -> Result<Amount> {
        self.view(|ledgers| ledgers.tokens.get(&token).map(|t| t.total_supply()))
            .await
    }

    /// Next nonce `account` must sign with on `token`
    pub async fn nonce(&self, token: Address, account: Address) -> Result<U256> {
        self.view(|ledgers| ledgers.tokens.get(&token).map(|t| t.nonce(&account)))
            .await
    }

    pub async fn token_metadata(&self, token: Address) -> Result<TokenMetadata> {
        self.view(|ledgers| ledgers.tokens.get(&token).map(|t| t.metadata()))
            .await
    }

    pub async fn token_exists(&self, token: Address) -> bool {
        self.view(|ledgers| ledgers.tokens.contains(&token)).await
    }

    pub async fn parked_balance(&self, parking: Address, token: Address, who: Address) -> Result<Amount> {
        self.view(|ledgers| ledgers.parkings.get(&parking).map(|p| p.parked_balance(&token, &who)))
            .await
    }

    pub async fn withdraw_nonce(&self, parking: Address, token: Address, who: Address) -> Result<U256> {
        self.view(|ledgers| ledgers.parkings.get(&parking).map(|p| p.withdraw_nonce(&token, &who)))
            .await
    }

    pub async fn settled_batches(&self, house: Address) -> Result<u64> {
        self.view(|ledgers| ledgers.houses.get(&house).map(|h| h.settled_batches()))
            .await
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::local()
    }
}
