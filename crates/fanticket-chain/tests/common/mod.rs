//! Shared fixtures for the chain integration tests

#![allow(dead_code)]

use fanticket_chain::{Chain, ChainConfig};
use fanticket_clearing::{OrderKind, TransactionOrder};
use fanticket_crypto::{Domain, Signature, Wallet};
use fanticket_factory::{CreationPermit, FactoryKind, InterChainCreationPermit};
use fanticket_ledger::{MintAuthorization, PermitAuthorization, TransferAuthorization};
use fanticket_parking::WithdrawAuthorization;
use fanticket_types::{Address, Amount, U256};

/// Block time every test chain starts at
pub const GENESIS_TIME: u64 = 1_700_000_000;

/// One hour after genesis
pub fn deadline() -> U256 {
    U256::from(GENESIS_TIME + 3600)
}

pub fn wallet(name: &str) -> Wallet {
    Wallet::for_name(name).unwrap()
}

/// A chain with one registry, both factory kinds, a clearing house and a
/// parking ledger, all deployed by `admin`
pub struct Harness {
    pub chain: Chain,
    pub admin: Wallet,
    pub relayer: Address,
    pub registry: Address,
    pub factory: Address,
    pub inter_chain_factory: Address,
    pub house: Address,
    pub parking: Address,
}

impl Harness {
    pub async fn new() -> Self {
        let config = ChainConfig::development();
        let _ = fanticket_chain::init_tracing(&config.logging);
        let chain = Chain::new(&config.chain);

        let admin = wallet("admin");
        let deployer = admin.address();
        let registry = chain.deploy_registry(deployer).await.unwrap();
        let factory = chain
            .deploy_factory(deployer, FactoryKind::Standard, registry)
            .await
            .unwrap();
        let inter_chain_factory = chain
            .deploy_factory(deployer, FactoryKind::InterChain, registry)
            .await
            .unwrap();
        let house = chain.deploy_clearing_house(deployer).await.unwrap();
        let parking = chain.deploy_parking(deployer, registry).await.unwrap();

        Self {
            chain,
            admin,
            relayer: wallet("relayer").address(),
            registry,
            factory,
            inter_chain_factory,
            house,
            parking,
        }
    }

    /// Creation permit signed by `signer` for the standard factory
    pub async fn creation_permit(
        &self,
        signer: &Wallet,
        name: &str,
        symbol: &str,
        owner: Address,
        initial_supply: Amount,
    ) -> (CreationPermit, Signature) {
        let permit = CreationPermit {
            name: name.to_string(),
            symbol: symbol.to_string(),
            owner,
            initial_supply,
            token_id: 1,
        };
        let domain = self.chain.factory_domain(self.factory).await.unwrap();
        let signature = signer.sign_typed(&domain, &permit).unwrap();
        (permit, signature)
    }

    /// Create a standard token owned by `owner` through an admin-signed permit
    pub async fn create_token(&self, name: &str, symbol: &str, owner: &Wallet, initial_supply: Amount) -> Address {
        let (permit, signature) = self
            .creation_permit(&self.admin, name, symbol, owner.address(), initial_supply)
            .await;
        self.chain
            .new_token(self.relayer, self.factory, permit, signature)
            .await
            .unwrap()
    }

    /// Create the bridged counterpart of a token on chain 1
    pub async fn create_inter_chain_token(&self, name: &str, symbol: &str) -> Address {
        let permit = InterChainCreationPermit {
            origin_address: Address::new([0x11; 20]),
            name: name.to_string(),
            symbol: symbol.to_string(),
            token_id: 7,
            origin_chain_id: U256::one(),
        };
        let domain = self
            .chain
            .factory_domain(self.inter_chain_factory)
            .await
            .unwrap();
        let signature = self.admin.sign_typed(&domain, &permit).unwrap();
        self.chain
            .new_inter_chain_token(self.relayer, self.inter_chain_factory, permit, signature)
            .await
            .unwrap()
    }

    /// Transfer authorization at `from`'s current nonce
    pub async fn transfer_authorization(
        &self,
        token: Address,
        from: &Wallet,
        to: Address,
        value: Amount,
    ) -> (TransferAuthorization, Signature) {
        let nonce = self.chain.nonce(token, from.address()).await.unwrap();
        let domain = self.chain.token_domain(token).await.unwrap();
        signed_transfer(&domain, from, to, value, nonce, deadline())
    }

    /// Transfer order at an explicit nonce
    pub async fn transfer_order(
        &self,
        token: Address,
        from: &Wallet,
        to: Address,
        value: Amount,
        nonce: U256,
    ) -> TransactionOrder {
        let domain = self.chain.token_domain(token).await.unwrap();
        let (auth, signature) = signed_transfer(&domain, from, to, value, nonce, deadline());
        TransactionOrder::transfer(token, auth, signature)
    }

    /// Mint order signed by `minter` at an explicit nonce
    pub async fn mint_order(
        &self,
        token: Address,
        minter: &Wallet,
        to: Address,
        value: Amount,
        nonce: U256,
    ) -> TransactionOrder {
        let (auth, signature) = self.mint_authorization(token, minter, to, value, nonce).await;
        TransactionOrder::mint(token, auth, signature)
    }

    /// Transfer or mint order signed by the token's owner
    pub async fn mixed_order(
        &self,
        token: Address,
        owner: &Wallet,
        kind: OrderKind,
        to: Address,
        value: Amount,
        nonce: U256,
    ) -> TransactionOrder {
        match kind {
            OrderKind::Transfer => self.transfer_order(token, owner, to, value, nonce).await,
            OrderKind::Mint => self.mint_order(token, owner, to, value, nonce).await,
        }
    }

    pub async fn mint_authorization(
        &self,
        token: Address,
        minter: &Wallet,
        to: Address,
        value: Amount,
        nonce: U256,
    ) -> (MintAuthorization, Signature) {
        let auth = MintAuthorization {
            minter: minter.address(),
            to,
            value,
            nonce,
            deadline: deadline(),
        };
        let domain = self.chain.token_domain(token).await.unwrap();
        let signature = minter.sign_typed(&domain, &auth).unwrap();
        (auth, signature)
    }

    /// EIP-2612 style permit at `owner`'s current nonce
    pub async fn permit(
        &self,
        token: Address,
        owner: &Wallet,
        spender: Address,
        value: Amount,
    ) -> (PermitAuthorization, Signature) {
        let auth = PermitAuthorization {
            owner: owner.address(),
            spender,
            value,
            nonce: self.chain.nonce(token, owner.address()).await.unwrap(),
            deadline: deadline(),
        };
        let domain = self.chain.token_domain(token).await.unwrap();
        let signature = owner.sign_typed(&domain, &auth).unwrap();
        (auth, signature)
    }

    /// Parking withdrawal signed by `signer` at the current withdrawal nonce
    pub async fn withdrawal(
        &self,
        signer: &Wallet,
        token: Address,
        who: Address,
        value: Amount,
    ) -> (WithdrawAuthorization, Signature) {
        let auth = WithdrawAuthorization {
            token,
            who,
            value,
            nonce: self
                .chain
                .withdraw_nonce(self.parking, token, who)
                .await
                .unwrap(),
            deadline: deadline(),
        };
        let domain = self.chain.parking_domain(self.parking).await.unwrap();
        let signature = signer.sign_typed(&domain, &auth).unwrap();
        (auth, signature)
    }
}

pub fn signed_transfer(
    domain: &Domain,
    from: &Wallet,
    to: Address,
    value: Amount,
    nonce: U256,
    deadline: U256,
) -> (TransferAuthorization, Signature) {
    let auth = TransferAuthorization {
        from: from.address(),
        to,
        value,
        nonce,
        deadline,
    };
    let signature = from.sign_typed(domain, &auth).unwrap();
    (auth, signature)
}

pub fn units(n: u64) -> Amount {
    Amount::from(n)
}
