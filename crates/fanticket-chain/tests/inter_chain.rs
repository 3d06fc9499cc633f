//! Bridged tokens and the parking ledger

mod common;

use common::*;
use fanticket_chain::{AuthorizedOperation, OperationOutcome};
use fanticket_crypto::Wallet;
use fanticket_factory::InterChainCreationPermit;
use fanticket_ledger::TokenVariant;
use fanticket_types::{Address, Amount, LedgerError, LedgerEvent, Role, U256};

/// Bridged token with `amount` minted to `holder` by the network admin
async fn funded_bridged_token(h: &Harness, holder: &Wallet, amount: Amount) -> Address {
    let token = h.create_inter_chain_token("Fan Club", "FAN").await;
    let nonce = h.chain.nonce(token, h.admin.address()).await.unwrap();
    let (auth, signature) = h
        .mint_authorization(token, &h.admin, holder.address(), amount, nonce)
        .await;
    h.chain.mint_by_sig(h.relayer, token, auth, signature).await.unwrap();
    token
}

#[tokio::test]
async fn test_inter_chain_token_metadata() {
    let h = Harness::new().await;
    let predicted = h
        .chain
        .compute_address(h.inter_chain_factory, "Fan Club", "FAN")
        .await
        .unwrap();
    let token = h.create_inter_chain_token("Fan Club", "FAN").await;
    assert_eq!(token, predicted);

    let metadata = h.chain.token_metadata(token).await.unwrap();
    assert_eq!(metadata.token_id, 7);
    assert_eq!(metadata.total_supply, Amount::zero());
    assert_eq!(
        metadata.variant,
        TokenVariant::InterChain {
            origin_chain_id: U256::one(),
            origin_address: Address::new([0x11; 20]),
        }
    );
}

#[tokio::test]
async fn test_direct_mint_disabled() {
    let h = Harness::new().await;
    let token = h.create_inter_chain_token("Fan Club", "FAN").await;

    for caller in [h.admin.address(), h.inter_chain_factory] {
        let err = h
            .chain
            .mint(caller, token, wallet("fan").address(), units(1))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::MintDisabled { .. }));
    }
}

#[tokio::test]
async fn test_mint_by_sig_needs_network_admin() {
    let h = Harness::new().await;
    let fan = wallet("fan");
    let token = funded_bridged_token(&h, &fan, units(500)).await;
    assert_eq!(h.chain.balance_of(token, fan.address()).await.unwrap(), units(500));
    assert_eq!(h.chain.nonce(token, h.admin.address()).await.unwrap(), U256::one());

    let (auth, signature) = h
        .mint_authorization(token, &fan, fan.address(), units(1), U256::zero())
        .await;
    let err = h
        .chain
        .mint_by_sig(h.relayer, token, auth, signature)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidSignature { .. }));

    // Granting the role is enough
    h.chain
        .grant_role(h.admin.address(), h.registry, Role::network_admin(), fan.address())
        .await
        .unwrap();
    let (auth, signature) = h
        .mint_authorization(token, &fan, fan.address(), units(1), U256::zero())
        .await;
    h.chain.mint_by_sig(h.relayer, token, auth, signature).await.unwrap();
    assert_eq!(h.chain.total_supply(token).await.unwrap(), units(501));
}

#[tokio::test]
async fn test_bridged_creation_needs_admin() {
    let h = Harness::new().await;
    let mallory = wallet("mallory");
    let permit = InterChainCreationPermit {
        origin_address: Address::new([0x22; 20]),
        name: "Fan Club".to_string(),
        symbol: "FAN".to_string(),
        token_id: 1,
        origin_chain_id: U256::from(5u64),
    };
    let domain = h.chain.factory_domain(h.inter_chain_factory).await.unwrap();
    let signature = mallory.sign_typed(&domain, &permit).unwrap();

    let err = h
        .chain
        .new_inter_chain_token(h.relayer, h.inter_chain_factory, permit, signature)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidSignature { .. }));
    assert!(!h.chain.is_created(h.inter_chain_factory, "FAN").await.unwrap());
}

#[tokio::test]
async fn test_park_and_release() {
    let h = Harness::new().await;
    let fan = wallet("fan");
    let token = funded_bridged_token(&h, &fan, units(500)).await;

    let (auth, signature) = h.transfer_authorization(token, &fan, h.parking, units(200)).await;
    h.chain
        .deposit(h.relayer, h.parking, token, auth, signature)
        .await
        .unwrap();
    assert_eq!(
        h.chain.parked_balance(h.parking, token, fan.address()).await.unwrap(),
        units(200)
    );
    assert_eq!(h.chain.balance_of(token, h.parking).await.unwrap(), units(200));
    assert_eq!(h.chain.balance_of(token, fan.address()).await.unwrap(), units(300));
    assert_eq!(h.chain.nonce(token, fan.address()).await.unwrap(), U256::one());

    let (auth, signature) = h.withdrawal(&h.admin, token, fan.address(), units(150)).await;
    h.chain
        .withdraw(h.relayer, h.parking, auth.clone(), signature)
        .await
        .unwrap();
    assert_eq!(
        h.chain.parked_balance(h.parking, token, fan.address()).await.unwrap(),
        units(50)
    );
    assert_eq!(h.chain.balance_of(token, fan.address()).await.unwrap(), units(450));
    assert_eq!(
        h.chain.withdraw_nonce(h.parking, token, fan.address()).await.unwrap(),
        U256::one()
    );
    // The token nonce is a separate sequence
    assert_eq!(h.chain.nonce(token, fan.address()).await.unwrap(), U256::one());

    let err = h
        .chain
        .withdraw(h.relayer, h.parking, auth, signature)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidNonce { .. }));

    let released = h
        .chain
        .events()
        .await
        .into_iter()
        .filter(|event| matches!(event, LedgerEvent::Released { .. }))
        .count();
    assert_eq!(released, 1);
}

#[tokio::test]
async fn test_release_beyond_parked_balance() {
    let h = Harness::new().await;
    let fan = wallet("fan");
    let token = funded_bridged_token(&h, &fan, units(500)).await;

    let (auth, signature) = h.transfer_authorization(token, &fan, h.parking, units(100)).await;
    h.chain
        .deposit(h.relayer, h.parking, token, auth, signature)
        .await
        .unwrap();

    let (auth, signature) = h.withdrawal(&h.admin, token, fan.address(), units(101)).await;
    let err = h
        .chain
        .withdraw(h.relayer, h.parking, auth, signature)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientParkedBalance { .. }));
    assert_eq!(
        h.chain.parked_balance(h.parking, token, fan.address()).await.unwrap(),
        units(100)
    );
    assert_eq!(
        h.chain.withdraw_nonce(h.parking, token, fan.address()).await.unwrap(),
        U256::zero()
    );
}

#[tokio::test]
async fn test_release_needs_admin_countersignature() {
    let h = Harness::new().await;
    let fan = wallet("fan");
    let token = funded_bridged_token(&h, &fan, units(500)).await;

    let (auth, signature) = h.transfer_authorization(token, &fan, h.parking, units(100)).await;
    h.chain
        .deposit(h.relayer, h.parking, token, auth, signature)
        .await
        .unwrap();

    // The depositor cannot release its own funds
    let (auth, signature) = h.withdrawal(&fan, token, fan.address(), units(100)).await;
    let err = h
        .chain
        .withdraw(h.relayer, h.parking, auth, signature)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidSignature { .. }));
    assert_eq!(h.chain.balance_of(token, h.parking).await.unwrap(), units(100));
}

#[tokio::test]
async fn test_deposit_must_target_custody() {
    let h = Harness::new().await;
    let fan = wallet("fan");
    let token = funded_bridged_token(&h, &fan, units(500)).await;

    let (authorization, signature) = h
        .transfer_authorization(token, &fan, wallet("elsewhere").address(), units(100))
        .await;
    let err = h
        .chain
        .submit(
            h.relayer,
            AuthorizedOperation::Deposit {
                parking: h.parking,
                token,
                authorization,
                signature,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_INPUT");
    assert_eq!(h.chain.balance_of(token, fan.address()).await.unwrap(), units(500));
    assert_eq!(h.chain.nonce(token, fan.address()).await.unwrap(), U256::zero());
}

#[tokio::test]
async fn test_standard_tokens_park_too() {
    let h = Harness::new().await;
    let owner = wallet("owner");
    let token = h.create_token("Fan Club", "FAN", &owner, units(10)).await;

    let (authorization, signature) = h.transfer_authorization(token, &owner, h.parking, units(10)).await;
    let outcome = h
        .chain
        .submit(
            h.relayer,
            AuthorizedOperation::Deposit {
                parking: h.parking,
                token,
                authorization,
                signature,
            },
        )
        .await
        .unwrap();
    assert_eq!(outcome, OperationOutcome::Done);
    assert_eq!(
        h.chain.parked_balance(h.parking, token, owner.address()).await.unwrap(),
        units(10)
    );
}
