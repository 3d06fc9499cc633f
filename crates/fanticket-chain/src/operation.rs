//! Uniform dispatch for signature-authorized operations
//!
//! Every signed operation a relayer can submit is one variant of
//! `AuthorizedOperation`. Each variant resolves its target instance, runs
//! the target's verify-then-apply path and reports what it produced.

use crate::state::Ledgers;
use fanticket_crypto::Signature;
use fanticket_factory::{CreationPermit, InterChainCreationPermit};
use fanticket_ledger::{MintAuthorization, PermitAuthorization, TransferAuthorization};
use fanticket_parking::WithdrawAuthorization;
use fanticket_types::{Address, CallContext, Result};
use serde::{Deserialize, Serialize};

/// A signed operation together with the instance it targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AuthorizedOperation {
    Transfer {
        token: Address,
        authorization: TransferAuthorization,
        signature: Signature,
    },
    Mint {
        token: Address,
        authorization: MintAuthorization,
        signature: Signature,
    },
    Permit {
        token: Address,
        authorization: PermitAuthorization,
        signature: Signature,
    },
    Create {
        factory: Address,
        permit: CreationPermit,
        signature: Signature,
    },
    CreateInterChain {
        factory: Address,
        permit: InterChainCreationPermit,
        signature: Signature,
    },
    Deposit {
        parking: Address,
        token: Address,
        authorization: TransferAuthorization,
        signature: Signature,
    },
    Withdraw {
        parking: Address,
        authorization: WithdrawAuthorization,
        signature: Signature,
    },
}

/// What a successfully applied operation produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationOutcome {
    Done,
    Created(Address),
}

impl OperationOutcome {
    /// Address of the instance a creation produced
    pub fn created(&self) -> Option<Address> {
        match self {
            OperationOutcome::Created(address) => Some(*address),
            OperationOutcome::Done => None,
        }
    }
}

impl AuthorizedOperation {
    pub fn name(&self) -> &'static str {
        match self {
            AuthorizedOperation::Transfer { .. } => "transfer",
            AuthorizedOperation::Mint { .. } => "mint",
            AuthorizedOperation::Permit { .. } => "permit",
            AuthorizedOperation::Create { .. } => "create",
            AuthorizedOperation::CreateInterChain { .. } => "create_inter_chain",
            AuthorizedOperation::Deposit { .. } => "deposit",
            AuthorizedOperation::Withdraw { .. } => "withdraw",
        }
    }

    /// The instance the operation is addressed to
    pub fn target(&self) -> Address {
        match self {
            AuthorizedOperation::Transfer { token, .. }
            | AuthorizedOperation::Mint { token, .. }
            | AuthorizedOperation::Permit { token, .. } => *token,
            AuthorizedOperation::Create { factory, .. }
            | AuthorizedOperation::CreateInterChain { factory, .. } => *factory,
            AuthorizedOperation::Deposit { parking, .. }
            | AuthorizedOperation::Withdraw { parking, .. } => *parking,
        }
    }

    /// Verify and apply against `ledgers`.
    ///
    /// Partial effects on failure are left for the enclosing unit of work
    /// to discard.
    pub fn apply(&self, ledgers: &mut Ledgers, ctx: &mut CallContext) -> Result<OperationOutcome> {
        match self {
            AuthorizedOperation::Transfer {
                token,
                authorization,
                signature,
            } => {
                ledgers
                    .tokens
                    .get_mut(token)?
                    .transfer_from_by_sig(ctx, authorization, signature)?;
            }
            AuthorizedOperation::Mint {
                token,
                authorization,
                signature,
            } => {
                let ledger = ledgers.tokens.get_mut(token)?;
                let registry = ledgers.registries.get(&ledger.registry())?;
                ledger.mint_by_sig(ctx, registry, authorization, signature)?;
            }
            AuthorizedOperation::Permit {
                token,
                authorization,
                signature,
            } => {
                ledgers
                    .tokens
                    .get_mut(token)?
                    .permit(ctx, authorization, signature)?;
            }
            AuthorizedOperation::Create {
                factory,
                permit,
                signature,
            } => {
                let factory = ledgers.factories.get_mut(factory)?;
                let registry = ledgers.registries.get(&factory.registry())?;
                let token = factory.new_token(ctx, registry, &mut ledgers.tokens, permit, signature)?;
                return Ok(OperationOutcome::Created(token));
            }
            AuthorizedOperation::CreateInterChain {
                factory,
                permit,
                signature,
            } => {
                let factory = ledgers.factories.get_mut(factory)?;
                let registry = ledgers.registries.get(&factory.registry())?;
                let token =
                    factory.new_inter_chain_token(ctx, registry, &mut ledgers.tokens, permit, signature)?;
                return Ok(OperationOutcome::Created(token));
            }
            AuthorizedOperation::Deposit {
                parking,
                token,
                authorization,
                signature,
            } => {
                ledgers.parkings.get_mut(parking)?.deposit(
                    ctx,
                    &mut ledgers.tokens,
                    *token,
                    authorization,
                    signature,
                )?;
            }
            AuthorizedOperation::Withdraw {
                parking,
                authorization,
                signature,
            } => {
                let parking = ledgers.parkings.get_mut(parking)?;
                let registry = ledgers.registries.get(&parking.registry())?;
                parking.withdraw(ctx, registry, &mut ledgers.tokens, authorization, signature)?;
            }
        }
        Ok(OperationOutcome::Done)
    }
}
