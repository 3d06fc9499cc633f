//! The clearing house

use crate::order::{OrderKind, TransactionOrder};
use crate::staging::StagedArena;
use fanticket_ledger::TokenArena;
use fanticket_registry::Registries;
use fanticket_types::{Address, CallContext, LedgerError, LedgerEvent, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};
use uuid::Uuid;

/// Summary of a settled batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearingReport {
    pub batch_id: Uuid,
    pub orders: usize,
    pub tokens_touched: Vec<Address>,
}

/// Dry-run result of one order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderOutcome {
    pub index: usize,
    pub token: Address,
    pub kind: OrderKind,
    pub error: Option<LedgerError>,
}

impl OrderOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct ClearingHouse {
    address: Address,
    settled_batches: u64,
    settled_orders: u64,
}

impl ClearingHouse {
    pub fn deploy(address: Address) -> Self {
        info!(house = %address, "Clearing house deployed");
        Self {
            address,
            settled_batches: 0,
            settled_orders: 0,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn settled_batches(&self) -> u64 {
        self.settled_batches
    }

    pub fn settled_orders(&self) -> u64 {
        self.settled_orders
    }

    /// Settle a batch all-or-nothing.
    ///
    /// On failure nothing is written and the error names the first failing
    /// order's index and reason.
    pub fn settle(
        &mut self,
        ctx: &mut CallContext,
        tokens: &mut TokenArena,
        registries: &Registries,
        orders: &[TransactionOrder],
    ) -> Result<ClearingReport> {
        let mark = ctx.event_mark();
        let mut staged = StagedArena::new();

        for (index, order) in orders.iter().enumerate() {
            if let Err(e) = self.apply(ctx, tokens, registries, &mut staged, order) {
                ctx.rewind_events(mark);
                warn!(
                    house = %self.address,
                    index,
                    code = e.error_code(),
                    error = %e,
                    "Batch rejected"
                );
                return Err(LedgerError::batch_failed(index, e));
            }
        }

        let report = ClearingReport {
            batch_id: Uuid::new_v4(),
            orders: orders.len(),
            tokens_touched: staged.touched(),
        };
        staged.commit(tokens);

        if !orders.is_empty() {
            self.settled_batches += 1;
            self.settled_orders += orders.len() as u64;
            ctx.emit(LedgerEvent::OrdersCleared {
                house: self.address,
                batch_id: report.batch_id,
                orders: report.orders,
            });
            info!(
                house = %self.address,
                batch_id = %report.batch_id,
                orders = report.orders,
                tokens = report.tokens_touched.len(),
                "Batch settled"
            );
        }
        Ok(report)
    }

    /// Run a batch without committing anything and report each order.
    ///
    /// Orders after a failing one still run, against the state left by the
    /// orders that succeeded.
    pub fn simulate(
        &self,
        ctx: &CallContext,
        tokens: &TokenArena,
        registries: &Registries,
        orders: &[TransactionOrder],
    ) -> Vec<OrderOutcome> {
        let mut scratch = CallContext::new(ctx.caller(), ctx.timestamp(), ctx.chain_id());
        let mut staged = StagedArena::new();
        let mut outcomes = Vec::with_capacity(orders.len());

        for (index, order) in orders.iter().enumerate() {
            let mut trial = staged.clone();
            let error = match self.apply(&mut scratch, tokens, registries, &mut trial, order) {
                Ok(()) => {
                    staged = trial;
                    None
                }
                Err(e) => Some(e),
            };
            outcomes.push(OrderOutcome {
                index,
                token: order.token,
                kind: order.kind,
                error,
            });
        }
        outcomes
    }

    fn apply(
        &self,
        ctx: &mut CallContext,
        tokens: &TokenArena,
        registries: &Registries,
        staged: &mut StagedArena,
        order: &TransactionOrder,
    ) -> Result<()> {
        let token = staged.token_mut(tokens, &order.token)?;
        match order.kind {
            OrderKind::Transfer => {
                let auth = order.transfer_authorization();
                ctx.call_as(self.address, |c| {
                    token.transfer_from_by_sig(c, &auth, &order.signature)
                })
            }
            OrderKind::Mint => {
                let registry = registries.get(&token.registry())?;
                let auth = order.mint_authorization();
                ctx.call_as(self.address, |c| {
                    token.mint_by_sig(c, registry, &auth, &order.signature)
                })
            }
        }
    }
}

/// Every deployed clearing house, keyed by address
#[derive(Debug, Clone, Default)]
pub struct ClearingHouses {
    houses: BTreeMap<Address, ClearingHouse>,
}

impl ClearingHouses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, house: ClearingHouse) -> Result<()> {
        let address = house.address();
        if self.houses.contains_key(&address) {
            return Err(LedgerError::AddressOccupied { address });
        }
        self.houses.insert(address, house);
        Ok(())
    }

    pub fn get(&self, address: &Address) -> Result<&ClearingHouse> {
        self.houses
            .get(address)
            .ok_or_else(|| LedgerError::unknown_contract("clearing house", *address))
    }

    pub fn get_mut(&mut self, address: &Address) -> Result<&mut ClearingHouse> {
        self.houses
            .get_mut(address)
            .ok_or_else(|| LedgerError::unknown_contract("clearing house", *address))
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.houses.contains_key(address)
    }
}
