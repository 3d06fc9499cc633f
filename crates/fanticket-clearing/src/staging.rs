//! Clone-on-first-touch staging over the token arena
//!
//! A batch mutates private copies of the tokens it touches. The copies are
//! written back only by `commit`; dropping the buffer discards them.

use fanticket_ledger::{TokenArena, TokenLedger};
use fanticket_types::{Address, LedgerError, Result};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct StagedArena {
    staged: BTreeMap<Address, TokenLedger>,
}

impl StagedArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Staged copy of `address`, cloned from `base` on first touch
    pub fn token_mut(&mut self, base: &TokenArena, address: &Address) -> Result<&mut TokenLedger> {
        if !self.staged.contains_key(address) {
            let copy = base.get(address)?.clone();
            self.staged.insert(*address, copy);
        }
        self.staged
            .get_mut(address)
            .ok_or_else(|| LedgerError::unknown_contract("token", *address))
    }

    /// Addresses of every token the batch touched
    pub fn touched(&self) -> Vec<Address> {
        self.staged.keys().copied().collect()
    }

    /// Write every staged copy back to `base`
    pub fn commit(self, base: &mut TokenArena) {
        for token in self.staged.into_values() {
            base.put(token);
        }
    }
}
