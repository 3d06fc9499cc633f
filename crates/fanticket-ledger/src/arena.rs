//! Every deployed token instance, keyed by address

use crate::TokenLedger;
use fanticket_types::{Address, LedgerError, Result};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct TokenArena {
    tokens: BTreeMap<Address, TokenLedger>,
}

impl TokenArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a freshly deployed instance; the address must be free
    pub fn deploy(&mut self, token: TokenLedger) -> Result<&mut TokenLedger> {
        let address = token.address();
        if self.tokens.contains_key(&address) {
            return Err(LedgerError::AddressOccupied { address });
        }
        Ok(self.tokens.entry(address).or_insert(token))
    }

    pub fn get(&self, address: &Address) -> Result<&TokenLedger> {
        self.tokens
            .get(address)
            .ok_or_else(|| LedgerError::unknown_contract("token", *address))
    }

    pub fn get_mut(&mut self, address: &Address) -> Result<&mut TokenLedger> {
        self.tokens
            .get_mut(address)
            .ok_or_else(|| LedgerError::unknown_contract("token", *address))
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.tokens.contains_key(address)
    }

    /// Replace the instance at its own address
    pub fn put(&mut self, token: TokenLedger) {
        self.tokens.insert(token.address(), token);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TokenLedger> {
        self.tokens.values()
    }
}
