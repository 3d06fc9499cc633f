//! Per-call execution context
//!
//! A `CallContext` carries who is calling, the block time the call executes
//! at, the chain id bound into signing domains and the events staged by the
//! call. Events only reach the committed log when the enclosing unit of work
//! commits.

use crate::{Address, LedgerEvent};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Chain identifier bound into every signing domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainId(pub u64);

impl ChainId {
    /// Local development chain id
    pub const LOCAL: ChainId = ChainId(31337);
}

impl Default for ChainId {
    fn default() -> Self {
        Self::LOCAL
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct CallContext {
    caller: Address,
    timestamp: u64,
    chain_id: ChainId,
    events: Vec<LedgerEvent>,
}

impl CallContext {
    pub fn new(caller: Address, timestamp: u64, chain_id: ChainId) -> Self {
        Self {
            caller,
            timestamp,
            chain_id,
            events: Vec::new(),
        }
    }

    pub fn caller(&self) -> Address {
        self.caller
    }

    /// Block time in seconds
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Position to rewind to if a nested step fails
    pub fn event_mark(&self) -> usize {
        self.events.len()
    }

    /// Drop every event staged after `mark`
    pub fn rewind_events(&mut self, mark: usize) {
        self.events.truncate(mark);
    }

    pub fn into_events(self) -> Vec<LedgerEvent> {
        self.events
    }

    /// Run `f` with `caller` as the immediate caller, as when one instance
    /// calls into another. Events staged by `f` stay in this context.
    pub fn call_as<T>(&mut self, caller: Address, f: impl FnOnce(&mut CallContext) -> T) -> T {
        let outer = std::mem::replace(&mut self.caller, caller);
        let out = f(self);
        self.caller = outer;
        out
    }
}
