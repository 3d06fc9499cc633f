//! World state and the atomic unit of work
//!
//! `WorldState::transact` is the only way to mutate instances. It runs a
//! closure against the live `Ledgers`, keeps the result on success and puts
//! the pre-call snapshot back on failure. Events staged by the call reach
//! the committed log only on success.

use fanticket_clearing::ClearingHouses;
use fanticket_factory::{create_address, Factories};
use fanticket_ledger::TokenArena;
use fanticket_parking::Parkings;
use fanticket_registry::Registries;
use fanticket_types::{Address, CallContext, ChainId, LedgerError, LedgerEvent, Result};
use std::collections::BTreeMap;
use tracing::debug;

/// Every deployed instance, one arena per kind
#[derive(Debug, Clone, Default)]
pub struct Ledgers {
    pub registries: Registries,
    pub tokens: TokenArena,
    pub factories: Factories,
    pub parkings: Parkings,
    pub houses: ClearingHouses,
    deploy_counts: BTreeMap<Address, u64>,
}

impl Ledgers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address of `deployer`'s next plain deployment; consumes one slot
    pub fn next_address(&mut self, deployer: Address) -> Result<Address> {
        let count = self.deploy_counts.entry(deployer).or_insert(0);
        let address = create_address(&deployer, *count);
        *count = count
            .checked_add(1)
            .ok_or_else(|| LedgerError::overflow("deployment count"))?;
        Ok(address)
    }

    pub fn deploy_count(&self, deployer: &Address) -> u64 {
        self.deploy_counts.get(deployer).copied().unwrap_or(0)
    }
}

/// Block clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    /// Wall-clock time plus an accumulated skew
    Wall { skew: u64 },
    /// Pinned time
    Fixed(u64),
}

impl Clock {
    pub fn now(&self) -> u64 {
        match *self {
            Clock::Wall { skew } => {
                let wall = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0);
                wall.saturating_add(skew)
            }
            Clock::Fixed(ts) => ts,
        }
    }

    pub fn advance(&mut self, seconds: u64) {
        match self {
            Clock::Wall { skew } => *skew = skew.saturating_add(seconds),
            Clock::Fixed(ts) => *ts = ts.saturating_add(seconds),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorldState {
    pub ledgers: Ledgers,
    events: Vec<LedgerEvent>,
    chain_id: ChainId,
    clock: Clock,
}

impl WorldState {
    pub fn new(chain_id: ChainId, clock: Clock) -> Self {
        Self {
            ledgers: Ledgers::new(),
            events: Vec::new(),
            chain_id,
            clock,
        }
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Committed events, oldest first
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// A call context for `caller` at the current block time
    pub fn context(&self, caller: Address) -> CallContext {
        CallContext::new(caller, self.now(), self.chain_id)
    }

    /// Run `f` as one all-or-nothing unit of work
    pub fn transact<T>(
        &mut self,
        caller: Address,
        f: impl FnOnce(&mut Ledgers, &mut CallContext) -> Result<T>,
    ) -> Result<T> {
        let mut ctx = self.context(caller);
        let snapshot = self.ledgers.clone();

        match f(&mut self.ledgers, &mut ctx) {
            Ok(out) => {
                let staged = ctx.into_events();
                debug!(%caller, events = staged.len(), "Committed");
                self.events.extend(staged);
                Ok(out)
            }
            Err(e) => {
                self.ledgers = snapshot;
                debug!(%caller, code = e.error_code(), "Rolled back");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanticket_registry::RoleRegistry;
    use fanticket_types::Role;

    fn addr(byte: u8) -> Address {
        Address::new([byte; 20])
    }

    #[test]
    fn test_next_address_advances() {
        let mut ledgers = Ledgers::new();
        let first = ledgers.next_address(addr(1)).unwrap();
        let second = ledgers.next_address(addr(1)).unwrap();
        let other = ledgers.next_address(addr(2)).unwrap();
        assert_ne!(first, second);
        assert_ne!(first, other);
        assert_eq!(first, create_address(&addr(1), 0));
        assert_eq!(ledgers.deploy_count(&addr(1)), 2);
    }

    #[test]
    fn test_fixed_clock_advances() {
        let mut clock = Clock::Fixed(100);
        clock.advance(5);
        assert_eq!(clock.now(), 105);

        let mut wall = Clock::Wall { skew: 0 };
        let before = wall.now();
        wall.advance(3600);
        assert!(wall.now() >= before + 3600);
    }

    #[test]
    fn test_transact_commits_events() {
        let mut world = WorldState::new(ChainId::LOCAL, Clock::Fixed(1));
        let address = world
            .transact(addr(1), |ledgers, ctx| {
                let at = ledgers.next_address(ctx.caller())?;
                ledgers.registries.insert(RoleRegistry::deploy(ctx, at))?;
                Ok(at)
            })
            .unwrap();

        assert!(world.ledgers.registries.contains(&address));
        assert_eq!(world.events().len(), 2);
    }

    #[test]
    fn test_transact_rolls_back() {
        let mut world = WorldState::new(ChainId::LOCAL, Clock::Fixed(1));
        let err = world
            .transact(addr(1), |ledgers, ctx| {
                let at = ledgers.next_address(ctx.caller())?;
                ledgers.registries.insert(RoleRegistry::deploy(ctx, at))?;
                ledgers
                    .registries
                    .get_mut(&at)?
                    .grant_role(ctx, Role::named("MINTER"), addr(3))?;
                Err::<(), _>(LedgerError::invalid_input("test", "abort"))
            })
            .unwrap_err();

        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(world.events().is_empty());
        assert_eq!(world.ledgers.deploy_count(&addr(1)), 0);
        assert!(world.ledgers.registries.get(&create_address(&addr(1), 0)).is_err());
    }
}
