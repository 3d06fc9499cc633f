//! FanTicket Registry - Administrative roles
//!
//! A `RoleRegistry` holds role membership for one deployment. Its deployer
//! starts with the default-admin and network-admin roles; every role is
//! administered by the default-admin role.
//!
//! Other components consult the registry in two ways: directly through
//! `require_role`, or as an expected-signer policy through `gate`, which
//! admits any signer currently holding the role.

use fanticket_crypto::SignerPolicy;
use fanticket_types::{Address, CallContext, LedgerError, LedgerEvent, Result, Role};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

#[derive(Debug, Clone)]
pub struct RoleRegistry {
    address: Address,
    members: BTreeMap<Role, BTreeSet<Address>>,
}

impl RoleRegistry {
    /// Deploy at `address`; the caller becomes default admin and network admin
    pub fn deploy(ctx: &mut CallContext, address: Address) -> Self {
        let mut registry = Self {
            address,
            members: BTreeMap::new(),
        };
        let deployer = ctx.caller();
        registry.insert_member(ctx, Role::DEFAULT_ADMIN, deployer);
        registry.insert_member(ctx, Role::network_admin(), deployer);
        info!(registry = %address, %deployer, "Role registry deployed");
        registry
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn has_role(&self, role: Role, account: Address) -> bool {
        self.members
            .get(&role)
            .map(|set| set.contains(&account))
            .unwrap_or(false)
    }

    /// The role whose holders may grant and revoke `role`
    pub fn role_admin(&self, _role: Role) -> Role {
        Role::DEFAULT_ADMIN
    }

    /// Members of `role` in address order
    pub fn members(&self, role: Role) -> Vec<Address> {
        self.members
            .get(&role)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn require_role(&self, role: Role, account: Address) -> Result<()> {
        if self.has_role(role, account) {
            Ok(())
        } else {
            Err(LedgerError::missing_role(account, role))
        }
    }

    /// Grant `role` to `account`. Returns whether membership changed.
    pub fn grant_role(&mut self, ctx: &mut CallContext, role: Role, account: Address) -> Result<bool> {
        self.require_role(self.role_admin(role), ctx.caller())?;
        let changed = self.insert_member(ctx, role, account);
        if changed {
            info!(registry = %self.address, %role, %account, "Role granted");
        }
        Ok(changed)
    }

    /// Revoke `role` from `account`. Returns whether membership changed.
    pub fn revoke_role(&mut self, ctx: &mut CallContext, role: Role, account: Address) -> Result<bool> {
        self.require_role(self.role_admin(role), ctx.caller())?;
        Ok(self.remove_member(ctx, role, account))
    }

    /// Drop `role` from the caller; `account` must be the caller
    pub fn renounce_role(&mut self, ctx: &mut CallContext, role: Role, account: Address) -> Result<bool> {
        if account != ctx.caller() {
            return Err(LedgerError::unauthorized(
                ctx.caller(),
                "can only renounce roles for self",
            ));
        }
        Ok(self.remove_member(ctx, role, account))
    }

    /// Signer policy admitting current holders of `role`
    pub fn gate(&self, role: Role) -> RoleGate<'_> {
        RoleGate {
            registry: self,
            role,
        }
    }

    fn insert_member(&mut self, ctx: &mut CallContext, role: Role, account: Address) -> bool {
        let inserted = self.members.entry(role).or_default().insert(account);
        if inserted {
            ctx.emit(LedgerEvent::RoleGranted {
                registry: self.address,
                role,
                account,
                sender: ctx.caller(),
            });
        }
        inserted
    }

    fn remove_member(&mut self, ctx: &mut CallContext, role: Role, account: Address) -> bool {
        let removed = self
            .members
            .get_mut(&role)
            .map(|set| set.remove(&account))
            .unwrap_or(false);
        if removed {
            info!(registry = %self.address, %role, %account, "Role revoked");
            ctx.emit(LedgerEvent::RoleRevoked {
                registry: self.address,
                role,
                account,
                sender: ctx.caller(),
            });
        }
        removed
    }
}

/// Admits signers holding one role in one registry
#[derive(Debug, Clone, Copy)]
pub struct RoleGate<'a> {
    registry: &'a RoleRegistry,
    role: Role,
}

impl SignerPolicy for RoleGate<'_> {
    fn admits(&self, signer: &Address) -> bool {
        self.registry.has_role(self.role, *signer)
    }

    fn describe(&self) -> String {
        format!("holder of role {} in registry {}", self.role, self.registry.address)
    }
}

/// All deployed registries, keyed by address
#[derive(Debug, Clone, Default)]
pub struct Registries {
    registries: BTreeMap<Address, RoleRegistry>,
}

impl Registries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, registry: RoleRegistry) -> Result<()> {
        let address = registry.address();
        if self.registries.contains_key(&address) {
            return Err(LedgerError::AddressOccupied { address });
        }
        self.registries.insert(address, registry);
        Ok(())
    }

    pub fn get(&self, address: &Address) -> Result<&RoleRegistry> {
        self.registries
            .get(address)
            .ok_or_else(|| LedgerError::unknown_contract("role registry", *address))
    }

    pub fn get_mut(&mut self, address: &Address) -> Result<&mut RoleRegistry> {
        self.registries
            .get_mut(address)
            .ok_or_else(|| LedgerError::unknown_contract("role registry", *address))
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.registries.contains_key(address)
    }
}
