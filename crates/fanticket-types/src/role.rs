//! Administrative roles
//!
//! A role is a 32-byte identifier. The default-admin role is all zeroes and
//! administers every other role; named roles are the keccak-256 of their name.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;

/// A 32-byte role identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Role(pub [u8; 32]);

impl Role {
    /// Bootstrap role; administers every role
    pub const DEFAULT_ADMIN: Role = Role([0u8; 32]);

    /// Role id for a name: `keccak256(name)`
    pub fn named(name: &str) -> Self {
        let digest = Keccak256::digest(name.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// The network-admin role that signs creation permits, bridge mints and
    /// withdrawal countersignatures
    pub fn network_admin() -> Self {
        Self::named("NETWORK_ADMIN_ROLE")
    }

    pub fn is_default_admin(&self) -> bool {
        *self == Self::DEFAULT_ADMIN
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default_admin() {
            write!(f, "DEFAULT_ADMIN")
        } else {
            write!(f, "0x{}", hex::encode(self.0))
        }
    }
}

impl fmt::Debug for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Role({})", self)
    }
}
