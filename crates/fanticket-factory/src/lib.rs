//! FanTicket Factory - Token creation
//!
//! A factory deploys token instances on the strength of creation permits
//! signed by a network admin of its role registry. Every instance lands at
//! an address derived from the factory, the (name, symbol) pair and the
//! token variant, so clients can compute it before the token exists.
//!
//! Two factory kinds exist: one for locally issued tokens and one for
//! bridged representations of tokens living on another chain.

pub mod addressing;
pub mod permit;
pub mod factory;

pub use addressing::*;
pub use permit::*;
pub use factory::*;
