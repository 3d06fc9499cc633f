//! FanTicket Ledger - Fungible token instances
//!
//! Each `TokenLedger` is one token: balances, allowances, total supply and a
//! per-signer nonce sequence. Besides the classic direct and allowance paths
//! it accepts three signed payloads, all verified under the token's own
//! signing domain:
//!
//! - `TransferAuthorization`: move funds out of the signer, no allowance step
//! - `MintAuthorization`: mint by the minter (standard) or a network admin
//!   (bridged)
//! - `PermitAuthorization`: set an allowance without the owner sending a call
//!
//! # Invariants
//!
//! 1. No negative balances
//! 2. Supply equals the sum of balances
//! 3. Nonces form an exact sequence per (token, signer)

pub mod payload;
pub mod token;
pub mod arena;

pub use payload::*;
pub use token::*;
pub use arena::*;
