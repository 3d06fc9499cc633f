//! FanTicket Types - Canonical domain types for the signed token ledger
//!
//! This crate contains the foundational types shared by every FanTicket
//! crate, with zero dependencies on other fanticket crates:
//!
//! - Identity types (`Address`) and administrative `Role`s
//! - 256-bit `Amount`s
//! - The per-call `CallContext` (caller, block time, chain id, staged events)
//! - Observable `LedgerEvent` records
//! - The `LedgerError` taxonomy
//!
//! # Invariants
//!
//! 1. Balances never go negative: a short balance is an error, never a clamp
//! 2. Every failure aborts the enclosing unit of work
//! 3. Every failure carries a specific reason code

pub mod identity;
pub mod amount;
pub mod role;
pub mod context;
pub mod event;
pub mod error;

pub use identity::*;
pub use amount::*;
pub use role::*;
pub use context::*;
pub use event::*;
pub use error::*;

/// Version string bound into every signing domain
pub const PROTOCOL_VERSION: &str = "1";
