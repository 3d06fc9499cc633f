//! FanTicket Clearing - Batch settlement of signed orders
//!
//! A clearing agent collects independently signed transfer and mint orders
//! off-line and submits them as one batch. The batch is all-or-nothing:
//! orders apply in sequence against a staging buffer, and only a batch in
//! which every order succeeded is written back to the token ledgers.
//!
//! `ClearingHouse::simulate` runs the same sequence against a throw-away
//! buffer and reports every order's outcome, so agents can pre-validate a
//! batch before submitting it.

pub mod order;
pub mod staging;
pub mod house;

pub use order::*;
pub use staging::*;
pub use house::*;
