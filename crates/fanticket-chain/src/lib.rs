//! FanTicket Chain - Execution substrate
//!
//! Hosts every registry, token, factory, clearing house and parking ledger
//! of one chain and gives clients an async `Chain` handle over them. All
//! mutations are serialized behind one write lock and run as atomic units
//! of work: a failed call, or a failed clearing batch, leaves no trace in
//! balances, nonces or the event log.
//!
//! # Example
//!
//! ```ignore
//! let chain = Chain::new(&ChainConfig::load(None)?.chain);
//! let registry = chain.deploy_registry(admin.address()).await?;
//! let factory = chain.deploy_factory(admin.address(), FactoryKind::Standard, registry).await?;
//! let predicted = chain.compute_address(factory, "Fan Club", "FAN").await?;
//! ```

pub mod chain;
pub mod config;
pub mod operation;
pub mod state;
pub mod telemetry;

pub use chain::Chain;
pub use config::{ChainConfig, ChainSettings, LogFormat, LoggingConfig};
pub use operation::{AuthorizedOperation, OperationOutcome};
pub use state::{Clock, Ledgers, WorldState};
pub use telemetry::init_tracing;
