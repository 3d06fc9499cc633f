//! Error types for FanTicket
//!
//! Every failure aborts the enclosing unit of work and names its cause.

use crate::{Address, Amount, Role};
use thiserror::Error;

/// Result type for FanTicket operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// FanTicket error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========================================================================
    // Authorization Errors
    // ========================================================================

    /// Caller lacks the role or capability the operation requires
    #[error("{account} is not authorized: {reason}")]
    Unauthorized { account: Address, reason: String },

    /// Recovered signer does not match the expected signer
    #[error("Invalid signature: recovered {recovered:?}, {expected}")]
    InvalidSignature {
        recovered: Option<Address>,
        expected: String,
    },

    /// Signed authorization passed its deadline
    #[error("Authorization expired: deadline {deadline}, now {now}")]
    Expired { deadline: Amount, now: u64 },

    /// Signed nonce is not the next nonce for the signer
    #[error("Invalid nonce for {signer}: expected {expected}, got {supplied}")]
    InvalidNonce {
        signer: Address,
        expected: Amount,
        supplied: Amount,
    },

    // ========================================================================
    // Balance Errors
    // ========================================================================

    /// Account balance is short
    #[error("Insufficient balance for {account}: required {required}, available {available}")]
    InsufficientBalance {
        account: Address,
        required: Amount,
        available: Amount,
    },

    /// Spender allowance is short
    #[error("Insufficient allowance for {spender} on {owner}: required {required}, available {available}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        required: Amount,
        available: Amount,
    },

    /// Parked record is short
    #[error("Insufficient parked balance of {token} for {account}: required {required}, available {available}")]
    InsufficientParkedBalance {
        token: Address,
        account: Address,
        required: Amount,
        available: Amount,
    },

    // ========================================================================
    // Lifecycle Errors
    // ========================================================================

    /// Factory already created a token with this symbol
    #[error("Symbol {symbol} already taken")]
    SymbolTaken { symbol: String },

    /// Token initializer was already run
    #[error("Token {token} already initialized")]
    AlreadyInitialized { token: Address },

    /// Direct mint on a cross-domain token
    #[error("Direct mint disabled on token {token}")]
    MintDisabled { token: Address },

    // ========================================================================
    // Substrate Errors
    // ========================================================================

    /// No instance lives at the address
    #[error("No {kind} deployed at {address}")]
    UnknownContract { kind: String, address: Address },

    /// An instance already lives at the address
    #[error("Address {address} already occupied")]
    AddressOccupied { address: Address },

    /// Checked arithmetic overflowed
    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    /// Malformed argument
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// A clearing batch was rejected at the given order
    #[error("Batch rejected at order {index}: {source}")]
    BatchFailed {
        index: usize,
        #[source]
        source: Box<LedgerError>,
    },
}

impl LedgerError {
    pub fn unauthorized(account: Address, reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            account,
            reason: reason.into(),
        }
    }

    pub fn missing_role(account: Address, role: Role) -> Self {
        Self::Unauthorized {
            account,
            reason: format!("missing role {}", role),
        }
    }

    pub fn invalid_signature(recovered: Option<Address>, expected: impl Into<String>) -> Self {
        Self::InvalidSignature {
            recovered,
            expected: expected.into(),
        }
    }

    pub fn unknown_contract(kind: impl Into<String>, address: Address) -> Self {
        Self::UnknownContract {
            kind: kind.into(),
            address,
        }
    }

    pub fn overflow(context: impl Into<String>) -> Self {
        Self::Overflow {
            context: context.into(),
        }
    }

    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn batch_failed(index: usize, source: LedgerError) -> Self {
        Self::BatchFailed {
            index,
            source: Box::new(source),
        }
    }

    /// Stable reason code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::InvalidSignature { .. } => "INVALID_SIGNATURE",
            Self::Expired { .. } => "EXPIRED",
            Self::InvalidNonce { .. } => "INVALID_NONCE",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::InsufficientAllowance { .. } => "INSUFFICIENT_ALLOWANCE",
            Self::InsufficientParkedBalance { .. } => "INSUFFICIENT_PARKED_BALANCE",
            Self::SymbolTaken { .. } => "SYMBOL_TAKEN",
            Self::AlreadyInitialized { .. } => "ALREADY_INITIALIZED",
            Self::MintDisabled { .. } => "MINT_DISABLED",
            Self::UnknownContract { .. } => "UNKNOWN_CONTRACT",
            Self::AddressOccupied { .. } => "ADDRESS_OCCUPIED",
            Self::Overflow { .. } => "OVERFLOW",
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::BatchFailed { .. } => "BATCH_FAILED",
        }
    }

    /// Whether resubmitting with a fresh nonce or deadline can succeed
    pub fn is_resubmittable(&self) -> bool {
        match self {
            Self::Expired { .. } | Self::InvalidNonce { .. } => true,
            Self::BatchFailed { source, .. } => source.is_resubmittable(),
            _ => false,
        }
    }

    /// The innermost error, looking through batch wrappers
    pub fn root_cause(&self) -> &LedgerError {
        match self {
            Self::BatchFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
