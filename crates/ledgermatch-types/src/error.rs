//! Error types for the LedgerMatch agent.
//!
//! All errors use the `LM_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Order / view errors
//! - 5xx: Matching errors
//! - 6xx: Execution errors
//! - 7xx: Ledger transport errors
//! - 8xx: Credential errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::OrderId;

/// Central error enum for all LedgerMatch operations.
#[derive(Debug, Error)]
pub enum LedgerMatchError {
    // =================================================================
    // Order Errors (1xx)
    // =================================================================
    /// The order view failed validation (missing fields, bad values, etc.).
    #[error("LM_ERR_100: Invalid order: {reason}")]
    InvalidOrder { reason: String },

    /// The side string was neither buy nor sell.
    #[error("LM_ERR_101: Invalid side: {0:?}")]
    InvalidSide(String),

    /// A price arrived with a zero denominator.
    #[error("LM_ERR_102: Price {num}/0 has a zero denominator")]
    ZeroDenominator { num: u128 },

    // =================================================================
    // Matching Errors (5xx)
    // =================================================================
    /// An exact amount does not fit the ledger's 128-bit integers.
    #[error("LM_ERR_500: Arithmetic overflow: {context}")]
    ArithmeticOverflow { context: String },

    /// The match violates a limit the ledger enforces on execution.
    #[error("LM_ERR_501: Execution limit violated: {reason}")]
    LimitViolation { reason: String },

    /// An order named by a match is missing from the mirror.
    #[error("LM_ERR_502: Order not in mirror: {0}")]
    OrderNotFound(OrderId),

    // =================================================================
    // Execution Errors (6xx)
    // =================================================================
    /// The ledger rejected the execution call.
    #[error("LM_ERR_600: Execution rejected: {reason}")]
    SubmissionRejected { reason: String },

    /// The same match was already submitted within the quarantine window.
    #[error("LM_ERR_601: Duplicate submission quarantined: {fingerprint}")]
    DuplicateSubmission { fingerprint: String },

    // =================================================================
    // Ledger Transport Errors (7xx)
    // =================================================================
    /// HTTP / connection failure talking to the ledger node.
    #[error("LM_ERR_700: Transport error: {0}")]
    Transport(String),

    /// The JSON-RPC endpoint answered with an error object.
    #[error("LM_ERR_701: RPC error {name}: {message}")]
    Rpc { name: String, message: String },

    /// A ledger response could not be decoded.
    #[error("LM_ERR_702: Decode error: {0}")]
    Decode(String),

    // =================================================================
    // Credential Errors (8xx)
    // =================================================================
    /// Signing key missing, malformed, or not registered for the account.
    #[error("LM_ERR_800: Credential error: {0}")]
    Credentials(String),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("LM_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("LM_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (missing fields, invalid values, etc.).
    #[error("LM_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

impl LedgerMatchError {
    /// `true` for failures that may clear up on their own (network, node
    /// hiccups). Logged alongside the error; the loop treats every kind the
    /// same way.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
            || matches!(self, Self::Rpc { name, .. } if name.contains("TIMEOUT") || name == "HANDLER_ERROR")
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, LedgerMatchError>;
