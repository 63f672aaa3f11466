//! Error types for basepay.
//!
//! All errors use the `BP_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Guard admission errors
//! - 2xx: Balance errors
//! - 3xx: Signing / submission errors
//! - 4xx: Confirmation errors
//! - 5xx: Parsing errors (amounts, addresses, hashes)
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{FailureKind, TokenAmount};

/// Central error enum for all basepay operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BasepayError {
    // =================================================================
    // Guard Admission Errors (1xx)
    // =================================================================
    /// The wallet is not connected or reports no address.
    #[error("BP_ERR_100: Wallet not connected")]
    NotConnected,

    /// The guard already owns an intent (in flight or awaiting reset).
    #[error("BP_ERR_101: A payment is already in progress")]
    AlreadyInProgress,

    /// `reset` was called while a transaction is still in flight.
    #[error("BP_ERR_102: Cannot reset while a payment is in flight")]
    ResetWhileInFlight,

    // =================================================================
    // Balance Errors (2xx)
    // =================================================================
    /// The last balance snapshot is below the requested amount.
    #[error("BP_ERR_200: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance {
        needed: TokenAmount,
        available: TokenAmount,
    },

    /// No balance snapshot is available yet for the connected address.
    #[error("BP_ERR_201: Balance unknown; retry after the balance read completes")]
    BalanceUnknown,

    // =================================================================
    // Signing Errors (3xx)
    // =================================================================
    /// The user rejected the signature request.
    #[error("BP_ERR_300: Signature rejected by user")]
    SignatureRejected,

    /// The wallet failed to sign or broadcast the transfer.
    #[error("BP_ERR_301: Wallet error: {0}")]
    WalletError(String),

    // =================================================================
    // Confirmation Errors (4xx)
    // =================================================================
    /// The submitted transaction was reverted, dropped, or timed out.
    #[error("BP_ERR_400: Confirmation failed: {reason}")]
    ConfirmationFailed { reason: String },

    // =================================================================
    // Parsing Errors (5xx)
    // =================================================================
    /// A token amount was negative, too precise, or out of range.
    #[error("BP_ERR_500: Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// An EVM address failed to parse.
    #[error("BP_ERR_501: Invalid address: {reason}")]
    InvalidAddress { reason: String },

    /// A transaction hash failed to parse.
    #[error("BP_ERR_502: Invalid transaction hash: {reason}")]
    InvalidTxHash { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("BP_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("BP_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config document, bad values).
    #[error("BP_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

impl BasepayError {
    /// Whether the caller may simply retry the same request later.
    ///
    /// Every other error requires the guard to be reset first.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::AlreadyInProgress | Self::BalanceUnknown)
    }
}

impl From<FailureKind> for BasepayError {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::SignatureRejected => Self::SignatureRejected,
            FailureKind::WalletError(msg) => Self::WalletError(msg),
            FailureKind::ConfirmationFailed(reason) => Self::ConfirmationFailed { reason },
        }
    }
}

impl From<serde_json::Error> for BasepayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, BasepayError>;
