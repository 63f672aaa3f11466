//! The wallet/RPC collaborator seen by the guard.
//!
//! Everything behind [`WalletProvider`] is an opaque external effect: the
//! user's wallet signs and broadcasts, an RPC node reads balances and waits
//! for receipts. The guard never calls it directly; the
//! [`PaymentDriver`](crate::PaymentDriver) does.

use std::fmt;

use async_trait::async_trait;
use basepay_types::{Address, Receipt, TokenAmount, TxHash, WalletSession};
use serde::{Deserialize, Serialize};

use crate::transfer::TransferCall;

/// Why the wallet did not return a transaction hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionError {
    /// The user declined the signing prompt.
    Rejected,
    /// The wallet or RPC errored while signing or broadcasting.
    Wallet(String),
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected => write!(f, "user rejected the request"),
            Self::Wallet(msg) => write!(f, "{msg}"),
        }
    }
}

/// Why a broadcast transaction did not reach a successful receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationError {
    Reverted,
    Dropped,
    Timeout,
    /// The wallet sped up or replaced the transaction; the receipt is for
    /// a different hash than the one signed.
    Replaced,
    Other(String),
}

impl ConfirmationError {
    /// Short reason recorded in `FailureKind::ConfirmationFailed`.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Reverted => "reverted".to_string(),
            Self::Dropped => "dropped".to_string(),
            Self::Timeout => "timeout".to_string(),
            Self::Replaced => "replaced".to_string(),
            Self::Other(msg) => msg.clone(),
        }
    }
}

impl fmt::Display for ConfirmationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason())
    }
}

/// Capability exposed by the wallet adapter and RPC node.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Current connection state. Owned by the wallet; read-only here.
    fn session(&self) -> WalletSession;

    /// Token balance of `owner`, or `None` while the read is pending.
    async fn read_balance(&self, owner: Address) -> Option<TokenAmount>;

    /// Ask the wallet to sign and broadcast `call`.
    async fn submit_transfer(&self, call: &TransferCall) -> Result<TxHash, SubmissionError>;

    /// Wait until `tx` is mined (or dropped).
    async fn await_confirmation(&self, tx: TxHash) -> Result<Receipt, ConfirmationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_reasons() {
        assert_eq!(ConfirmationError::Reverted.reason(), "reverted");
        assert_eq!(ConfirmationError::Dropped.reason(), "dropped");
        assert_eq!(ConfirmationError::Timeout.reason(), "timeout");
        assert_eq!(
            ConfirmationError::Other("nonce too low".into()).to_string(),
            "nonce too low"
        );
    }

    #[test]
    fn submission_error_display() {
        assert_eq!(
            SubmissionError::Rejected.to_string(),
            "user rejected the request"
        );
        assert_eq!(SubmissionError::Wallet("rpc down".into()).to_string(), "rpc down");
    }
}
