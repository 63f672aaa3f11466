//! Guard lifecycle phases.
//!
//! ```text
//!   Idle                 --request ok-->  Submitting
//!   Submitting           --prompted-->    AwaitingSignature
//!   Submitting           --signed-->      AwaitingConfirmation
//!   AwaitingSignature    --signed-->      AwaitingConfirmation
//!   Submitting           --rejected-->    Failed
//!   AwaitingSignature    --rejected-->    Failed
//!   AwaitingConfirmation --confirmed-->   Succeeded
//!   AwaitingConfirmation --failed-->      Failed
//!   Succeeded | Failed   --reset-->       Idle
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// The lifecycle phase of the transaction guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuardPhase {
    /// No intent owned. The only phase that admits a new payment.
    Idle,
    /// Intent accepted; transfer dispatched to the wallet.
    Submitting,
    /// The wallet is showing its signing prompt.
    AwaitingSignature,
    /// Signed and broadcast; waiting for the transaction to be mined.
    AwaitingConfirmation,
    /// Confirmed on-chain. Terminal until reset.
    Succeeded,
    /// Rejected, errored, reverted, dropped, or timed out. Terminal until reset.
    Failed,
}

impl GuardPhase {
    /// `Succeeded` or `Failed`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// A transfer has been dispatched and no outcome is known yet.
    #[must_use]
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            Self::Submitting | Self::AwaitingSignature | Self::AwaitingConfirmation
        )
    }

    /// Whether a signature result is expected in this phase.
    #[must_use]
    pub fn awaits_signature(self) -> bool {
        matches!(self, Self::Submitting | Self::AwaitingSignature)
    }
}

impl fmt::Display for GuardPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Submitting => write!(f, "SUBMITTING"),
            Self::AwaitingSignature => write!(f, "AWAITING_SIGNATURE"),
            Self::AwaitingConfirmation => write!(f, "AWAITING_CONFIRMATION"),
            Self::Succeeded => write!(f, "SUCCEEDED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Why an owned intent ended in [`GuardPhase::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// The user declined the signing prompt.
    SignatureRejected,
    /// The wallet failed to sign or broadcast.
    WalletError(String),
    /// The transaction was reverted, dropped, or timed out.
    ConfirmationFailed(String),
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SignatureRejected => write!(f, "signature rejected"),
            Self::WalletError(msg) => write!(f, "wallet error: {msg}"),
            Self::ConfirmationFailed(reason) => write!(f, "confirmation failed: {reason}"),
        }
    }
}
