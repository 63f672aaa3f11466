//! Pure transition function for the transaction guard.
//!
//! [`transition`] maps `(current state, event)` to either the next state plus
//! the effects the caller must perform, or an instruction to ignore the event.
//! It touches no wallet, no clock other than `Utc::now()` for completion
//! stamps, and no shared state, so the whole lifecycle can be tested without
//! a real wallet.
//!
//! ## Invariants
//!
//! - `phase == Idle` ⇔ no intent is owned.
//! - Only `Idle` admits a new intent. Terminal phases stay occupied until
//!   an explicit reset.
//! - Every admitted intent gets a fresh, strictly larger [`IntentId`];
//!   callbacks carrying any other id are ignored.

use basepay_types::{
    Address, BalanceSnapshot, BasepayError, FailureKind, GuardPhase, IntentId, PaymentIntent,
    PaymentOutcome, Receipt, Result, TokenAmount, TxHash, WalletSession,
};
use chrono::Utc;

use crate::provider::{ConfirmationError, SubmissionError};

/// Snapshot of the guard. Fields are read-only outside this module; the only
/// way to obtain a different state is through [`transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardState {
    phase: GuardPhase,
    owned: Option<(IntentId, PaymentIntent)>,
    tx_hash: Option<TxHash>,
    failure: Option<FailureKind>,
    outcome: Option<PaymentOutcome>,
    /// Last id handed out. Survives resets so ids never repeat.
    last_issued: IntentId,
}

impl GuardState {
    /// Fresh guard in `Idle`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: GuardPhase::Idle,
            owned: None,
            tx_hash: None,
            failure: None,
            outcome: None,
            last_issued: IntentId(0),
        }
    }

    #[must_use]
    pub fn phase(&self) -> GuardPhase {
        self.phase
    }

    /// The owned intent and its id, if any.
    #[must_use]
    pub fn owned_intent(&self) -> Option<(IntentId, &PaymentIntent)> {
        self.owned.as_ref().map(|(id, intent)| (*id, intent))
    }

    #[must_use]
    pub fn intent_id(&self) -> Option<IntentId> {
        self.owned.as_ref().map(|(id, _)| *id)
    }

    /// Hash reported by the wallet once the transfer was signed.
    #[must_use]
    pub fn tx_hash(&self) -> Option<TxHash> {
        self.tx_hash
    }

    /// Why the owned intent failed. Set only in `Failed`.
    #[must_use]
    pub fn failure(&self) -> Option<&FailureKind> {
        self.failure.as_ref()
    }

    /// Completed payment record. Set only in `Succeeded`.
    #[must_use]
    pub fn outcome(&self) -> Option<&PaymentOutcome> {
        self.outcome.as_ref()
    }

    #[must_use]
    pub fn last_issued(&self) -> IntentId {
        self.last_issued
    }

    fn with_phase(&self, phase: GuardPhase) -> Self {
        Self {
            phase,
            ..self.clone()
        }
    }

    fn failed(&self, kind: FailureKind) -> Self {
        Self {
            phase: GuardPhase::Failed,
            failure: Some(kind),
            ..self.clone()
        }
    }
}

impl Default for GuardState {
    fn default() -> Self {
        Self::new()
    }
}

/// Inputs to the guard: UI actions and wallet callbacks.
#[derive(Debug, Clone)]
pub enum GuardEvent {
    /// The user pressed "pay".
    Request {
        session: WalletSession,
        balance: Option<BalanceSnapshot>,
        intent: PaymentIntent,
    },
    /// The wallet opened its signing prompt.
    SignaturePrompted { intent_id: IntentId },
    /// The wallet finished signing (or refused).
    SignatureResult {
        intent_id: IntentId,
        result: std::result::Result<TxHash, SubmissionError>,
    },
    /// The RPC node reported the transaction's fate.
    ConfirmationResult {
        intent_id: IntentId,
        result: std::result::Result<Receipt, ConfirmationError>,
    },
    /// The UI dismissed the outcome panel.
    Reset,
}

/// Work the caller must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask the wallet to sign and broadcast a transfer.
    SubmitTransfer {
        intent_id: IntentId,
        recipient: Address,
        amount: TokenAmount,
    },
    /// Wait for the broadcast transaction to be mined.
    AwaitConfirmation { intent_id: IntentId, tx_hash: TxHash },
}

/// An accepted event: the state to move to and what to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: GuardState,
    pub effects: Vec<Effect>,
}

/// Why a callback was dropped without changing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    /// The callback is for an intent the guard no longer (or never) owned.
    UnknownIntent {
        owned: Option<IntentId>,
        got: IntentId,
    },
    /// The owned intent is in a phase that does not expect this callback.
    UnexpectedPhase(GuardPhase),
}

/// Result of feeding one event to [`transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Advance(Transition),
    Ignore(StaleReason),
}

/// Compute the guard's response to `event` in `state`.
///
/// # Errors
/// Admission errors for [`GuardEvent::Request`] (`NotConnected`,
/// `AlreadyInProgress`, `InsufficientBalance`, `BalanceUnknown`) and
/// `ResetWhileInFlight` for [`GuardEvent::Reset`]. Callbacks never error;
/// unexpected ones become [`Step::Ignore`].
pub fn transition(state: &GuardState, event: GuardEvent) -> Result<Step> {
    match event {
        GuardEvent::Request {
            session,
            balance,
            intent,
        } => admit(state, &session, balance.as_ref(), intent).map(Step::Advance),
        GuardEvent::SignaturePrompted { intent_id } => {
            if let Some(stale) = check_owner(state, intent_id) {
                return Ok(Step::Ignore(stale));
            }
            if state.phase != GuardPhase::Submitting {
                return Ok(Step::Ignore(StaleReason::UnexpectedPhase(state.phase)));
            }
            Ok(advance(state.with_phase(GuardPhase::AwaitingSignature)))
        }
        GuardEvent::SignatureResult { intent_id, result } => {
            if let Some(stale) = check_owner(state, intent_id) {
                return Ok(Step::Ignore(stale));
            }
            if !state.phase.awaits_signature() {
                return Ok(Step::Ignore(StaleReason::UnexpectedPhase(state.phase)));
            }
            Ok(match result {
                Ok(tx_hash) => Step::Advance(Transition {
                    next: GuardState {
                        phase: GuardPhase::AwaitingConfirmation,
                        tx_hash: Some(tx_hash),
                        ..state.clone()
                    },
                    effects: vec![Effect::AwaitConfirmation { intent_id, tx_hash }],
                }),
                Err(SubmissionError::Rejected) => {
                    advance(state.failed(FailureKind::SignatureRejected))
                }
                Err(SubmissionError::Wallet(msg)) => {
                    advance(state.failed(FailureKind::WalletError(msg)))
                }
            })
        }
        GuardEvent::ConfirmationResult { intent_id, result } => {
            if let Some(stale) = check_owner(state, intent_id) {
                return Ok(Step::Ignore(stale));
            }
            if state.phase != GuardPhase::AwaitingConfirmation {
                return Ok(Step::Ignore(StaleReason::UnexpectedPhase(state.phase)));
            }
            Ok(confirm(state, intent_id, result))
        }
        GuardEvent::Reset => reset(state).map(advance),
    }
}

fn advance(next: GuardState) -> Step {
    Step::Advance(Transition {
        next,
        effects: Vec::new(),
    })
}

/// `Some` if `intent_id` is not the intent the guard currently owns.
fn check_owner(state: &GuardState, intent_id: IntentId) -> Option<StaleReason> {
    let owned = state.intent_id();
    if owned == Some(intent_id) {
        None
    } else {
        Some(StaleReason::UnknownIntent {
            owned,
            got: intent_id,
        })
    }
}

/// Admission checks, in order: wallet connected, guard idle, balance known
/// and sufficient.
fn admit(
    state: &GuardState,
    session: &WalletSession,
    balance: Option<&BalanceSnapshot>,
    intent: PaymentIntent,
) -> Result<Transition> {
    let payer = session.payer().ok_or(BasepayError::NotConnected)?;

    if state.phase != GuardPhase::Idle {
        return Err(BasepayError::AlreadyInProgress);
    }

    // A snapshot read for a previously connected account says nothing
    // about the current one.
    let snapshot = balance
        .filter(|s| s.covers(payer))
        .ok_or(BasepayError::BalanceUnknown)?;
    if snapshot.amount < intent.amount {
        return Err(BasepayError::InsufficientBalance {
            needed: intent.amount,
            available: snapshot.amount,
        });
    }

    let intent_id = state.last_issued.next();
    let effect = Effect::SubmitTransfer {
        intent_id,
        recipient: intent.recipient,
        amount: intent.amount,
    };
    Ok(Transition {
        next: GuardState {
            phase: GuardPhase::Submitting,
            owned: Some((intent_id, intent)),
            tx_hash: None,
            failure: None,
            outcome: None,
            last_issued: intent_id,
        },
        effects: vec![effect],
    })
}

fn confirm(
    state: &GuardState,
    intent_id: IntentId,
    result: std::result::Result<Receipt, ConfirmationError>,
) -> Step {
    let receipt = match result {
        Ok(receipt) => receipt,
        Err(err) => return advance(state.failed(FailureKind::ConfirmationFailed(err.reason()))),
    };

    // A speed-up or cancel from the wallet mines under another hash. The
    // signed transfer will never confirm, so the intent cannot stay in flight.
    if state.tx_hash.is_some_and(|expected| receipt.tx_hash != expected) {
        return advance(state.failed(FailureKind::ConfirmationFailed(
            ConfirmationError::Replaced.reason(),
        )));
    }

    if !receipt.status {
        return advance(state.failed(FailureKind::ConfirmationFailed(
            ConfirmationError::Reverted.reason(),
        )));
    }

    let Some((_, intent)) = state.owned.clone() else {
        return Step::Ignore(StaleReason::UnknownIntent {
            owned: None,
            got: intent_id,
        });
    };
    let outcome = PaymentOutcome {
        intent_id,
        intent,
        tx_hash: receipt.tx_hash,
        block_number: receipt.block_number,
        completed_at: Utc::now(),
    };
    advance(GuardState {
        phase: GuardPhase::Succeeded,
        outcome: Some(outcome),
        ..state.clone()
    })
}

fn reset(state: &GuardState) -> Result<GuardState> {
    if state.phase.is_in_flight() {
        return Err(BasepayError::ResetWhileInFlight);
    }
    Ok(GuardState {
        last_issued: state.last_issued,
        ..GuardState::new()
    })
}
