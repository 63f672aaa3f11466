//! The transaction guard: owner of the single in-flight payment.
//!
//! `TransactionGuard` wraps a [`GuardState`] and applies [`transition`] to it.
//! Every operation takes `&mut self`, so the admission check and the state
//! update happen in one synchronous step and two rapid clicks cannot both be
//! admitted.

use basepay_types::{
    Address, BalanceSnapshot, BasepayError, FailureKind, GuardPhase, IntentId, PaymentIntent,
    PaymentOutcome, Receipt, Result, SessionId, TokenAmount, TxHash, WalletSession,
};

use crate::provider::{ConfirmationError, SubmissionError};
use crate::state::{Effect, GuardEvent, GuardState, StaleReason, Step, Transition, transition};

/// A transfer the guard has admitted and wants dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitRequest {
    pub intent_id: IntentId,
    pub recipient: Address,
    pub amount: TokenAmount,
}

/// What happened to a wallet callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// The guard moved to `phase`; perform `effects` next.
    Applied {
        phase: GuardPhase,
        effects: Vec<Effect>,
    },
    /// The callback did not belong to the owned intent and changed nothing.
    Ignored(StaleReason),
}

impl CallbackOutcome {
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored(_))
    }
}

/// Enforces at most one payment in flight per session.
#[derive(Debug)]
pub struct TransactionGuard {
    session_id: SessionId,
    state: GuardState,
}

impl TransactionGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::with_session(SessionId::new())
    }

    #[must_use]
    pub fn with_session(session_id: SessionId) -> Self {
        Self {
            session_id,
            state: GuardState::new(),
        }
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn state(&self) -> &GuardState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> GuardPhase {
        self.state.phase()
    }

    #[must_use]
    pub fn intent(&self) -> Option<(IntentId, &PaymentIntent)> {
        self.state.owned_intent()
    }

    #[must_use]
    pub fn failure(&self) -> Option<&FailureKind> {
        self.state.failure()
    }

    /// The failure as a displayable error, e.g. `BP_ERR_300` for a rejected
    /// signature.
    #[must_use]
    pub fn failure_error(&self) -> Option<BasepayError> {
        self.state.failure().cloned().map(BasepayError::from)
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&PaymentOutcome> {
        self.state.outcome()
    }

    /// Admit `intent` if the wallet is connected, nothing else is owned, and
    /// the balance snapshot covers the amount.
    ///
    /// On success the guard is `Submitting` and the returned request must be
    /// sent to the wallet exactly once. On failure nothing changes.
    ///
    /// # Errors
    /// `NotConnected`, `AlreadyInProgress`, `BalanceUnknown`, or
    /// `InsufficientBalance`.
    pub fn request_payment(
        &mut self,
        session: &WalletSession,
        balance: Option<&BalanceSnapshot>,
        intent: PaymentIntent,
    ) -> Result<SubmitRequest> {
        let recipient = intent.recipient;
        let amount = intent.amount;
        let event = GuardEvent::Request {
            session: *session,
            balance: balance.copied(),
            intent,
        };

        let Transition { next, effects } = match transition(&self.state, event) {
            Ok(Step::Advance(t)) => t,
            Ok(Step::Ignore(reason)) => {
                return Err(BasepayError::Internal(format!(
                    "payment request ignored: {reason:?}"
                )));
            }
            Err(err) => {
                tracing::warn!(
                    session = %self.session_id,
                    phase = %self.state.phase(),
                    recipient = %recipient,
                    amount = %amount,
                    error = %err,
                    "Payment request refused"
                );
                return Err(err);
            }
        };

        let submit = effects
            .into_iter()
            .find_map(|effect| match effect {
                Effect::SubmitTransfer {
                    intent_id,
                    recipient,
                    amount,
                } => Some(SubmitRequest {
                    intent_id,
                    recipient,
                    amount,
                }),
                Effect::AwaitConfirmation { .. } => None,
            })
            .ok_or_else(|| BasepayError::Internal("admission produced no submission".into()))?;

        self.state = next;
        tracing::info!(
            session = %self.session_id,
            intent = %submit.intent_id,
            recipient = %submit.recipient,
            amount = %submit.amount,
            "Payment admitted"
        );
        Ok(submit)
    }

    /// The wallet opened its signing prompt for `intent_id`.
    pub fn on_signature_prompted(&mut self, intent_id: IntentId) -> CallbackOutcome {
        self.callback(GuardEvent::SignaturePrompted { intent_id })
    }

    /// The wallet returned a transaction hash, or refused to sign.
    pub fn on_signature_result(
        &mut self,
        intent_id: IntentId,
        result: std::result::Result<TxHash, SubmissionError>,
    ) -> CallbackOutcome {
        self.callback(GuardEvent::SignatureResult { intent_id, result })
    }

    /// The RPC node reported a receipt, or the transaction was lost.
    pub fn on_confirmation_result(
        &mut self,
        intent_id: IntentId,
        result: std::result::Result<Receipt, ConfirmationError>,
    ) -> CallbackOutcome {
        self.callback(GuardEvent::ConfirmationResult { intent_id, result })
    }

    /// Dismiss a terminal outcome and return to `Idle`.
    ///
    /// A no-op in `Idle`.
    ///
    /// # Errors
    /// `ResetWhileInFlight` if a transfer is still awaiting its result.
    pub fn reset(&mut self) -> Result<()> {
        let previous = self.state.phase();
        match transition(&self.state, GuardEvent::Reset)? {
            Step::Advance(Transition { next, .. }) => {
                self.state = next;
                if previous != GuardPhase::Idle {
                    tracing::debug!(
                        session = %self.session_id,
                        from = %previous,
                        "Guard reset"
                    );
                }
                Ok(())
            }
            Step::Ignore(reason) => Err(BasepayError::Internal(format!(
                "reset ignored: {reason:?}"
            ))),
        }
    }

    fn callback(&mut self, event: GuardEvent) -> CallbackOutcome {
        let step = match transition(&self.state, event) {
            Ok(step) => step,
            // Callbacks never produce admission errors.
            Err(err) => {
                tracing::error!(session = %self.session_id, error = %err, "Callback rejected");
                return CallbackOutcome::Ignored(StaleReason::UnexpectedPhase(self.state.phase()));
            }
        };

        match step {
            Step::Advance(Transition { next, effects }) => {
                let from = self.state.phase();
                self.state = next;
                self.log_transition(from);
                CallbackOutcome::Applied {
                    phase: self.state.phase(),
                    effects,
                }
            }
            Step::Ignore(reason) => {
                tracing::warn!(
                    session = %self.session_id,
                    phase = %self.state.phase(),
                    reason = ?reason,
                    "Stale wallet callback ignored"
                );
                CallbackOutcome::Ignored(reason)
            }
        }
    }

    fn log_transition(&self, from: GuardPhase) {
        let to = self.state.phase();
        let intent = self.state.intent_id();
        match to {
            GuardPhase::Succeeded => {
                if let Some(outcome) = self.state.outcome() {
                    tracing::info!(
                        session = %self.session_id,
                        intent = %outcome.intent_id,
                        tx = %outcome.tx_hash,
                        block = outcome.block_number,
                        "Payment confirmed"
                    );
                }
            }
            GuardPhase::Failed => {
                tracing::warn!(
                    session = %self.session_id,
                    intent = ?intent,
                    from = %from,
                    failure = ?self.state.failure(),
                    "Payment failed"
                );
            }
            _ => {
                tracing::debug!(
                    session = %self.session_id,
                    intent = ?intent,
                    from = %from,
                    to = %to,
                    tx = ?self.state.tx_hash(),
                    "Guard transition"
                );
            }
        }
    }
}

impl Default for TransactionGuard {
    fn default() -> Self {
        Self::new()
    }
}
