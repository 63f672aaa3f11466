//! Async driver that runs the guard against a [`WalletProvider`].
//!
//! The guard itself never awaits. The driver performs the effects it emits,
//! in order:
//!
//! ```text
//! refresh_balance → request_payment → submit_transfer → on_signature_result
//!                 → await_confirmation (with timeout) → on_confirmation_result
//! ```

use basepay_types::{
    BalanceSnapshot, BasepayError, GuardConfig, GuardPhase, PaymentIntent, Result,
};

use crate::balance::BalanceCache;
use crate::guard::{CallbackOutcome, TransactionGuard};
use crate::provider::{ConfirmationError, WalletProvider};
use crate::state::Effect;
use crate::transfer::TransferCall;

/// Owns a guard, a balance cache, and the wallet they talk to.
pub struct PaymentDriver<W> {
    wallet: W,
    guard: TransactionGuard,
    balances: BalanceCache,
    config: GuardConfig,
}

impl<W: WalletProvider> PaymentDriver<W> {
    /// # Errors
    /// `Configuration` if `config` fails validation.
    pub fn new(wallet: W, config: GuardConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            wallet,
            guard: TransactionGuard::new(),
            balances: BalanceCache::new(config.balance_max_age),
            config,
        })
    }

    #[must_use]
    pub fn guard(&self) -> &TransactionGuard {
        &self.guard
    }

    #[must_use]
    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    #[must_use]
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    #[must_use]
    pub fn balance(&self) -> Option<&BalanceSnapshot> {
        self.balances.snapshot()
    }

    /// Read the connected account's balance into the cache.
    ///
    /// # Errors
    /// `NotConnected` if the wallet has no usable address.
    pub async fn refresh_balance(&mut self) -> Result<Option<BalanceSnapshot>> {
        let payer = self
            .wallet
            .session()
            .payer()
            .ok_or(BasepayError::NotConnected)?;
        Ok(self.balances.refresh(&self.wallet, payer).await)
    }

    /// Run one payment to its terminal phase.
    ///
    /// Admission errors are returned as `Err` with the guard untouched.
    /// Once admitted, the result is `Ok` with `Succeeded` or `Failed`; the
    /// failure reason is on [`TransactionGuard::failure`].
    ///
    /// # Errors
    /// Admission errors from [`TransactionGuard::request_payment`], or
    /// `Internal` if the guard drops a callback for the intent this call
    /// owns.
    pub async fn pay(&mut self, intent: PaymentIntent) -> Result<GuardPhase> {
        let session = self.wallet.session();
        let snapshot = session
            .payer()
            .and_then(|payer| self.balances.snapshot_for(payer));
        let submit = self.guard.request_payment(&session, snapshot, intent)?;

        let call = TransferCall::new(self.config.token.address, submit.recipient, submit.amount);
        tracing::debug!(
            intent = %submit.intent_id,
            calldata = %call.calldata_hex(),
            "Dispatching transfer"
        );
        self.guard.on_signature_prompted(submit.intent_id);
        let signed = self.wallet.submit_transfer(&call).await;

        let tx_hash = match self.guard.on_signature_result(submit.intent_id, signed) {
            CallbackOutcome::Applied { effects, .. } => effects.into_iter().find_map(|e| match e {
                Effect::AwaitConfirmation { tx_hash, .. } => Some(tx_hash),
                Effect::SubmitTransfer { .. } => None,
            }),
            CallbackOutcome::Ignored(reason) => {
                return Err(BasepayError::Internal(format!(
                    "signature result for {} ignored: {reason:?}",
                    submit.intent_id
                )));
            }
        };
        let Some(tx_hash) = tx_hash else {
            return Ok(self.guard.phase());
        };

        tracing::info!(
            intent = %submit.intent_id,
            tx = %tx_hash,
            explorer = %self.config.chain.explorer_tx_url(&tx_hash),
            "Transfer broadcast"
        );

        let confirmed = tokio::time::timeout(
            self.config.confirmation_timeout,
            self.wallet.await_confirmation(tx_hash),
        )
        .await
        .unwrap_or(Err(ConfirmationError::Timeout));
        if let CallbackOutcome::Ignored(reason) =
            self.guard.on_confirmation_result(submit.intent_id, confirmed)
        {
            return Err(BasepayError::Internal(format!(
                "confirmation for {} ignored: {reason:?}",
                submit.intent_id
            )));
        }

        let phase = self.guard.phase();
        if phase == GuardPhase::Succeeded {
            // The on-chain balance moved; force a fresh read before the next payment.
            self.balances.invalidate();
        }
        Ok(phase)
    }

    /// Dismiss the terminal outcome so another payment can be admitted.
    pub fn reset(&mut self) -> Result<()> {
        self.guard.reset()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use basepay_types::{Address, FailureKind, TokenAmount};

    use super::*;
    use crate::mock::{ConfirmationPlan, MockWallet};
    use crate::provider::SubmissionError;

    fn payer() -> Address {
        Address::from_bytes([0xaa; 20])
    }

    fn merchant() -> Address {
        Address::from_bytes([0xbb; 20])
    }

    fn intent(n: u128) -> PaymentIntent {
        PaymentIntent::new(merchant(), TokenAmount::from_base_units(n)).unwrap()
    }

    fn driver(balance: u128) -> PaymentDriver<MockWallet> {
        let wallet = MockWallet::connected(payer(), TokenAmount::from_base_units(balance));
        PaymentDriver::new(wallet, GuardConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn pay_without_balance_read_is_unknown() {
        let mut d = driver(5_000_000);
        let err = d.pay(intent(1_000_000)).await.unwrap_err();
        assert_eq!(err, BasepayError::BalanceUnknown);
        assert_eq!(d.wallet().submission_count(), 0);
    }

    #[tokio::test]
    async fn full_success_path() {
        let mut d = driver(5_000_000);
        d.refresh_balance().await.unwrap();
        let phase = d.pay(intent(1_000_000)).await.unwrap();
        assert_eq!(phase, GuardPhase::Succeeded);

        let sent = d.wallet().submitted();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, merchant());
        assert_eq!(sent[0].token, d.config().token.address);
        assert_eq!(sent[0].amount, TokenAmount::from_base_units(1_000_000));

        let outcome = d.guard().outcome().unwrap();
        assert_eq!(outcome.block_number, 1);
        assert!(d.balance().is_none(), "balance invalidated after payment");
    }

    #[tokio::test]
    async fn rejected_signature_skips_confirmation() {
        let mut d = driver(5_000_000);
        d.wallet().push_signature(Err(SubmissionError::Rejected));
        d.refresh_balance().await.unwrap();
        let phase = d.pay(intent(1_000_000)).await.unwrap();
        assert_eq!(phase, GuardPhase::Failed);
        assert_eq!(d.guard().failure(), Some(&FailureKind::SignatureRejected));
    }

    #[tokio::test]
    async fn hanging_confirmation_times_out() {
        let wallet = MockWallet::connected(payer(), TokenAmount::from_base_units(10));
        wallet.push_confirmation(ConfirmationPlan::Hang);
        let config = GuardConfig {
            confirmation_timeout: Duration::from_millis(20),
            ..GuardConfig::default()
        };
        let mut d = PaymentDriver::new(wallet, config).unwrap();
        d.refresh_balance().await.unwrap();
        let phase = d.pay(intent(10)).await.unwrap();
        assert_eq!(phase, GuardPhase::Failed);
        assert_eq!(
            d.guard().failure(),
            Some(&FailureKind::ConfirmationFailed("timeout".into()))
        );
    }

    #[tokio::test]
    async fn refresh_requires_connection() {
        let mut d = driver(1);
        d.wallet()
            .set_session(basepay_types::WalletSession::disconnected());
        assert_eq!(
            d.refresh_balance().await.unwrap_err(),
            BasepayError::NotConnected
        );
    }

    #[test]
    fn invalid_config_rejected() {
        let config = GuardConfig {
            confirmation_timeout: Duration::ZERO,
            ..GuardConfig::default()
        };
        assert!(PaymentDriver::new(MockWallet::default(), config).is_err());
    }
}
