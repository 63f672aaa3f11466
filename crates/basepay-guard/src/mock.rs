//! In-memory [`WalletProvider`] with scripted outcomes.
//!
//! Signing succeeds and confirmations succeed unless a failure has been
//! queued. Every submitted [`TransferCall`] is recorded so callers can assert
//! how many transfers actually reached the wallet.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use basepay_types::{Address, Receipt, TokenAmount, TxHash, WalletSession};

use crate::provider::{ConfirmationError, SubmissionError, WalletProvider};
use crate::transfer::TransferCall;

/// How the mock answers the next `await_confirmation` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationPlan {
    /// Mined successfully.
    Confirm,
    /// Mined but reverted (`status = false`).
    Revert,
    /// Mined under a different hash, as after a wallet speed-up.
    Replace,
    /// Reported as an error.
    Fail(ConfirmationError),
    /// Never resolves; the driver's timeout must fire.
    Hang,
}

/// Scripted wallet for tests and local demos.
#[derive(Debug, Default)]
pub struct MockWallet {
    session: Mutex<WalletSession>,
    balance: Mutex<Option<TokenAmount>>,
    signatures: Mutex<VecDeque<Result<TxHash, SubmissionError>>>,
    confirmations: Mutex<VecDeque<ConfirmationPlan>>,
    submitted: Mutex<Vec<TransferCall>>,
    next_block: AtomicU64,
}

impl MockWallet {
    /// A wallet connected as `address` holding `balance`.
    #[must_use]
    pub fn connected(address: Address, balance: TokenAmount) -> Self {
        let wallet = Self::default();
        wallet.set_session(WalletSession::connected(address));
        wallet.set_balance(Some(balance));
        wallet
    }

    pub fn set_session(&self, session: WalletSession) {
        *self.session.lock().expect("mock wallet lock poisoned") = session;
    }

    /// `None` simulates a balance read that has not completed.
    pub fn set_balance(&self, balance: Option<TokenAmount>) {
        *self.balance.lock().expect("mock wallet lock poisoned") = balance;
    }

    /// Queue the result of the next `submit_transfer`.
    pub fn push_signature(&self, result: Result<TxHash, SubmissionError>) {
        self.signatures
            .lock()
            .expect("mock wallet lock poisoned")
            .push_back(result);
    }

    /// Queue the behaviour of the next `await_confirmation`.
    pub fn push_confirmation(&self, plan: ConfirmationPlan) {
        self.confirmations
            .lock()
            .expect("mock wallet lock poisoned")
            .push_back(plan);
    }

    /// Every transfer that reached the wallet, in order.
    #[must_use]
    pub fn submitted(&self) -> Vec<TransferCall> {
        self.submitted
            .lock()
            .expect("mock wallet lock poisoned")
            .clone()
    }

    #[must_use]
    pub fn submission_count(&self) -> usize {
        self.submitted.lock().expect("mock wallet lock poisoned").len()
    }

    fn hash_for(index: usize) -> TxHash {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xfe;
        bytes[24..].copy_from_slice(&u64::try_from(index).unwrap_or(u64::MAX).to_be_bytes());
        TxHash::from_bytes(bytes)
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    fn session(&self) -> WalletSession {
        *self.session.lock().expect("mock wallet lock poisoned")
    }

    async fn read_balance(&self, _owner: Address) -> Option<TokenAmount> {
        *self.balance.lock().expect("mock wallet lock poisoned")
    }

    async fn submit_transfer(&self, call: &TransferCall) -> Result<TxHash, SubmissionError> {
        let index = {
            let mut submitted = self.submitted.lock().expect("mock wallet lock poisoned");
            submitted.push(*call);
            submitted.len()
        };
        self.signatures
            .lock()
            .expect("mock wallet lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Ok(Self::hash_for(index)))
    }

    async fn await_confirmation(&self, tx: TxHash) -> Result<Receipt, ConfirmationError> {
        let plan = self
            .confirmations
            .lock()
            .expect("mock wallet lock poisoned")
            .pop_front()
            .unwrap_or(ConfirmationPlan::Confirm);
        let block_number = self.next_block.fetch_add(1, Ordering::Relaxed) + 1;
        match plan {
            ConfirmationPlan::Confirm => Ok(Receipt {
                tx_hash: tx,
                block_number,
                status: true,
            }),
            ConfirmationPlan::Revert => Ok(Receipt {
                tx_hash: tx,
                block_number,
                status: false,
            }),
            ConfirmationPlan::Replace => {
                let mut replacement = *tx.as_bytes();
                replacement[31] ^= 0xff;
                Ok(Receipt {
                    tx_hash: TxHash::from_bytes(replacement),
                    block_number,
                    status: true,
                })
            }
            ConfirmationPlan::Fail(err) => Err(err),
            ConfirmationPlan::Hang => std::future::pending().await,
        }
    }
}
