//! # basepay-guard
//!
//! **Transaction Guard**: keeps at most one stablecoin payment in flight per
//! user session and drives it from intent to a terminal outcome.
//!
//! ## Architecture
//!
//! 1. **state**: pure `(GuardState, GuardEvent) → Step` transition function
//! 2. **TransactionGuard**: owns the state; the only way to change it
//! 3. **WalletProvider**: async capability for the wallet and RPC node
//! 4. **PaymentDriver**: performs the guard's effects against a provider
//! 5. **BalanceCache**: advisory last-read balance used for admission
//! 6. **TransferCall**: ERC-20 `transfer` calldata
//! 7. **MockWallet** (feature `test-helpers`): scripted provider for tests
//!
//! ## Payment Flow
//!
//! ```text
//! UI click → TransactionGuard.request_payment() → WalletProvider.submit_transfer()
//!          → on_signature_result() → WalletProvider.await_confirmation()
//!          → on_confirmation_result() → Succeeded | Failed → reset() → Idle
//! ```
//!
//! Wallet callbacks carry the [`IntentId`](basepay_types::IntentId) issued at
//! admission; results for any other intent are ignored.

pub mod balance;
pub mod driver;
pub mod guard;
#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;
pub mod provider;
pub mod state;
pub mod transfer;

pub use balance::BalanceCache;
pub use driver::PaymentDriver;
pub use guard::{CallbackOutcome, SubmitRequest, TransactionGuard};
#[cfg(any(test, feature = "test-helpers"))]
pub use mock::{ConfirmationPlan, MockWallet};
pub use provider::{ConfirmationError, SubmissionError, WalletProvider};
pub use state::{Effect, GuardEvent, GuardState, StaleReason, Step, Transition, transition};
pub use transfer::TransferCall;
