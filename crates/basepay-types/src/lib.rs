//! # basepay-types
//!
//! Shared types, errors, and configuration for the **basepay** payment guard.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`Address`], [`TxHash`], [`IntentId`], [`SessionId`]
//! - **Amounts**: [`TokenAmount`] (6-decimal fixed point)
//! - **Intent model**: [`PaymentIntent`], [`PaymentOutcome`], [`Receipt`]
//! - **Guard model**: [`GuardPhase`], [`FailureKind`]
//! - **Wallet model**: [`WalletSession`], [`BalanceSnapshot`]
//! - **Catalog**: [`Business`], [`Product`]
//! - **Configuration**: [`GuardConfig`], [`ChainConfig`], [`TokenConfig`]
//! - **Errors**: [`BasepayError`] with `BP_ERR_` prefix codes
//! - **Constants**: chain and token defaults

pub mod amount;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod intent;
pub mod phase;
pub mod wallet;

pub use amount::*;
pub use catalog::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use intent::*;
pub use phase::*;
pub use wallet::*;

// Constants are accessed via `basepay_types::constants::FOO`.
