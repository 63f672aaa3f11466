//! Payment intents and their on-chain outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, BasepayError, Business, IntentId, Product, Result, TokenAmount, TxHash};

/// A user's request to transfer a fixed amount of the token to a recipient.
///
/// Immutable once created. The guard takes ownership on admission and drops
/// it on reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Who receives the tokens.
    pub recipient: Address,
    /// How much, in base units.
    pub amount: TokenAmount,
    /// When the user asked to pay.
    pub initiated_at: DateTime<Utc>,
}

impl PaymentIntent {
    /// Create an intent stamped with the current time.
    ///
    /// # Errors
    /// - `InvalidAddress` if `recipient` is the zero address
    /// - `InvalidAmount` if `amount` is zero
    pub fn new(recipient: Address, amount: TokenAmount) -> Result<Self> {
        if recipient.is_zero() {
            return Err(BasepayError::InvalidAddress {
                reason: "recipient is the zero address".into(),
            });
        }
        if amount.is_zero() {
            return Err(BasepayError::InvalidAmount {
                reason: "payment amount must be positive".into(),
            });
        }
        Ok(Self {
            recipient,
            amount,
            initiated_at: Utc::now(),
        })
    }

    /// Intent to buy `product` from `business` at its listed price.
    pub fn for_product(business: &Business, product: &Product) -> Result<Self> {
        Self::new(business.address, TokenAmount::from_decimal(product.price)?)
    }
}

/// What the RPC node reports once a transaction is mined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    /// `true` if execution succeeded, `false` if it reverted.
    pub status: bool,
}

/// The completed record of a confirmed payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOutcome {
    pub intent_id: IntentId,
    pub intent: PaymentIntent,
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub completed_at: DateTime<Utc>,
}
