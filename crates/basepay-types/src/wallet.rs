//! What the guard can see of the user's wallet.
//!
//! The wallet collaborator owns the session and the balance read; the guard
//! only inspects these values and never mutates them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, TokenAmount};

/// Connection state reported by the wallet collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSession {
    pub connected: bool,
    pub address: Option<Address>,
}

impl WalletSession {
    #[must_use]
    pub fn connected(address: Address) -> Self {
        Self {
            connected: true,
            address: Some(address),
        }
    }

    #[must_use]
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// The address to pay from, if the session is usable.
    ///
    /// A session that claims to be connected but reports no address (or the
    /// zero address) is treated as not connected.
    #[must_use]
    pub fn payer(&self) -> Option<Address> {
        if !self.connected {
            return None;
        }
        self.address.filter(|a| !a.is_zero())
    }
}

/// Last-read token balance for one address.
///
/// Advisory only: the chain is authoritative and this value may be stale in
/// either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub owner: Address,
    pub amount: TokenAmount,
    pub read_at: DateTime<Utc>,
}

impl BalanceSnapshot {
    #[must_use]
    pub fn new(owner: Address, amount: TokenAmount) -> Self {
        Self {
            owner,
            amount,
            read_at: Utc::now(),
        }
    }

    /// How long ago the balance was read.
    #[must_use]
    pub fn age(&self) -> Duration {
        Utc::now() - self.read_at
    }

    #[must_use]
    pub fn is_older_than(&self, max_age: std::time::Duration) -> bool {
        Duration::from_std(max_age).is_ok_and(|max| self.age() > max)
    }

    /// Whether this snapshot can gate a payment from `payer`.
    #[must_use]
    pub fn covers(&self, payer: Address) -> bool {
        self.owner == payer
    }
}
