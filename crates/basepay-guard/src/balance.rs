//! Advisory balance cache.
//!
//! Holds the last balance read for the connected account. The value only
//! gates admission; the chain remains the source of truth, so a payment
//! admitted on a stale snapshot can still fail at confirmation.

use std::time::Duration;

use basepay_types::{Address, BalanceSnapshot, TokenAmount};

use crate::provider::WalletProvider;

/// Last known balance plus its staleness threshold.
#[derive(Debug, Clone)]
pub struct BalanceCache {
    snapshot: Option<BalanceSnapshot>,
    max_age: Duration,
}

impl BalanceCache {
    #[must_use]
    pub fn new(max_age: Duration) -> Self {
        Self {
            snapshot: None,
            max_age,
        }
    }

    /// Re-read the balance of `owner`. A pending read (`None`) clears the
    /// cache so the guard reports `BalanceUnknown` instead of using an old
    /// value for a possibly different account.
    pub async fn refresh<W>(&mut self, wallet: &W, owner: Address) -> Option<BalanceSnapshot>
    where
        W: WalletProvider + ?Sized,
    {
        match wallet.read_balance(owner).await {
            Some(amount) => {
                tracing::debug!(owner = %owner.short(), balance = %amount, "Balance read");
                self.store(owner, amount);
            }
            None => {
                tracing::debug!(owner = %owner.short(), "Balance read pending");
                self.snapshot = None;
            }
        }
        self.snapshot
    }

    /// Record a balance obtained elsewhere.
    pub fn store(&mut self, owner: Address, amount: TokenAmount) {
        self.snapshot = Some(BalanceSnapshot::new(owner, amount));
    }

    /// Snapshot to gate a payment from `payer`, if one exists for that account.
    #[must_use]
    pub fn snapshot_for(&self, payer: Address) -> Option<&BalanceSnapshot> {
        let snapshot = self.snapshot.as_ref().filter(|s| s.covers(payer))?;
        if snapshot.is_older_than(self.max_age) {
            tracing::debug!(
                owner = %payer.short(),
                age_ms = snapshot.age().num_milliseconds(),
                "Using stale balance snapshot"
            );
        }
        Some(snapshot)
    }

    /// Forget the snapshot (e.g. after a payment changed the balance).
    pub fn invalidate(&mut self) {
        self.snapshot = None;
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<&BalanceSnapshot> {
        self.snapshot.as_ref()
    }
}
