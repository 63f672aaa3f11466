//! Configuration for the payment guard, the target chain, and the token.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Address, BasepayError, Result, TxHash, constants};

/// Top-level configuration for one guard and its driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Chain the token lives on.
    pub chain: ChainConfig,
    /// The settlement token.
    pub token: TokenConfig,
    /// How long the driver waits for a confirmation before reporting a timeout.
    pub confirmation_timeout: Duration,
    /// Balance snapshots older than this are logged as stale (still used).
    pub balance_max_age: Duration,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig::default(),
            token: TokenConfig::default(),
            confirmation_timeout: Duration::from_millis(constants::DEFAULT_CONFIRMATION_TIMEOUT_MS),
            balance_max_age: Duration::from_millis(constants::DEFAULT_BALANCE_MAX_AGE_MS),
        }
    }
}

impl GuardConfig {
    /// Parse a JSON config document. Missing fields take their defaults.
    ///
    /// # Errors
    /// `Serialization` for malformed JSON, `Configuration` if validation fails.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations the guard cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.token.decimals != constants::TOKEN_DECIMALS {
            return Err(BasepayError::Configuration(format!(
                "token {} has {} decimals, only {} is supported",
                self.token.symbol,
                self.token.decimals,
                constants::TOKEN_DECIMALS
            )));
        }
        if self.token.address.is_zero() {
            return Err(BasepayError::Configuration(
                "token address is the zero address".into(),
            ));
        }
        if self.confirmation_timeout.is_zero() {
            return Err(BasepayError::Configuration(
                "confirmation_timeout must be positive".into(),
            ));
        }
        if self.chain.chain_id == 0 {
            return Err(BasepayError::Configuration("chain_id must be non-zero".into()));
        }
        Ok(())
    }
}

/// EVM chain parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub name: String,
    pub rpc_url: String,
    pub explorer_url: String,
}

impl ChainConfig {
    /// Base mainnet.
    #[must_use]
    pub fn base_mainnet() -> Self {
        Self {
            chain_id: constants::BASE_MAINNET_CHAIN_ID,
            name: "Base".to_string(),
            rpc_url: constants::BASE_MAINNET_RPC_URL.to_string(),
            explorer_url: constants::BASE_MAINNET_EXPLORER_URL.to_string(),
        }
    }

    /// Block explorer page for a transaction.
    #[must_use]
    pub fn explorer_tx_url(&self, tx: &TxHash) -> String {
        format!("{}/tx/{tx}", self.explorer_url.trim_end_matches('/'))
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::base_mainnet()
    }
}

/// ERC-20 token parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub symbol: String,
    pub address: Address,
    pub decimals: u32,
}

impl TokenConfig {
    /// USDC on Base mainnet.
    #[must_use]
    pub fn usdc_base() -> Self {
        Self {
            symbol: constants::TOKEN_SYMBOL.to_string(),
            address: constants::BASE_USDC_ADDRESS,
            decimals: constants::TOKEN_DECIMALS,
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self::usdc_base()
    }
}
