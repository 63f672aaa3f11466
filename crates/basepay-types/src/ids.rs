//! Identifiers used throughout basepay.
//!
//! EVM values ([`Address`], [`TxHash`]) serialize as `0x`-prefixed hex strings.
//! [`IntentId`] is a per-guard monotonic counter and [`SessionId`] uses UUIDv7.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BasepayError, Result};

/// Decode `0x`-prefixed hex into a fixed-size array.
fn decode_prefixed<const N: usize>(s: &str) -> std::result::Result<[u8; N], String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| format!("missing 0x prefix: {s:?}"))?;
    if digits.len() != N * 2 {
        return Err(format!(
            "expected {} hex digits, got {}",
            N * 2,
            digits.len()
        ));
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(digits, &mut out).map_err(|e| e.to_string())?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte EVM account or contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address.
    pub const ZERO: Self = Self([0u8; 20]);

    #[must_use]
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Abbreviated form for log lines, e.g. `0x8335…2913`.
    #[must_use]
    pub fn short(&self) -> String {
        format!(
            "0x{}…{}",
            hex::encode(&self.0[..2]),
            hex::encode(&self.0[18..])
        )
    }
}

impl FromStr for Address {
    type Err = BasepayError;

    fn from_str(s: &str) -> Result<Self> {
        decode_prefixed::<20>(s.trim())
            .map(Self)
            .map_err(|reason| BasepayError::InvalidAddress { reason })
    }
}

impl TryFrom<String> for Address {
    type Error = BasepayError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// ---------------------------------------------------------------------------
// TxHash
// ---------------------------------------------------------------------------

/// A 32-byte transaction hash reported by the wallet after broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn short(&self) -> String {
        format!("0x{}", hex::encode(&self.0[..4]))
    }
}

impl FromStr for TxHash {
    type Err = BasepayError;

    fn from_str(s: &str) -> Result<Self> {
        decode_prefixed::<32>(s.trim())
            .map(Self)
            .map_err(|reason| BasepayError::InvalidTxHash { reason })
    }
}

impl TryFrom<String> for TxHash {
    type Error = BasepayError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<TxHash> for String {
    fn from(hash: TxHash) -> Self {
        hash.to_string()
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// ---------------------------------------------------------------------------
// IntentId
// ---------------------------------------------------------------------------

/// Monotonically increasing identifier for a payment intent.
///
/// Issued by the guard on admission. Wallet callbacks carry it back so a
/// late result for a superseded intent can be recognised and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct IntentId(pub u64);

impl IntentId {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for IntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "intent:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SessionId
// ---------------------------------------------------------------------------

/// Identifies one guard instance (one user session) in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session:{}", self.0)
    }
}

/// Random address for unit tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl Address {
    pub fn random() -> Self {
        Self(rand::random::<[u8; 20]>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USDC: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";

    #[test]
    fn address_parses_mixed_case() {
        let addr: Address = USDC.parse().unwrap();
        assert_eq!(addr.0[0], 0x83);
        assert_eq!(addr.0[19], 0x13);
        assert_eq!(addr.to_string(), USDC.to_lowercase());
    }

    #[test]
    fn address_rejects_bad_input() {
        assert!(matches!(
            "833589fCD6eDb6E08f4c7C32D4f71b54bdA02913".parse::<Address>(),
            Err(BasepayError::InvalidAddress { .. })
        ));
        assert!("0x1234".parse::<Address>().is_err());
        assert!(
            "0xzz3589fCD6eDb6E08f4c7C32D4f71b54bdA02913"
                .parse::<Address>()
                .is_err()
        );
    }

    #[test]
    fn address_short_form() {
        let addr: Address = USDC.parse().unwrap();
        assert_eq!(addr.short(), "0x8335…2913");
    }

    #[test]
    fn zero_address() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::from_bytes([1u8; 20]).is_zero());
    }

    #[test]
    fn tx_hash_parse_and_display() {
        let raw = format!("0x{}", "ab".repeat(32));
        let hash: TxHash = raw.parse().unwrap();
        assert_eq!(hash.to_string(), raw);
        assert_eq!(hash.short(), "0xabababab");
        assert!(matches!(
            "0xabcd".parse::<TxHash>(),
            Err(BasepayError::InvalidTxHash { .. })
        ));
    }

    #[test]
    fn intent_id_next() {
        assert_eq!(IntentId(7).next(), IntentId(8));
        assert_eq!(format!("{}", IntentId(3)), "intent:3");
    }

    #[test]
    fn session_id_uniqueness() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn address_serializes_as_hex_string() {
        let addr: Address = USDC.parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", USDC.to_lowercase()));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, back);
        assert!(serde_json::from_str::<Address>("\"0x12\"").is_err());
    }
}
