//! Fixed-point token amounts.
//!
//! A [`TokenAmount`] is an integer count of base units. The settlement token
//! has [`TOKEN_DECIMALS`](crate::constants::TOKEN_DECIMALS) fractional digits,
//! so `1_000000` base units is one whole token.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{BasepayError, Result, constants};

/// An amount of the settlement token in base units (6 fractional digits).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn from_base_units(units: u128) -> Self {
        Self(units)
    }

    #[must_use]
    pub const fn base_units(self) -> u128 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Convert a human-readable amount (e.g. a product price of `4.50`)
    /// into base units.
    ///
    /// # Errors
    /// Returns `InvalidAmount` if the value is negative, carries more than
    /// six fractional digits, or does not fit.
    pub fn from_decimal(value: Decimal) -> Result<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(BasepayError::InvalidAmount {
                reason: format!("negative amount {value}"),
            });
        }
        let normalized = value.normalize();
        let scale = normalized.scale();
        if scale > constants::TOKEN_DECIMALS {
            return Err(BasepayError::InvalidAmount {
                reason: format!(
                    "{value} has {scale} fractional digits, max {}",
                    constants::TOKEN_DECIMALS
                ),
            });
        }
        let mantissa = normalized.mantissa().unsigned_abs();
        let factor = 10u128.pow(constants::TOKEN_DECIMALS - scale);
        mantissa
            .checked_mul(factor)
            .map(Self)
            .ok_or_else(|| BasepayError::InvalidAmount {
                reason: format!("{value} out of range"),
            })
    }
}

/// Renders like `formatUnits(x, 6)`: no trailing zeros, no dot for whole amounts.
impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / constants::TOKEN_UNIT;
        let frac = self.0 % constants::TOKEN_UNIT;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{frac:06}");
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}
