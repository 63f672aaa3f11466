//! ERC-20 `transfer(address,uint256)` call construction.

use basepay_types::{Address, TokenAmount, constants};
use serde::{Deserialize, Serialize};

/// Length of the ABI-encoded call: selector + two 32-byte words.
pub const TRANSFER_CALLDATA_LEN: usize = 4 + 32 + 32;

/// A token transfer the wallet is asked to sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferCall {
    /// The token contract being called.
    pub token: Address,
    /// Who receives the tokens.
    pub recipient: Address,
    pub amount: TokenAmount,
}

impl TransferCall {
    #[must_use]
    pub fn new(token: Address, recipient: Address, amount: TokenAmount) -> Self {
        Self {
            token,
            recipient,
            amount,
        }
    }

    /// ABI-encoded calldata: `selector || pad32(recipient) || uint256(amount)`.
    #[must_use]
    pub fn calldata(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(TRANSFER_CALLDATA_LEN);
        data.extend_from_slice(&constants::ERC20_TRANSFER_SELECTOR);
        data.extend_from_slice(&[0u8; 12]);
        data.extend_from_slice(self.recipient.as_bytes());
        data.extend_from_slice(&[0u8; 16]);
        data.extend_from_slice(&self.amount.base_units().to_be_bytes());
        data
    }

    #[must_use]
    pub fn calldata_hex(&self) -> String {
        format!("0x{}", hex::encode(self.calldata()))
    }
}
