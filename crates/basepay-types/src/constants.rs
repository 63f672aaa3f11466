//! System-wide constants for basepay.

use crate::ids::Address;

/// Fractional digits of the settlement token (USDC).
pub const TOKEN_DECIMALS: u32 = 6;

/// Base units per whole token (`10^TOKEN_DECIMALS`).
pub const TOKEN_UNIT: u128 = 1_000_000;

/// Settlement token symbol.
pub const TOKEN_SYMBOL: &str = "USDC";

/// USDC contract on Base mainnet, `0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913`.
pub const BASE_USDC_ADDRESS: Address = Address([
    0x83, 0x35, 0x89, 0xfc, 0xd6, 0xed, 0xb6, 0xe0, 0x8f, 0x4c, 0x7c, 0x32, 0xd4, 0xf7, 0x1b, 0x54,
    0xbd, 0xa0, 0x29, 0x13,
]);

/// Base mainnet chain id.
pub const BASE_MAINNET_CHAIN_ID: u64 = 8453;

/// Base mainnet public RPC endpoint.
pub const BASE_MAINNET_RPC_URL: &str = "https://mainnet.base.org";

/// Base mainnet block explorer.
pub const BASE_MAINNET_EXPLORER_URL: &str = "https://basescan.org";

/// Default time to wait for a submitted transfer to be confirmed, in milliseconds.
pub const DEFAULT_CONFIRMATION_TIMEOUT_MS: u64 = 120_000;

/// Age after which a balance snapshot is reported as stale, in milliseconds.
pub const DEFAULT_BALANCE_MAX_AGE_MS: u64 = 30_000;

/// ERC-20 `transfer(address,uint256)` function selector.
pub const ERC20_TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usdc_address_matches_checksummed_form() {
        let parsed: Address = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913".parse().unwrap();
        assert_eq!(BASE_USDC_ADDRESS, parsed);
        assert_eq!(
            BASE_USDC_ADDRESS.to_string(),
            "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913"
        );
    }
}
