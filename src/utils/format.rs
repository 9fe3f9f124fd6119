//! Formatting utilities for addresses and token amounts.

use alloy_primitives::U256;

use crate::config::eth_address;

/// Format Ethereum address for display (0x1234...5678).
///
/// Input that is too short, or that cannot be split on character
/// boundaries, is returned unchanged.
pub fn format_eth_address(address: &str) -> String {
    if address.len() < eth_address::FULL_LEN {
        return address.to_string();
    }
    match (
        address.get(..eth_address::PREFIX_LEN),
        address.get(eth_address::SUFFIX_START..),
    ) {
        (Some(prefix), Some(suffix)) => format!("{}...{}", prefix, suffix),
        _ => address.to_string(),
    }
}

/// Format an amount in the token's smallest unit as whole tokens
/// (e.g. `1500000000000000000` with 18 decimals → `"1.5"`).
pub fn format_token_amount(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    }
}
