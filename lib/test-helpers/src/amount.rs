//! Fixed-point amount helpers.

use alloy::primitives::{
    uint,
    utils::{parse_units, ParseUnits},
    U256,
};
use eyre::bail;

/// 1e18, the scale of most ERC-20 tokens.
pub const WAD: U256 = uint!(1_000_000_000_000_000_000_U256);

/// 1e27, the scale used by ray-based accounting.
pub const RAY: U256 = uint!(1_000_000_000_000_000_000_000_000_000_U256);

/// Parses a non-negative decimal string at the given number of decimals,
/// e.g. `units("1.5", 6) == 1_500_000`.
///
/// # Errors
///
/// May fail on malformed or negative input, or when the fractional part
/// has more digits than `decimals`.
pub fn units(value: &str, decimals: u8) -> eyre::Result<U256> {
    match parse_units(value, decimals)? {
        ParseUnits::U256(value) => Ok(value),
        ParseUnits::I256(_) => bail!("amounts cannot be negative: {value}"),
    }
}

/// Parses an 18-decimals amount.
///
/// # Errors
///
/// Same failure modes as [`units`].
pub fn wad(value: &str) -> eyre::Result<U256> {
    units(value, 18)
}

/// Parses a 27-decimals amount.
///
/// # Errors
///
/// Same failure modes as [`units`].
pub fn ray(value: &str) -> eyre::Result<U256> {
    units(value, 27)
}
