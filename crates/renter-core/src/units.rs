//! # Human-Readable Units
//!
//! Parsing for byte sizes (`4MiB`, `10 GB`) and block durations (`2w`,
//! `1y`) as accepted on the command line and in environment configuration.
//! Block durations assume 144 blocks per day.

use crate::error::UnitError;

const BLOCKS_PER_DAY: u64 = 144;

fn split_number(s: &str) -> Result<(u64, String), UnitError> {
    let s = s.trim();
    let digits = s.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return Err(UnitError::Malformed(s.to_string()));
    }
    let value = s[..digits]
        .parse::<u64>()
        .map_err(|_| UnitError::Overflow(s.to_string()))?;
    Ok((value, s[digits..].trim().to_ascii_lowercase()))
}

/// Parse a byte size with a mandatory unit.
///
/// Binary units: `b`, `kib`, `mib`, `gib`, `tib`. Decimal units: `kb`,
/// `mb`, `gb`, `tb`. Units are case-insensitive.
pub fn parse_byte_size(s: &str) -> Result<u64, UnitError> {
    let (value, unit) = split_number(s)?;
    let scale: u64 = match unit.as_str() {
        "b" => 1,
        "kib" => 1 << 10,
        "mib" => 1 << 20,
        "gib" => 1 << 30,
        "tib" => 1 << 40,
        "kb" => 1_000,
        "mb" => 1_000_000,
        "gb" => 1_000_000_000,
        "tb" => 1_000_000_000_000,
        _ => return Err(UnitError::UnknownUnit(unit)),
    };
    value
        .checked_mul(scale)
        .ok_or_else(|| UnitError::Overflow(s.to_string()))
}

/// Parse a duration into a block count.
///
/// Units: `d` (144 blocks), `w` (1008), `m` (30 days, 4320), `y`
/// (365 days, 52560).
pub fn parse_block_duration(s: &str) -> Result<u64, UnitError> {
    let (value, unit) = split_number(s)?;
    let days: u64 = match unit.as_str() {
        "d" => 1,
        "w" => 7,
        "m" => 30,
        "y" => 365,
        _ => return Err(UnitError::UnknownUnit(unit)),
    };
    value
        .checked_mul(days * BLOCKS_PER_DAY)
        .ok_or_else(|| UnitError::Overflow(s.to_string()))
}
