// SPDX-License-Identifier: MIT

use crate::domain::error::AppError;
use alloy::primitives::{Address, U256};
use std::str::FromStr;

pub fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

pub fn parse_address_hex(s: &str) -> Option<Address> {
    Address::from_str(strip_0x(s)).ok()
}

/// Render an address as a short `0x1234…abcd` form for logs and symbol
/// fallbacks.
pub fn short_address(addr: Address) -> String {
    let full = format!("{addr:#x}");
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}

/// Parse a human decimal amount (e.g. "10.5") into the token's smallest unit.
///
/// Integer arithmetic only. Rejects malformed input and fractional digits
/// beyond the token's precision rather than silently rounding.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, AppError> {
    let invalid = |message: &str| AppError::Validation {
        field: "amount".into(),
        message: format!("{message}: {amount:?}"),
    };

    let trimmed = amount.trim();
    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (trimmed, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid("empty amount"));
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid("not a decimal number"));
    }
    if frac_part.len() > decimals as usize {
        return Err(invalid("too many fractional digits for token precision"));
    }

    let scale = U256::from(10u64).pow(U256::from(decimals));
    let int_units = if int_part.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(int_part, 10).map_err(|_| invalid("integer part out of range"))?
    };
    let frac_units = if frac_part.is_empty() {
        U256::ZERO
    } else {
        let padded = U256::from_str_radix(frac_part, 10)
            .map_err(|_| invalid("fractional part out of range"))?;
        let shift = U256::from(10u64).pow(U256::from(decimals as usize - frac_part.len()));
        padded
            .checked_mul(shift)
            .ok_or_else(|| invalid("amount overflows"))?
    };

    int_units
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac_units))
        .ok_or_else(|| invalid("amount overflows"))
}

/// Format a smallest-unit amount back into a human decimal string.
pub fn format_units(amount: U256, decimals: u8) -> String {
    let scale = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / scale;
    let frac = amount % scale;
    if frac.is_zero() {
        return whole.to_string();
    }
    let frac_str = format!("{:0>width$}", frac, width = decimals as usize);
    format!("{}.{}", whole, frac_str.trim_end_matches('0'))
}
