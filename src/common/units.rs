// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

//! Integer helpers for wei amounts. Display strings come from `format_units`,
//! never from float division.

use crate::domain::constants::WEI_PER_GWEI;
use crate::domain::error::AppError;
use alloy::primitives::utils::{format_units, parse_ether};
use alloy::primitives::{I256, U256};

pub fn gwei_to_wei(gwei: u64) -> u128 {
    (gwei as u128).saturating_mul(WEI_PER_GWEI)
}

/// `value * pct / 100`, floored.
pub fn scale_pct(value: u128, pct: u64) -> u128 {
    value.saturating_mul(pct as u128) / 100
}

/// `value + value * pct / 100`; with pct 4 this equals `value + value / 25`.
pub fn add_margin(value: u64, pct: u64) -> u64 {
    let extra = (value as u128).saturating_mul(pct as u128) / 100;
    value.saturating_add(u64::try_from(extra).unwrap_or(u64::MAX))
}

pub fn parse_eth_setting(field: &str, raw: &str) -> Result<U256, AppError> {
    parse_ether(raw.trim()).map_err(|e| AppError::Validation {
        field: field.to_string(),
        message: format!("'{raw}' is not a valid ether amount: {e}"),
    })
}

pub fn fmt_ether(wei: U256) -> String {
    format_units(wei, "ether").unwrap_or_else(|_| wei.to_string())
}

pub fn fmt_ether_signed(wei: I256) -> String {
    let abs = fmt_ether(wei.unsigned_abs());
    if wei.is_negative() { format!("-{abs}") } else { abs }
}

pub fn fmt_gwei(wei: u128) -> String {
    format_units(U256::from(wei), "gwei").unwrap_or_else(|_| wei.to_string())
}
