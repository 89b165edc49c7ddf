// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use alloy::primitives::{Address, address};

// Wrapped native assets
pub const WFTM_FANTOM: Address = address!("21be370D5312f44cB42ce377BC9b8a0cEF1A4C83");

// =============================================================================
// NETWORK CONSTANTS
// =============================================================================

pub const CHAIN_FANTOM: u64 = 250;
pub const DEFAULT_HTTP_PROVIDER: &str = "https://rpc.ftm.tools/";

pub fn wrapped_native_for_chain(chain_id: u64) -> Option<Address> {
    match chain_id {
        CHAIN_FANTOM => Some(WFTM_FANTOM),
        _ => None,
    }
}

// =============================================================================
// UNITS
// =============================================================================

pub const WEI_PER_GWEI: u128 = 1_000_000_000;
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

// =============================================================================
// KEEPER DEFAULTS
// =============================================================================

pub const DEFAULT_GAS_PRICE_FACTOR_PCT: u64 = 80;
pub const DEFAULT_MAX_GAS_PRICE_GWEI: u64 = 300;
pub const DEFAULT_MIN_PROFIT_ETH: &str = "0.1";
// Some strategies report a nonsensical caller fee; anything above this is ignored.
pub const DEFAULT_MAX_REWARD_ETH: &str = "500";
pub const DEFAULT_MAX_HARVEST_COST_ETH: &str = "2";
pub const DEFAULT_UNWRAP_THRESHOLD_ETH: &str = "1";
pub const DEFAULT_MIN_UNWRAP_ETH: &str = "1";

pub const DEFAULT_GAS_REFRESH_EVERY: u64 = 20;
pub const DEFAULT_GAS_REPORT_MARGIN_PCT: u64 = 10;
pub const DEFAULT_GAS_SUBMIT_MARGIN_PCT: u64 = 4;
pub const DEFAULT_UNWRAP_GAS_LIMIT: u64 = 155_000;

pub const DEFAULT_PASS_DELAY_SECS: u64 = 1;
pub const DEFAULT_GAS_HIGH_BACKOFF_SECS: u64 = 20;
pub const DEFAULT_RESTART_BACKOFF_SECS: u64 = 30;
pub const DEFAULT_RESTART_BACKOFF_MAX_SECS: u64 = 300;
pub const DEFAULT_UNWRAP_RETRY_SECS: u64 = 5;
pub const DEFAULT_UNWRAP_IDLE_SECS: u64 = 60;
pub const DEFAULT_PRE_SUBMIT_DELAY_SECS: u64 = 5;
pub const DEFAULT_SUBMIT_FAILURE_BACKOFF_SECS: u64 = 15;

pub const DEFAULT_BLACKLIST_MAX_STRIKES: u32 = 3;
pub const DEFAULT_BLACKLIST_COOLDOWN_PASSES: u64 = 10;

pub const DEFAULT_HEALTH_PORT: u16 = 3000;
pub const DEFAULT_KEEPALIVE_INTERVAL_SECS: u64 = 300;
