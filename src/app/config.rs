// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::units::parse_eth_setting;
use crate::domain::constants::{self, DEFAULT_HTTP_PROVIDER, WEI_PER_ETHER, WFTM_FANTOM};
use crate::domain::error::AppError;
use alloy::primitives::{Address, U256};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

#[derive(Debug, Deserialize, Clone)]
pub struct GlobalSettings {
    // General
    #[serde(default = "default_false")]
    pub debug: bool,
    #[serde(default = "default_false")]
    pub log_json: bool,
    #[serde(default = "default_http_provider")]
    pub http_provider: String,

    // Identity
    pub wallet_key: String,
    pub wallet_address: Address,
    #[serde(default = "default_wrapped_native")]
    pub wrapped_native_address: Address,

    // Registry
    pub pools_path: Option<String>,
    pub blacklist_path: Option<String>,

    // Gas
    #[serde(default = "default_gas_price_factor_pct")]
    pub gas_price_factor_pct: u64,
    #[serde(default = "default_max_gas_price_gwei")]
    pub max_gas_price_gwei: u64,
    #[serde(default = "default_gas_refresh_every")]
    pub gas_refresh_every: u64,
    #[serde(default = "default_gas_report_margin_pct")]
    pub gas_report_margin_pct: u64,
    #[serde(default = "default_gas_submit_margin_pct")]
    pub gas_submit_margin_pct: u64,
    #[serde(default = "default_unwrap_gas_limit")]
    pub unwrap_gas_limit: u64,

    // Thresholds, decimal ether strings
    #[serde(default = "default_min_profit_eth")]
    pub min_profit_eth: String,
    #[serde(default = "default_max_reward_eth")]
    pub max_reward_eth: String,
    #[serde(default = "default_max_harvest_cost_eth")]
    pub max_harvest_cost_eth: String,
    #[serde(default = "default_unwrap_threshold_eth")]
    pub unwrap_threshold_eth: String,
    #[serde(default = "default_min_unwrap_eth")]
    pub min_unwrap_eth: String,

    // Pacing
    #[serde(default = "default_pass_delay_secs")]
    pub pass_delay_secs: u64,
    #[serde(default = "default_gas_high_backoff_secs")]
    pub gas_high_backoff_secs: u64,
    #[serde(default = "default_restart_backoff_secs")]
    pub restart_backoff_secs: u64,
    #[serde(default = "default_restart_backoff_max_secs")]
    pub restart_backoff_max_secs: u64,
    #[serde(default = "default_unwrap_retry_secs")]
    pub unwrap_retry_secs: u64,
    #[serde(default = "default_unwrap_idle_secs")]
    pub unwrap_idle_secs: u64,
    #[serde(default = "default_pre_submit_delay_secs")]
    pub pre_submit_delay_secs: u64,
    #[serde(default = "default_submit_failure_backoff_secs")]
    pub submit_failure_backoff_secs: u64,

    // Blacklist
    #[serde(default = "default_blacklist_mode")]
    pub blacklist_mode: String,
    #[serde(default = "default_blacklist_max_strikes")]
    pub blacklist_max_strikes: u32,
    #[serde(default = "default_blacklist_cooldown_passes")]
    pub blacklist_cooldown_passes: u64,

    // Liveness
    pub health_port: Option<u16>,
    pub keepalive_url: Option<String>,
    #[serde(default = "default_keepalive_interval_secs")]
    pub keepalive_interval_secs: u64,
}

// Defaults
fn default_false() -> bool {
    false
}
fn default_http_provider() -> String {
    DEFAULT_HTTP_PROVIDER.to_string()
}
fn default_wrapped_native() -> Address {
    WFTM_FANTOM
}
fn default_gas_price_factor_pct() -> u64 {
    constants::DEFAULT_GAS_PRICE_FACTOR_PCT
}
fn default_max_gas_price_gwei() -> u64 {
    constants::DEFAULT_MAX_GAS_PRICE_GWEI
}
fn default_gas_refresh_every() -> u64 {
    constants::DEFAULT_GAS_REFRESH_EVERY
}
fn default_gas_report_margin_pct() -> u64 {
    constants::DEFAULT_GAS_REPORT_MARGIN_PCT
}
fn default_gas_submit_margin_pct() -> u64 {
    constants::DEFAULT_GAS_SUBMIT_MARGIN_PCT
}
fn default_unwrap_gas_limit() -> u64 {
    constants::DEFAULT_UNWRAP_GAS_LIMIT
}
fn default_min_profit_eth() -> String {
    constants::DEFAULT_MIN_PROFIT_ETH.to_string()
}
fn default_max_reward_eth() -> String {
    constants::DEFAULT_MAX_REWARD_ETH.to_string()
}
fn default_max_harvest_cost_eth() -> String {
    constants::DEFAULT_MAX_HARVEST_COST_ETH.to_string()
}
fn default_unwrap_threshold_eth() -> String {
    constants::DEFAULT_UNWRAP_THRESHOLD_ETH.to_string()
}
fn default_min_unwrap_eth() -> String {
    constants::DEFAULT_MIN_UNWRAP_ETH.to_string()
}
fn default_pass_delay_secs() -> u64 {
    constants::DEFAULT_PASS_DELAY_SECS
}
fn default_gas_high_backoff_secs() -> u64 {
    constants::DEFAULT_GAS_HIGH_BACKOFF_SECS
}
fn default_restart_backoff_secs() -> u64 {
    constants::DEFAULT_RESTART_BACKOFF_SECS
}
fn default_restart_backoff_max_secs() -> u64 {
    constants::DEFAULT_RESTART_BACKOFF_MAX_SECS
}
fn default_unwrap_retry_secs() -> u64 {
    constants::DEFAULT_UNWRAP_RETRY_SECS
}
fn default_unwrap_idle_secs() -> u64 {
    constants::DEFAULT_UNWRAP_IDLE_SECS
}
fn default_pre_submit_delay_secs() -> u64 {
    constants::DEFAULT_PRE_SUBMIT_DELAY_SECS
}
fn default_submit_failure_backoff_secs() -> u64 {
    constants::DEFAULT_SUBMIT_FAILURE_BACKOFF_SECS
}
fn default_blacklist_mode() -> String {
    "strikes".to_string()
}
fn default_blacklist_max_strikes() -> u32 {
    constants::DEFAULT_BLACKLIST_MAX_STRIKES
}
fn default_blacklist_cooldown_passes() -> u64 {
    constants::DEFAULT_BLACKLIST_COOLDOWN_PASSES
}
fn default_keepalive_interval_secs() -> u64 {
    constants::DEFAULT_KEEPALIVE_INTERVAL_SECS
}

impl GlobalSettings {
    pub fn load_with_path(path: Option<&str>) -> Result<Self, AppError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let mut builder = Config::builder();
        if let Some(selected_path) = path {
            builder = builder.add_source(File::from(Path::new(selected_path)).required(true));
        } else {
            builder = builder.add_source(File::with_name("config").required(false));
        }
        // Precedence: CLI (in main) > env/.env > config file.
        builder = builder.add_source(Environment::default());

        let settings: GlobalSettings = builder.build()?.try_deserialize()?;

        if settings.wallet_key.trim().is_empty() {
            return Err(AppError::Config("WALLET_KEY is missing".to_string()));
        }
        Url::parse(&settings.http_provider)
            .map_err(|e| AppError::Config(format!("Invalid RPC URL: {}", e)))?;

        Ok(settings)
    }

    pub fn pools_path(&self) -> String {
        non_empty(self.pools_path.as_deref()).unwrap_or_else(|| "data/pools.json".to_string())
    }

    pub fn blacklist_path(&self) -> String {
        non_empty(self.blacklist_path.as_deref())
            .unwrap_or_else(|| "data/blacklist.json".to_string())
    }

    /// `PORT` wins so hosting platforms that inject it keep working.
    pub fn health_port_value(&self) -> u16 {
        std::env::var("PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .or(self.health_port)
            .unwrap_or(constants::DEFAULT_HEALTH_PORT)
    }

    pub fn keepalive_url_value(&self) -> Option<String> {
        non_empty(self.keepalive_url.as_deref())
    }

    pub fn keeper_config(&self, account: Address) -> Result<KeeperConfig, AppError> {
        if self.gas_price_factor_pct == 0 || self.gas_price_factor_pct > 100 {
            return Err(AppError::Validation {
                field: "gas_price_factor_pct".into(),
                message: format!("must be within 1..=100, got {}", self.gas_price_factor_pct),
            });
        }
        if self.gas_refresh_every == 0 {
            return Err(AppError::Validation {
                field: "gas_refresh_every".into(),
                message: "must be at least 1".into(),
            });
        }

        Ok(KeeperConfig {
            account,
            wrapped_native: self.wrapped_native_address,
            gas_price_factor_pct: self.gas_price_factor_pct,
            max_gas_price_gwei: self.max_gas_price_gwei,
            gas_refresh_every: self.gas_refresh_every,
            gas_report_margin_pct: self.gas_report_margin_pct,
            gas_submit_margin_pct: self.gas_submit_margin_pct,
            unwrap_gas_limit: self.unwrap_gas_limit,
            min_profit_wei: parse_eth_setting("min_profit_eth", &self.min_profit_eth)?,
            max_reward_wei: parse_eth_setting("max_reward_eth", &self.max_reward_eth)?,
            max_harvest_cost_wei: parse_eth_setting(
                "max_harvest_cost_eth",
                &self.max_harvest_cost_eth,
            )?,
            unwrap_threshold_wei: parse_eth_setting(
                "unwrap_threshold_eth",
                &self.unwrap_threshold_eth,
            )?,
            min_unwrap_wei: parse_eth_setting("min_unwrap_eth", &self.min_unwrap_eth)?,
            pass_delay: Duration::from_secs(self.pass_delay_secs),
            gas_high_backoff: Duration::from_secs(self.gas_high_backoff_secs),
            restart_backoff: Duration::from_secs(self.restart_backoff_secs),
            restart_backoff_max: Duration::from_secs(self.restart_backoff_max_secs),
            unwrap_retry: Duration::from_secs(self.unwrap_retry_secs),
            unwrap_idle: Duration::from_secs(self.unwrap_idle_secs),
            pre_submit_delay: Duration::from_secs(self.pre_submit_delay_secs),
            submit_failure_backoff: Duration::from_secs(self.submit_failure_backoff_secs),
            blacklist_policy: BlacklistPolicy::from_str(&self.blacklist_mode)?
                .with_limits(self.blacklist_max_strikes, self.blacklist_cooldown_passes),
            dry_run: false,
        })
    }
}

/// How live evaluation outcomes feed back into the skip map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlacklistPolicy {
    /// Every evaluation writes `false`; only the seed snapshot ever skips a pool.
    Literal,
    /// Consecutive bad outcomes put a pool on a timed skip.
    Strikes { max_strikes: u32, cooldown_passes: u64 },
}

impl BlacklistPolicy {
    fn with_limits(self, max_strikes: u32, cooldown_passes: u64) -> Self {
        match self {
            BlacklistPolicy::Literal => BlacklistPolicy::Literal,
            BlacklistPolicy::Strikes { .. } => BlacklistPolicy::Strikes {
                max_strikes: max_strikes.max(1),
                cooldown_passes: cooldown_passes.max(1),
            },
        }
    }
}

impl Default for BlacklistPolicy {
    fn default() -> Self {
        BlacklistPolicy::Strikes {
            max_strikes: constants::DEFAULT_BLACKLIST_MAX_STRIKES,
            cooldown_passes: constants::DEFAULT_BLACKLIST_COOLDOWN_PASSES,
        }
    }
}

impl FromStr for BlacklistPolicy {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "literal" | "seed_only" => Ok(BlacklistPolicy::Literal),
            "strikes" | "" => Ok(BlacklistPolicy::default()),
            other => Err(AppError::Validation {
                field: "blacklist_mode".into(),
                message: format!("unknown mode '{other}', expected 'strikes' or 'literal'"),
            }),
        }
    }
}

/// Typed keeper tunables, built once at startup and shared by every component.
#[derive(Debug, Clone)]
pub struct KeeperConfig {
    pub account: Address,
    pub wrapped_native: Address,
    pub gas_price_factor_pct: u64,
    pub max_gas_price_gwei: u64,
    pub gas_refresh_every: u64,
    pub gas_report_margin_pct: u64,
    pub gas_submit_margin_pct: u64,
    pub unwrap_gas_limit: u64,
    pub min_profit_wei: U256,
    pub max_reward_wei: U256,
    pub max_harvest_cost_wei: U256,
    pub unwrap_threshold_wei: U256,
    pub min_unwrap_wei: U256,
    pub pass_delay: Duration,
    pub gas_high_backoff: Duration,
    pub restart_backoff: Duration,
    pub restart_backoff_max: Duration,
    pub unwrap_retry: Duration,
    pub unwrap_idle: Duration,
    pub pre_submit_delay: Duration,
    pub submit_failure_backoff: Duration,
    pub blacklist_policy: BlacklistPolicy,
    pub dry_run: bool,
}

impl KeeperConfig {
    /// Defaults for a given account and wrapped-native token.
    pub fn with_defaults(account: Address, wrapped_native: Address) -> Self {
        let ether = |units: u128| U256::from(units);
        Self {
            account,
            wrapped_native,
            gas_price_factor_pct: constants::DEFAULT_GAS_PRICE_FACTOR_PCT,
            max_gas_price_gwei: constants::DEFAULT_MAX_GAS_PRICE_GWEI,
            gas_refresh_every: constants::DEFAULT_GAS_REFRESH_EVERY,
            gas_report_margin_pct: constants::DEFAULT_GAS_REPORT_MARGIN_PCT,
            gas_submit_margin_pct: constants::DEFAULT_GAS_SUBMIT_MARGIN_PCT,
            unwrap_gas_limit: constants::DEFAULT_UNWRAP_GAS_LIMIT,
            min_profit_wei: ether(WEI_PER_ETHER / 10),
            max_reward_wei: ether(500 * WEI_PER_ETHER),
            max_harvest_cost_wei: ether(2 * WEI_PER_ETHER),
            unwrap_threshold_wei: ether(WEI_PER_ETHER),
            min_unwrap_wei: ether(WEI_PER_ETHER),
            pass_delay: Duration::from_secs(constants::DEFAULT_PASS_DELAY_SECS),
            gas_high_backoff: Duration::from_secs(constants::DEFAULT_GAS_HIGH_BACKOFF_SECS),
            restart_backoff: Duration::from_secs(constants::DEFAULT_RESTART_BACKOFF_SECS),
            restart_backoff_max: Duration::from_secs(constants::DEFAULT_RESTART_BACKOFF_MAX_SECS),
            unwrap_retry: Duration::from_secs(constants::DEFAULT_UNWRAP_RETRY_SECS),
            unwrap_idle: Duration::from_secs(constants::DEFAULT_UNWRAP_IDLE_SECS),
            pre_submit_delay: Duration::from_secs(constants::DEFAULT_PRE_SUBMIT_DELAY_SECS),
            submit_failure_backoff: Duration::from_secs(
                constants::DEFAULT_SUBMIT_FAILURE_BACKOFF_SECS,
            ),
            blacklist_policy: BlacklistPolicy::default(),
            dry_run: false,
        }
    }
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
