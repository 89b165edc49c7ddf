// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::app::config::KeeperConfig;
use crate::common::error::AppError;
use crate::common::units::{fmt_gwei, gwei_to_wei, scale_pct};
use crate::network::chain::ChainClient;
use std::sync::Arc;

/// Raw network price and the discounted price the keeper actually pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasQuote {
    pub raw_wei: u128,
    pub discounted_wei: u128,
}

#[derive(Clone)]
pub struct GasOracle {
    chain: Arc<dyn ChainClient>,
    factor_pct: u64,
    max_gas_price_gwei: u64,
}

impl GasOracle {
    pub fn new(chain: Arc<dyn ChainClient>, factor_pct: u64, max_gas_price_gwei: u64) -> Self {
        Self {
            chain,
            factor_pct,
            max_gas_price_gwei,
        }
    }

    pub fn from_config(chain: Arc<dyn ChainClient>, cfg: &KeeperConfig) -> Self {
        Self::new(chain, cfg.gas_price_factor_pct, cfg.max_gas_price_gwei)
    }

    pub fn discount(&self, raw_wei: u128) -> u128 {
        scale_pct(raw_wei, self.factor_pct)
    }

    pub async fn current_gas_price(&self) -> Result<GasQuote, AppError> {
        let raw_wei = self.chain.gas_price().await?;
        Ok(GasQuote {
            raw_wei,
            discounted_wei: self.discount(raw_wei),
        })
    }

    /// `false` once the price, in gwei, is above the configured ceiling.
    pub fn can_execute(&self, gas_price_wei: u128) -> bool {
        if gas_price_wei > gwei_to_wei(self.max_gas_price_gwei) {
            tracing::warn!(
                target: "gas",
                gas_price_gwei = %fmt_gwei(gas_price_wei),
                ceiling_gwei = self.max_gas_price_gwei,
                "Gas is high, skipping"
            );
            return false;
        }
        true
    }
}
