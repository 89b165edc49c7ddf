// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use alloy::primitives::{Address, B256, I256, U256};
use serde::Deserialize;

/// A harvestable strategy. Identity is the strategy address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub name: String,
    pub strategy_address: Address,
}

impl Pool {
    pub fn new(name: impl Into<String>, strategy_address: Address) -> Self {
        Self {
            name: name.into(),
            strategy_address,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Decision {
    Harvest,
    SkipProfitLow,
    SkipGasHigh,
    SkipRewardAnomalous,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Harvest => "harvest",
            Decision::SkipProfitLow => "profit_low",
            Decision::SkipGasHigh => "gas_high",
            Decision::SkipRewardAnomalous => "reward_anomalous",
        }
    }
}

/// Everything the evaluator learned about one pool at one gas price.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub decision: Decision,
    pub reward_wei: U256,
    /// Raw `eth_estimateGas` result; `None` when the reward was rejected first.
    pub gas_estimate: Option<u64>,
    pub report_gas: u64,
    pub submit_gas_limit: u64,
    pub gas_price_wei: u128,
    pub cost_wei: U256,
    pub profit_wei: I256,
}

impl Evaluation {
    pub fn anomalous_reward(reward_wei: U256, gas_price_wei: u128) -> Self {
        Self {
            decision: Decision::SkipRewardAnomalous,
            reward_wei,
            gas_estimate: None,
            report_gas: 0,
            submit_gas_limit: 0,
            gas_price_wei,
            cost_wei: U256::ZERO,
            profit_wei: I256::ZERO,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HarvestOutcome {
    Confirmed { hash: B256 },
    Reverted { hash: B256 },
    Failed { reason: String },
    DryRun,
}

impl HarvestOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, HarvestOutcome::Confirmed { .. } | HarvestOutcome::DryRun)
    }
}

/// Result of one submitted transaction once its receipt is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    pub hash: B256,
    pub success: bool,
}
