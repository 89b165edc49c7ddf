// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::domain::pool::Decision;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared between the keeper loop and the health endpoint.
#[derive(Default)]
pub struct KeeperStats {
    pub passes_started: AtomicU64,
    pub passes_completed: AtomicU64,
    pub passes_aborted_gas: AtomicU64,
    pub pass_failures: AtomicU64,
    pub pools_evaluated: AtomicU64,
    pub pools_blacklisted_skipped: AtomicU64,
    pub gas_refreshes: AtomicU64,
    pub decide_harvest: AtomicU64,
    pub decide_profit_low: AtomicU64,
    pub decide_gas_high: AtomicU64,
    pub decide_reward_anomalous: AtomicU64,
    pub harvests_confirmed: AtomicU64,
    pub harvests_reverted: AtomicU64,
    pub harvests_failed: AtomicU64,
    pub unwraps: AtomicU64,
    pub unwrap_failures: AtomicU64,
    /// Discounted gas price in wei; saturates at `u64::MAX`.
    pub last_gas_price_wei: AtomicU64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub passes_started: u64,
    pub passes_completed: u64,
    pub passes_aborted_gas: u64,
    pub pass_failures: u64,
    pub pools_evaluated: u64,
    pub pools_blacklisted_skipped: u64,
    pub gas_refreshes: u64,
    pub decide_harvest: u64,
    pub decide_profit_low: u64,
    pub decide_gas_high: u64,
    pub decide_reward_anomalous: u64,
    pub harvests_confirmed: u64,
    pub harvests_reverted: u64,
    pub harvests_failed: u64,
    pub unwraps: u64,
    pub unwrap_failures: u64,
    pub last_gas_price_wei: u64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl KeeperStats {
    pub fn record_decision(&self, decision: Decision) {
        bump(&self.pools_evaluated);
        match decision {
            Decision::Harvest => bump(&self.decide_harvest),
            Decision::SkipProfitLow => bump(&self.decide_profit_low),
            Decision::SkipGasHigh => bump(&self.decide_gas_high),
            Decision::SkipRewardAnomalous => bump(&self.decide_reward_anomalous),
        }
    }

    pub fn record_gas_price(&self, wei: u128) {
        let clamped = u64::try_from(wei).unwrap_or(u64::MAX);
        self.last_gas_price_wei.store(clamped, Ordering::Relaxed);
    }

    pub fn incr(&self, counter: &AtomicU64) {
        bump(counter);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        StatsSnapshot {
            passes_started: load(&self.passes_started),
            passes_completed: load(&self.passes_completed),
            passes_aborted_gas: load(&self.passes_aborted_gas),
            pass_failures: load(&self.pass_failures),
            pools_evaluated: load(&self.pools_evaluated),
            pools_blacklisted_skipped: load(&self.pools_blacklisted_skipped),
            gas_refreshes: load(&self.gas_refreshes),
            decide_harvest: load(&self.decide_harvest),
            decide_profit_low: load(&self.decide_profit_low),
            decide_gas_high: load(&self.decide_gas_high),
            decide_reward_anomalous: load(&self.decide_reward_anomalous),
            harvests_confirmed: load(&self.harvests_confirmed),
            harvests_reverted: load(&self.harvests_reverted),
            harvests_failed: load(&self.harvests_failed),
            unwraps: load(&self.unwraps),
            unwrap_failures: load(&self.unwrap_failures),
            last_gas_price_wei: load(&self.last_gas_price_wei),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decisions_land_in_their_buckets() {
        let stats = KeeperStats::default();
        stats.record_decision(Decision::Harvest);
        stats.record_decision(Decision::SkipProfitLow);
        stats.record_decision(Decision::SkipProfitLow);
        stats.record_gas_price(u128::MAX);

        let snap = stats.snapshot();
        assert_eq!(snap.pools_evaluated, 3);
        assert_eq!(snap.decide_harvest, 1);
        assert_eq!(snap.decide_profit_low, 2);
        assert_eq!(snap.last_gas_price_wei, u64::MAX);
    }
}
