// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::app::config::KeeperConfig;
use crate::common::error::AppError;
use crate::common::units::{add_margin, fmt_ether, fmt_ether_signed, fmt_gwei};
use crate::domain::pool::{Decision, Evaluation, HarvestOutcome, Pool};
use crate::network::chain::ChainClient;
use alloy::primitives::{I256, U256};
use std::sync::Arc;
use tokio::time::sleep;

fn to_signed(value: U256) -> I256 {
    I256::try_from(value).unwrap_or(I256::MAX)
}

/// Decides whether harvesting a pool pays for itself, and sends the harvest.
#[derive(Clone)]
pub struct Evaluator {
    chain: Arc<dyn ChainClient>,
    cfg: Arc<KeeperConfig>,
}

impl Evaluator {
    pub fn new(chain: Arc<dyn ChainClient>, cfg: Arc<KeeperConfig>) -> Self {
        Self { chain, cfg }
    }

    /// Read-only: reward read, gas estimate, and the resulting decision.
    /// RPC and contract errors propagate to the caller.
    pub async fn evaluate(&self, pool: &Pool, gas_price_wei: u128) -> Result<Evaluation, AppError> {
        let strategy = pool.strategy_address;
        let reward_wei = self.chain.harvest_reward(strategy).await?;

        if reward_wei > self.cfg.max_reward_wei {
            tracing::warn!(
                target: "harvest",
                pool = %pool.name,
                %strategy,
                reward = %fmt_ether(reward_wei),
                ceiling = %fmt_ether(self.cfg.max_reward_wei),
                "Reward above sanity ceiling, skipping"
            );
            return Ok(Evaluation::anomalous_reward(reward_wei, gas_price_wei));
        }

        let gas_estimate = self.chain.estimate_harvest_gas(strategy).await?;
        let report_gas = add_margin(gas_estimate, self.cfg.gas_report_margin_pct);
        let submit_gas_limit = add_margin(gas_estimate, self.cfg.gas_submit_margin_pct);

        let cost_wei = U256::from(report_gas).saturating_mul(U256::from(gas_price_wei));
        let profit_wei = to_signed(reward_wei).saturating_sub(to_signed(cost_wei));

        let decision = if cost_wei > self.cfg.max_harvest_cost_wei {
            Decision::SkipGasHigh
        } else if profit_wei >= to_signed(self.cfg.min_profit_wei) {
            Decision::Harvest
        } else {
            Decision::SkipProfitLow
        };

        tracing::info!(
            target: "harvest",
            pool = %pool.name,
            %strategy,
            reward = %fmt_ether(reward_wei),
            gas = report_gas,
            gas_price_gwei = %fmt_gwei(gas_price_wei),
            cost = %fmt_ether(cost_wei),
            profit = %fmt_ether_signed(profit_wei),
            decision = decision.as_str(),
            "Evaluated pool"
        );

        Ok(Evaluation {
            decision,
            reward_wei,
            gas_estimate: Some(gas_estimate),
            report_gas,
            submit_gas_limit,
            gas_price_wei,
            cost_wei,
            profit_wei,
        })
    }

    /// Send `harvest()` for an evaluation that said so. Failures are logged,
    /// followed by a short back-off, and never returned as errors.
    pub async fn submit(&self, pool: &Pool, evaluation: &Evaluation) -> HarvestOutcome {
        let strategy = pool.strategy_address;
        if self.cfg.dry_run {
            tracing::info!(
                target: "harvest",
                pool = %pool.name,
                %strategy,
                gas_limit = evaluation.submit_gas_limit,
                gas_price_gwei = %fmt_gwei(evaluation.gas_price_wei),
                "Dry run: would harvest"
            );
            return HarvestOutcome::DryRun;
        }

        sleep(self.cfg.pre_submit_delay).await;

        let outcome = match self
            .chain
            .send_harvest(strategy, evaluation.submit_gas_limit, evaluation.gas_price_wei)
            .await
        {
            Ok(receipt) if receipt.success => {
                tracing::info!(
                    target: "harvest",
                    pool = %pool.name,
                    hash = %receipt.hash,
                    profit = %fmt_ether_signed(evaluation.profit_wei),
                    "Harvest confirmed"
                );
                return HarvestOutcome::Confirmed { hash: receipt.hash };
            }
            Ok(receipt) => {
                tracing::warn!(
                    target: "harvest",
                    pool = %pool.name,
                    hash = %receipt.hash,
                    "Harvest reverted"
                );
                HarvestOutcome::Reverted { hash: receipt.hash }
            }
            Err(e) => {
                tracing::error!(
                    target: "harvest",
                    pool = %pool.name,
                    %strategy,
                    error = %e,
                    "Harvest submission failed"
                );
                HarvestOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        sleep(self.cfg.submit_failure_backoff).await;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::constants::WEI_PER_ETHER;
    use crate::network::mock::MockChain;
    use alloy::primitives::Address;
    use std::time::Duration;

    fn eth_milli(milli: u128) -> U256 {
        U256::from(milli * WEI_PER_ETHER / 1_000)
    }

    fn setup(reward: U256, estimate: u64) -> (Evaluator, Arc<MockChain>, Pool) {
        let pool = Pool::new("BOO-FTM", Address::with_last_byte(0x42));
        let chain = Arc::new(MockChain::default());
        {
            let mut s = chain.state();
            s.rewards.insert(pool.strategy_address, reward);
            s.gas_estimates.insert(pool.strategy_address, estimate);
        }
        let cfg = KeeperConfig::with_defaults(Address::with_last_byte(1), Address::with_last_byte(2));
        (Evaluator::new(chain.clone(), Arc::new(cfg)), chain, pool)
    }

    #[tokio::test]
    async fn anomalous_reward_skips_gas_estimation() {
        let (ev, chain, pool) = setup(U256::from(600u128 * WEI_PER_ETHER), 1_000_000);
        let out = ev.evaluate(&pool, 1_000_000_000).await.unwrap();
        assert_eq!(out.decision, Decision::SkipRewardAnomalous);
        assert_eq!(out.gas_estimate, None);
        assert_eq!(chain.state().gas_estimate_calls, 0);
        assert!(chain.state().harvests.is_empty());
    }

    #[tokio::test]
    async fn profitable_pool_is_harvested() {
        // 1.1M reporting gas at ~45.45 gwei is ~0.05 ether.
        let (ev, _chain, pool) = setup(eth_milli(500), 1_000_000);
        let price = 45_454_545_455u128;
        let out = ev.evaluate(&pool, price).await.unwrap();

        assert_eq!(out.report_gas, 1_100_000);
        assert_eq!(out.submit_gas_limit, 1_040_000);
        assert_eq!(out.cost_wei, U256::from(1_100_000u128 * price));
        assert_eq!(
            out.profit_wei,
            to_signed(eth_milli(500)) - to_signed(out.cost_wei)
        );
        assert_eq!(out.decision, Decision::Harvest);
    }

    #[tokio::test]
    async fn thin_margin_is_profit_low() {
        // 11M reporting gas at ~40.9 gwei is ~0.45 ether, leaving ~0.05.
        let (ev, _chain, pool) = setup(eth_milli(500), 10_000_000);
        let out = ev.evaluate(&pool, 40_909_090_909).await.unwrap();
        assert_eq!(out.decision, Decision::SkipProfitLow);
        assert!(out.profit_wei > I256::ZERO);
    }

    #[tokio::test]
    async fn cost_above_ceiling_is_gas_high() {
        let (ev, _chain, pool) = setup(U256::from(400u128 * WEI_PER_ETHER), 1_000_000);
        // 1.1M gas at 2000 gwei costs 2.2 ether.
        let out = ev.evaluate(&pool, 2_000_000_000_000).await.unwrap();
        assert_eq!(out.decision, Decision::SkipGasHigh);
        assert_eq!(out.cost_wei, U256::from(2_200_000_000_000_000_000u128));
    }

    #[tokio::test]
    async fn evaluate_is_idempotent_and_read_only() {
        let (ev, chain, pool) = setup(eth_milli(500), 1_000_000);
        let a = ev.evaluate(&pool, 45_000_000_000).await.unwrap();
        let b = ev.evaluate(&pool, 45_000_000_000).await.unwrap();
        assert_eq!(a, b);
        assert!(chain.state().harvests.is_empty());
    }

    #[tokio::test]
    async fn reward_read_error_propagates() {
        let (ev, chain, pool) = setup(eth_milli(500), 1_000_000);
        chain.state().failing_reward_reads.insert(pool.strategy_address);
        let err = ev.evaluate(&pool, 1).await.unwrap_err();
        assert!(matches!(err, AppError::Contract { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn submit_sends_with_submission_limit_after_delay() {
        let (ev, chain, pool) = setup(eth_milli(500), 1_000_000);
        let eval = ev.evaluate(&pool, 45_000_000_000).await.unwrap();

        let started = tokio::time::Instant::now();
        let outcome = ev.submit(&pool, &eval).await;

        assert!(matches!(outcome, HarvestOutcome::Confirmed { .. }));
        assert!(started.elapsed() >= Duration::from_secs(5));
        assert!(started.elapsed() < Duration::from_secs(6));
        assert_eq!(
            chain.state().harvests,
            vec![(pool.strategy_address, 1_040_000, 45_000_000_000)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn submit_failure_is_swallowed_with_backoff() {
        let (ev, chain, pool) = setup(eth_milli(500), 1_000_000);
        chain.state().failing_harvests.insert(pool.strategy_address);
        let eval = ev.evaluate(&pool, 45_000_000_000).await.unwrap();

        let started = tokio::time::Instant::now();
        let outcome = ev.submit(&pool, &eval).await;

        assert!(matches!(outcome, HarvestOutcome::Failed { .. }));
        assert!(started.elapsed() >= Duration::from_secs(5 + 15));
    }

    #[tokio::test]
    async fn dry_run_sends_nothing() {
        let (_, chain, pool) = setup(eth_milli(500), 1_000_000);
        let mut cfg = KeeperConfig::with_defaults(Address::ZERO, Address::ZERO);
        cfg.dry_run = true;
        let ev = Evaluator::new(chain.clone(), Arc::new(cfg));
        let eval = ev.evaluate(&pool, 45_000_000_000).await.unwrap();
        assert_eq!(ev.submit(&pool, &eval).await, HarvestOutcome::DryRun);
        assert!(chain.state().harvests.is_empty());
    }
}
