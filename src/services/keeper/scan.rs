// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::app::config::KeeperConfig;
use crate::common::error::AppError;
use crate::common::units::fmt_gwei;
use crate::data::registry::PoolRegistry;
use crate::domain::pool::{Decision, HarvestOutcome};
use crate::network::chain::ChainClient;
use crate::network::gas::GasOracle;
use crate::services::keeper::blacklist::Blacklist;
use crate::services::keeper::evaluator::Evaluator;
use crate::services::keeper::stats::KeeperStats;
use crate::services::keeper::unwrap::Unwrapper;
use std::sync::Arc;
use tokio::time::sleep;

/// What one pass over the pool list did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub pass: u64,
    /// Pools that were not blacklisted; drives the gas refresh cadence.
    pub counted: u64,
    pub skipped: u64,
    pub evaluated: u64,
    pub harvests_submitted: u64,
    pub harvests_confirmed: u64,
    pub gas_refreshes: u64,
    pub released: u64,
    pub aborted_on_gas: bool,
}

/// Owns the per-process keeper state and runs passes over the pool list.
pub struct ScanLoop {
    registry: Arc<PoolRegistry>,
    blacklist: Blacklist,
    oracle: GasOracle,
    evaluator: Evaluator,
    unwrapper: Unwrapper,
    stats: Arc<KeeperStats>,
    cfg: Arc<KeeperConfig>,
    pass: u64,
}

impl ScanLoop {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        cfg: Arc<KeeperConfig>,
        registry: PoolRegistry,
        blacklist: Blacklist,
        stats: Arc<KeeperStats>,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            blacklist,
            oracle: GasOracle::from_config(chain.clone(), &cfg),
            evaluator: Evaluator::new(chain.clone(), cfg.clone()),
            unwrapper: Unwrapper::new(chain, cfg.clone(), stats.clone()),
            stats,
            cfg,
            pass: 0,
        }
    }

    pub fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    pub fn stats(&self) -> Arc<KeeperStats> {
        self.stats.clone()
    }

    pub fn config(&self) -> &KeeperConfig {
        &self.cfg
    }

    async fn refresh_gas(&self) -> Result<u128, AppError> {
        let quote = self.oracle.current_gas_price().await?;
        self.stats.record_gas_price(quote.discounted_wei);
        tracing::info!(
            target: "gas",
            raw_gwei = %fmt_gwei(quote.raw_wei),
            discounted_gwei = %fmt_gwei(quote.discounted_wei),
            "Gas price"
        );
        Ok(quote.discounted_wei)
    }

    /// One pass: release cooldowns, price gas, unwrap, then walk the pools.
    /// RPC and contract errors end the pass and propagate.
    pub async fn run_pass(&mut self) -> Result<PassSummary, AppError> {
        self.pass += 1;
        self.stats.incr(&self.stats.passes_started);
        let mut summary = PassSummary {
            pass: self.pass,
            ..Default::default()
        };

        summary.released = self.blacklist.release_expired(self.pass).len() as u64;
        let mut gas_price = self.refresh_gas().await?;
        self.unwrapper.maybe_unwrap(gas_price).await;

        let registry = self.registry.clone();
        for pool in registry.pools() {
            let strategy = pool.strategy_address;
            if self.blacklist.get(&strategy) {
                summary.skipped += 1;
                self.stats.incr(&self.stats.pools_blacklisted_skipped);
                tracing::debug!(target: "scan", pool = %pool.name, %strategy, "Blacklisted, skipping");
                continue;
            }

            summary.counted += 1;
            if summary.counted % self.cfg.gas_refresh_every == 0 {
                gas_price = self.refresh_gas().await?;
                summary.gas_refreshes += 1;
                self.stats.incr(&self.stats.gas_refreshes);
            }

            if !self.oracle.can_execute(gas_price) {
                summary.aborted_on_gas = true;
                self.stats.incr(&self.stats.passes_aborted_gas);
                tracing::info!(
                    target: "scan",
                    pass = self.pass,
                    evaluated = summary.evaluated,
                    backoff_secs = self.cfg.gas_high_backoff.as_secs(),
                    "Gas above ceiling, ending pass"
                );
                sleep(self.cfg.gas_high_backoff).await;
                return Ok(summary);
            }

            let evaluation = self.evaluator.evaluate(pool, gas_price).await?;
            summary.evaluated += 1;
            self.stats.record_decision(evaluation.decision);

            let bad = match evaluation.decision {
                Decision::Harvest => {
                    summary.harvests_submitted += 1;
                    let outcome = self.evaluator.submit(pool, &evaluation).await;
                    match outcome {
                        HarvestOutcome::Confirmed { .. } => {
                            summary.harvests_confirmed += 1;
                            self.stats.incr(&self.stats.harvests_confirmed);
                        }
                        HarvestOutcome::Reverted { .. } => {
                            self.stats.incr(&self.stats.harvests_reverted);
                        }
                        HarvestOutcome::Failed { .. } => {
                            self.stats.incr(&self.stats.harvests_failed);
                        }
                        HarvestOutcome::DryRun => {}
                    }
                    !outcome.succeeded()
                }
                Decision::SkipGasHigh => true,
                Decision::SkipProfitLow | Decision::SkipRewardAnomalous => false,
            };
            self.blacklist.record_outcome(strategy, bad, self.pass);
        }

        self.stats.incr(&self.stats.passes_completed);
        tracing::info!(
            target: "scan",
            pass = self.pass,
            counted = summary.counted,
            skipped = summary.skipped,
            harvests = summary.harvests_submitted,
            "Pass complete"
        );
        Ok(summary)
    }
}
