// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::app::config::KeeperConfig;
use crate::common::error::AppError;
use crate::common::retry::Backoff;
use crate::common::units::fmt_ether;
use crate::network::chain::ChainClient;
use crate::services::keeper::stats::KeeperStats;
use alloy::primitives::{B256, U256};
use std::sync::Arc;
use tokio::time::sleep;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnwrapOutcome {
    /// Native balance already at or above the floor.
    NotNeeded,
    /// Wrapped balance below the minimum worth unwrapping.
    NothingToUnwrap,
    Unwrapped { amount: U256, hash: B256 },
}

/// Keeps native balance topped up from the wrapped-native token.
pub struct Unwrapper {
    chain: Arc<dyn ChainClient>,
    cfg: Arc<KeeperConfig>,
    stats: Arc<KeeperStats>,
}

impl Unwrapper {
    pub fn new(chain: Arc<dyn ChainClient>, cfg: Arc<KeeperConfig>, stats: Arc<KeeperStats>) -> Self {
        Self { chain, cfg, stats }
    }

    /// Runs until one attempt completes; failures retry at a fixed interval.
    pub async fn maybe_unwrap(&self, gas_price_wei: u128) -> UnwrapOutcome {
        let mut backoff = Backoff::fixed(self.cfg.unwrap_retry);
        loop {
            match self.try_unwrap(gas_price_wei).await {
                Ok(UnwrapOutcome::NothingToUnwrap) => {
                    sleep(self.cfg.unwrap_idle).await;
                    return UnwrapOutcome::NothingToUnwrap;
                }
                Ok(outcome) => return outcome,
                Err(e) => {
                    self.stats.incr(&self.stats.unwrap_failures);
                    let delay = backoff.next_delay();
                    tracing::warn!(
                        target: "unwrap",
                        error = %e,
                        attempt = backoff.failures(),
                        retry_in_secs = delay.as_secs(),
                        "Unwrap failed, retrying"
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    async fn try_unwrap(&self, gas_price_wei: u128) -> Result<UnwrapOutcome, AppError> {
        let native = self.chain.native_balance(self.cfg.account).await?;
        if native >= self.cfg.unwrap_threshold_wei {
            tracing::debug!(target: "unwrap", balance = %fmt_ether(native), "Native balance ok");
            return Ok(UnwrapOutcome::NotNeeded);
        }

        let token = self.cfg.wrapped_native;
        let wrapped = self.chain.token_balance(token, self.cfg.account).await?;
        if wrapped < self.cfg.min_unwrap_wei {
            tracing::info!(
                target: "unwrap",
                native = %fmt_ether(native),
                wrapped = %fmt_ether(wrapped),
                "Nothing to unwrap"
            );
            return Ok(UnwrapOutcome::NothingToUnwrap);
        }

        tracing::info!(target: "unwrap", amount = %fmt_ether(wrapped), "Unwrapping");
        let receipt = self
            .chain
            .send_unwrap(token, wrapped, self.cfg.unwrap_gas_limit, gas_price_wei)
            .await?;
        if !receipt.success {
            return Err(AppError::Transaction {
                hash: format!("{:#x}", receipt.hash),
                reason: "withdraw reverted".into(),
            });
        }

        self.stats.incr(&self.stats.unwraps);
        tracing::info!(target: "unwrap", hash = %receipt.hash, "Unwrap confirmed");
        Ok(UnwrapOutcome::Unwrapped {
            amount: wrapped,
            hash: receipt.hash,
        })
    }
}
