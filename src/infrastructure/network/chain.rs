// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::common::retry::{Backoff, retry_async};
use crate::domain::pool::TxReceipt;
use crate::infrastructure::data::abi::{HarvestableStrategy, WrappedNative};
use crate::network::provider::SigningProvider;
use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

const READ_ATTEMPTS: usize = 3;
const READ_RETRY_DELAY: Duration = Duration::from_millis(100);

/// The chain surface the keeper needs: gas price, balances, harvest and unwrap.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn chain_id(&self) -> Result<u64, AppError>;

    async fn gas_price(&self) -> Result<u128, AppError>;

    async fn native_balance(&self, owner: Address) -> Result<U256, AppError>;

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, AppError>;

    /// `estimateHarvest().callFeeToUser` on the strategy.
    async fn harvest_reward(&self, strategy: Address) -> Result<U256, AppError>;

    async fn estimate_harvest_gas(&self, strategy: Address) -> Result<u64, AppError>;

    async fn send_harvest(
        &self,
        strategy: Address,
        gas_limit: u64,
        gas_price: u128,
    ) -> Result<TxReceipt, AppError>;

    async fn send_unwrap(
        &self,
        token: Address,
        amount: U256,
        gas_limit: u64,
        gas_price: u128,
    ) -> Result<TxReceipt, AppError>;
}

#[derive(Clone)]
pub struct AlloyChainClient {
    provider: SigningProvider,
    account: Address,
}

impl AlloyChainClient {
    pub fn new(provider: SigningProvider, account: Address) -> Self {
        Self { provider, account }
    }
}

/// Blocks until the endpoint answers `eth_chainId`. Each failure is logged
/// and waited out on `backoff`; an unreachable RPC never ends the process.
pub async fn wait_for_chain_id(chain: &dyn ChainClient, backoff: &mut Backoff) -> u64 {
    loop {
        match chain.chain_id().await {
            Ok(id) => {
                backoff.reset();
                return id;
            }
            Err(e) => {
                let delay = backoff.next_delay();
                tracing::warn!(
                    target: "config",
                    error = %e,
                    attempt = backoff.failures(),
                    retry_in_secs = delay.as_secs(),
                    "Lost connection to RPC, retrying"
                );
                sleep(delay).await;
            }
        }
    }
}

fn tx_error(hash: Option<alloy::primitives::B256>, reason: impl std::fmt::Display) -> AppError {
    AppError::Transaction {
        hash: hash.map(|h| format!("{h:#x}")).unwrap_or_default(),
        reason: reason.to_string(),
    }
}

#[async_trait]
impl ChainClient for AlloyChainClient {
    async fn chain_id(&self) -> Result<u64, AppError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| AppError::Connection(format!("chain_id detect failed: {e}")))
    }

    async fn gas_price(&self) -> Result<u128, AppError> {
        let provider = self.provider.clone();
        retry_async(
            move |_| {
                let provider = provider.clone();
                async move { provider.get_gas_price().await }
            },
            READ_ATTEMPTS,
            READ_RETRY_DELAY,
        )
        .await
        .map_err(|e| AppError::Connection(format!("Gas price fetch failed: {}", e)))
    }

    async fn native_balance(&self, owner: Address) -> Result<U256, AppError> {
        let provider = self.provider.clone();
        retry_async(
            move |_| {
                let provider = provider.clone();
                async move { provider.get_balance(owner).await }
            },
            READ_ATTEMPTS,
            READ_RETRY_DELAY,
        )
        .await
        .map_err(|e| AppError::Connection(format!("Balance check failed: {}", e)))
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, AppError> {
        let contract = WrappedNative::new(token, self.provider.clone());
        retry_async(
            |_| {
                let contract = contract.clone();
                async move { contract.balanceOf(owner).call().await }
            },
            READ_ATTEMPTS,
            READ_RETRY_DELAY,
        )
        .await
        .map_err(|e| AppError::contract(token, "balanceOf", e))
    }

    async fn harvest_reward(&self, strategy: Address) -> Result<U256, AppError> {
        let contract = HarvestableStrategy::new(strategy, self.provider.clone());
        let estimate = contract
            .estimateHarvest()
            .from(self.account)
            .call()
            .await
            .map_err(|e| AppError::contract(strategy, "estimateHarvest", e))?;
        Ok(estimate.callFeeToUser)
    }

    async fn estimate_harvest_gas(&self, strategy: Address) -> Result<u64, AppError> {
        let contract = HarvestableStrategy::new(strategy, self.provider.clone());
        contract
            .harvest()
            .from(self.account)
            .estimate_gas()
            .await
            .map_err(|e| AppError::contract(strategy, "harvest.estimateGas", e))
    }

    async fn send_harvest(
        &self,
        strategy: Address,
        gas_limit: u64,
        gas_price: u128,
    ) -> Result<TxReceipt, AppError> {
        let contract = HarvestableStrategy::new(strategy, self.provider.clone());
        let pending = contract
            .harvest()
            .from(self.account)
            .gas(gas_limit)
            .gas_price(gas_price)
            .send()
            .await
            .map_err(|e| tx_error(None, e))?;
        let hash = *pending.tx_hash();
        tracing::info!(target: "harvest", %strategy, tx = %hash, "Harvest sent, awaiting receipt");
        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| tx_error(Some(hash), e))?;
        Ok(TxReceipt {
            hash,
            success: receipt.status(),
        })
    }

    async fn send_unwrap(
        &self,
        token: Address,
        amount: U256,
        gas_limit: u64,
        gas_price: u128,
    ) -> Result<TxReceipt, AppError> {
        let contract = WrappedNative::new(token, self.provider.clone());
        let pending = contract
            .withdraw(amount)
            .from(self.account)
            .gas(gas_limit)
            .gas_price(gas_price)
            .send()
            .await
            .map_err(|e| tx_error(None, e))?;
        let hash = *pending.tx_hash();
        tracing::info!(target: "unwrap", %token, %amount, tx = %hash, "Unwrap sent, awaiting receipt");
        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| tx_error(Some(hash), e))?;
        Ok(TxReceipt {
            hash,
            success: receipt.status(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::mock::MockChain;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn waits_out_rpc_outage_for_chain_id() {
        let chain = MockChain::default();
        {
            let mut s = chain.state();
            s.chain_id = 250;
            s.chain_id_failures = 3;
        }
        let mut backoff = Backoff::new(Duration::from_secs(30), Duration::from_secs(300));

        let started = Instant::now();
        let id = wait_for_chain_id(&chain, &mut backoff).await;

        assert_eq!(id, 250);
        assert_eq!(chain.state().chain_id_calls, 4);
        assert!(started.elapsed() >= Duration::from_secs(30 + 60 + 120));
        assert_eq!(backoff.failures(), 0);
    }
}
