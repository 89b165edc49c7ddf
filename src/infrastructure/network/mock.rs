// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

//! In-memory chain used by unit tests. Records every call it sees.

use crate::common::error::AppError;
use crate::domain::pool::TxReceipt;
use crate::network::chain::ChainClient;
use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
pub struct MockState {
    pub chain_id: u64,
    pub chain_id_failures: u32,
    /// When set, `gas_price` never resolves.
    pub gas_price_hangs: bool,
    /// Queued prices, consumed one per read; the last one sticks in `gas_price`.
    pub gas_prices: VecDeque<u128>,
    pub gas_price: u128,
    pub native_balance: U256,
    pub wrapped_balance: U256,
    pub rewards: HashMap<Address, U256>,
    pub gas_estimates: HashMap<Address, u64>,
    pub failing_harvests: HashSet<Address>,
    pub reverting_harvests: HashSet<Address>,
    pub failing_reward_reads: HashSet<Address>,
    pub balance_failures: u32,
    pub unwrap_failures: u32,

    pub chain_id_calls: usize,
    pub gas_price_calls: usize,
    pub reward_reads: Vec<Address>,
    pub gas_estimate_calls: usize,
    pub harvests: Vec<(Address, u64, u128)>,
    pub unwraps: Vec<(Address, U256, u64, u128)>,
    pub balance_reads: usize,
}

#[derive(Default)]
pub struct MockChain {
    state: Mutex<MockState>,
}

impl MockChain {
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn next_hash(n: usize) -> B256 {
    B256::with_last_byte(n as u8)
}

#[async_trait]
impl ChainClient for MockChain {
    async fn chain_id(&self) -> Result<u64, AppError> {
        let mut s = self.state();
        s.chain_id_calls += 1;
        if s.chain_id_failures > 0 {
            s.chain_id_failures -= 1;
            return Err(AppError::Connection("mock rpc unreachable".into()));
        }
        Ok(s.chain_id)
    }

    async fn gas_price(&self) -> Result<u128, AppError> {
        let hangs = self.state().gas_price_hangs;
        if hangs {
            std::future::pending::<()>().await;
        }
        let mut s = self.state();
        s.gas_price_calls += 1;
        if let Some(next) = s.gas_prices.pop_front() {
            s.gas_price = next;
        }
        Ok(s.gas_price)
    }

    async fn native_balance(&self, _owner: Address) -> Result<U256, AppError> {
        let mut s = self.state();
        s.balance_reads += 1;
        if s.balance_failures > 0 {
            s.balance_failures -= 1;
            return Err(AppError::Connection("mock balance outage".into()));
        }
        Ok(s.native_balance)
    }

    async fn token_balance(&self, _token: Address, _owner: Address) -> Result<U256, AppError> {
        Ok(self.state().wrapped_balance)
    }

    async fn harvest_reward(&self, strategy: Address) -> Result<U256, AppError> {
        let mut s = self.state();
        s.reward_reads.push(strategy);
        if s.failing_reward_reads.contains(&strategy) {
            return Err(AppError::contract(strategy, "estimateHarvest", "execution reverted"));
        }
        Ok(s.rewards.get(&strategy).copied().unwrap_or_default())
    }

    async fn estimate_harvest_gas(&self, strategy: Address) -> Result<u64, AppError> {
        let mut s = self.state();
        s.gas_estimate_calls += 1;
        Ok(s.gas_estimates.get(&strategy).copied().unwrap_or(1_000_000))
    }

    async fn send_harvest(
        &self,
        strategy: Address,
        gas_limit: u64,
        gas_price: u128,
    ) -> Result<TxReceipt, AppError> {
        let mut s = self.state();
        s.harvests.push((strategy, gas_limit, gas_price));
        if s.failing_harvests.contains(&strategy) {
            return Err(AppError::Transaction {
                hash: String::new(),
                reason: "transaction underpriced".into(),
            });
        }
        Ok(TxReceipt {
            hash: next_hash(s.harvests.len()),
            success: !s.reverting_harvests.contains(&strategy),
        })
    }

    async fn send_unwrap(
        &self,
        token: Address,
        amount: U256,
        gas_limit: u64,
        gas_price: u128,
    ) -> Result<TxReceipt, AppError> {
        let mut s = self.state();
        if s.unwrap_failures > 0 {
            s.unwrap_failures -= 1;
            return Err(AppError::Transaction {
                hash: String::new(),
                reason: "nonce too low".into(),
            });
        }
        s.unwraps.push((token, amount, gas_limit, gas_price));
        s.native_balance = s.native_balance.saturating_add(amount);
        s.wrapped_balance = U256::ZERO;
        Ok(TxReceipt {
            hash: next_hash(100 + s.unwraps.len()),
            success: true,
        })
    }
}
