// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::app::config::BlacklistPolicy;
use alloy::primitives::Address;
use std::collections::HashMap;

/// Per-strategy skip flags, owned by the scan loop.
///
/// Flags from the seed snapshot are permanent. Flags raised by the strike
/// policy carry a release pass and are cleared by [`Blacklist::release_expired`].
#[derive(Debug, Clone)]
pub struct Blacklist {
    flags: HashMap<Address, bool>,
    strikes: HashMap<Address, u32>,
    release_at: HashMap<Address, u64>,
    policy: BlacklistPolicy,
}

impl Blacklist {
    pub fn new(policy: BlacklistPolicy) -> Self {
        Self::seeded(HashMap::new(), policy)
    }

    pub fn seeded(snapshot: HashMap<Address, bool>, policy: BlacklistPolicy) -> Self {
        Self {
            flags: snapshot,
            strikes: HashMap::new(),
            release_at: HashMap::new(),
            policy,
        }
    }

    pub fn get(&self, strategy: &Address) -> bool {
        self.flags.get(strategy).copied().unwrap_or(false)
    }

    pub fn set(&mut self, strategy: Address, skip: bool) {
        self.flags.insert(strategy, skip);
        if !skip {
            self.release_at.remove(&strategy);
        }
    }

    /// Apply the policy to one evaluation outcome seen during `pass`.
    /// Returns the flag written.
    pub fn record_outcome(&mut self, strategy: Address, bad: bool, pass: u64) -> bool {
        let BlacklistPolicy::Strikes {
            max_strikes,
            cooldown_passes,
        } = self.policy
        else {
            self.set(strategy, false);
            return false;
        };

        if !bad {
            self.strikes.remove(&strategy);
            self.set(strategy, false);
            return false;
        }

        let strikes = self.strikes.entry(strategy).or_insert(0);
        *strikes += 1;
        if *strikes < max_strikes {
            self.set(strategy, false);
            return false;
        }

        self.strikes.remove(&strategy);
        self.flags.insert(strategy, true);
        let release = pass.saturating_add(cooldown_passes).saturating_add(1);
        self.release_at.insert(strategy, release);
        tracing::warn!(
            target: "scan",
            %strategy,
            max_strikes,
            release_pass = release,
            "Blacklisting strategy after repeated failures"
        );
        true
    }

    /// Clear timed flags whose cooldown has run out by the start of `pass`.
    pub fn release_expired(&mut self, pass: u64) -> Vec<Address> {
        let expired: Vec<Address> = self
            .release_at
            .iter()
            .filter(|(_, release)| **release <= pass)
            .map(|(addr, _)| *addr)
            .collect();
        for addr in &expired {
            self.set(*addr, false);
            tracing::info!(target: "scan", strategy = %addr, pass, "Blacklist cooldown over");
        }
        expired
    }

    pub fn strikes(&self, strategy: &Address) -> u32 {
        self.strikes.get(strategy).copied().unwrap_or(0)
    }

    pub fn skipped_count(&self) -> usize {
        self.flags.values().filter(|v| **v).count()
    }
}
