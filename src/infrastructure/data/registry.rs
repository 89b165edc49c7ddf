// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use alloy::primitives::Address;
use serde::Deserialize;

use crate::domain::error::AppError;
use crate::domain::pool::Pool;

/// Accepts either a flat list of pools or the Reaper vault API payload.
#[derive(Deserialize)]
#[serde(untagged)]
enum PoolFile {
    Flat(Vec<Pool>),
    Api { data: Vec<ApiVault> },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiVault {
    crypt_content: CryptContent,
}

#[derive(Deserialize)]
struct CryptContent {
    name: String,
    strategy: StrategyRef,
}

#[derive(Deserialize)]
struct StrategyRef {
    address: Address,
}

/// Ordered pool list. Order is the scan order and carries no priority.
#[derive(Debug, Clone, Default)]
pub struct PoolRegistry {
    pools: Vec<Pool>,
}

impl PoolRegistry {
    pub fn new(pools: Vec<Pool>) -> Self {
        let mut seen = HashSet::new();
        let mut ordered = Vec::with_capacity(pools.len());
        for pool in pools {
            if seen.insert(pool.strategy_address) {
                ordered.push(pool);
            } else {
                tracing::warn!(
                    target: "config",
                    pool = %pool.name,
                    strategy = %pool.strategy_address,
                    "Duplicate strategy in pool list; keeping first entry"
                );
            }
        }
        Self { pools: ordered }
    }

    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let parsed: PoolFile = serde_json::from_str(raw)
            .map_err(|e| AppError::Config(format!("Invalid pool list JSON: {e}")))?;
        let pools = match parsed {
            PoolFile::Flat(pools) => pools,
            PoolFile::Api { data } => data
                .into_iter()
                .map(|v| Pool::new(v.crypt_content.name, v.crypt_content.strategy.address))
                .collect(),
        };
        Ok(Self::new(pools))
    }

    pub fn load_from_file(path: &str) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read pool list {path}: {e}")))?;
        let registry = Self::from_json(&raw)?;
        if registry.is_empty() {
            return Err(AppError::Config(format!("Pool list {path} is empty")));
        }
        tracing::info!(target: "config", path, pools = registry.len(), "Loaded pool list");
        Ok(registry)
    }

    pub fn pools(&self) -> &[Pool] {
        &self.pools
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

/// Seed skip flags, `{"0xstrategy": true}`. A missing file means no seed.
pub fn load_blacklist_snapshot(path: &str) -> Result<HashMap<Address, bool>, AppError> {
    if !Path::new(path).exists() {
        tracing::info!(target: "config", path, "No blacklist snapshot; starting empty");
        return Ok(HashMap::new());
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("Failed to read blacklist {path}: {e}")))?;
    let snapshot: HashMap<Address, bool> = serde_json::from_str(&raw)
        .map_err(|e| AppError::Config(format!("Invalid blacklist JSON {path}: {e}")))?;
    let skipped = snapshot.values().filter(|v| **v).count();
    tracing::info!(target: "config", path, entries = snapshot.len(), skipped, "Loaded blacklist snapshot");
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "0x00000000000000000000000000000000000000a1";
    const B: &str = "0x00000000000000000000000000000000000000b2";

    #[test]
    fn parses_flat_pool_list() {
        let raw = format!(
            r#"[{{"name":"FTM-USDC","strategyAddress":"{A}"}},{{"name":"BOO","strategyAddress":"{B}"}}]"#
        );
        let reg = PoolRegistry::from_json(&raw).expect("flat list");
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.pools()[0].name, "FTM-USDC");
        assert_eq!(reg.pools()[1].strategy_address, B.parse::<Address>().unwrap());
    }

    #[test]
    fn parses_vault_api_payload() {
        let raw = format!(
            r#"{{"data":[{{"cryptContent":{{"name":"TOMB","strategy":{{"address":"{A}"}},"extra":1}}}}]}}"#
        );
        let reg = PoolRegistry::from_json(&raw).expect("api payload");
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.pools()[0].name, "TOMB");
    }

    #[test]
    fn drops_duplicate_strategies_keeping_order() {
        let a: Address = A.parse().unwrap();
        let b: Address = B.parse().unwrap();
        let reg = PoolRegistry::new(vec![
            Pool::new("first", a),
            Pool::new("second", b),
            Pool::new("again", a),
        ]);
        let names: Vec<_> = reg.pools().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn missing_snapshot_is_empty() {
        let snapshot = load_blacklist_snapshot("/definitely/not/here.json").expect("empty");
        assert!(snapshot.is_empty());
    }
}
