// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use alloy::signers::local::PrivateKeySigner;
use clap::Parser;
use harvest_keeper::app::config::GlobalSettings;
use harvest_keeper::app::logging::setup_logging;
use harvest_keeper::domain::constants::wrapped_native_for_chain;
use harvest_keeper::domain::error::AppError;
use harvest_keeper::infrastructure::data::registry::{PoolRegistry, load_blacklist_snapshot};
use harvest_keeper::common::retry::Backoff;
use harvest_keeper::infrastructure::network::chain::{
    AlloyChainClient, ChainClient, wait_for_chain_id,
};
use harvest_keeper::infrastructure::network::provider::ConnectionFactory;
use harvest_keeper::services::health::{spawn_health_server, spawn_keepalive};
use harvest_keeper::services::keeper::{Blacklist, KeeperStats, ScanLoop, Supervisor};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about = "harvest keeper")]
struct Cli {
    /// Path to config file (default: config.{toml,yaml,...})
    #[arg(long)]
    config: Option<String>,

    /// Evaluate and log, never send harvest transactions
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Health port (overrides config/env)
    #[arg(long)]
    health_port: Option<u16>,

    /// Emit JSON logs
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let settings = GlobalSettings::load_with_path(cli.config.as_deref())?;
    setup_logging(
        if settings.debug { "debug" } else { "info" },
        cli.log_json || settings.log_json,
    );

    let wallet_signer = PrivateKeySigner::from_str(settings.wallet_key.trim())
        .map_err(|e| AppError::Config(format!("Invalid wallet key: {}", e)))?;
    let wallet_address = wallet_signer.address();
    if wallet_address != settings.wallet_address {
        return Err(AppError::Config(format!(
            "wallet_address {} does not match wallet_key address {}",
            settings.wallet_address, wallet_address
        )));
    }

    let mut keeper_cfg = settings.keeper_config(wallet_address)?;
    keeper_cfg.dry_run = cli.dry_run;
    if keeper_cfg.dry_run {
        tracing::warn!(target: "config", "Dry run: harvest transactions will not be sent");
    }
    let keeper_cfg = Arc::new(keeper_cfg);

    let registry = PoolRegistry::load_from_file(&settings.pools_path())?;
    let snapshot = load_blacklist_snapshot(&settings.blacklist_path())?;
    let blacklist = Blacklist::seeded(snapshot, keeper_cfg.blacklist_policy);

    let provider = ConnectionFactory::signing(&settings.http_provider, wallet_signer)?;
    let chain: Arc<dyn ChainClient> = Arc::new(AlloyChainClient::new(provider, wallet_address));

    let mut connect_backoff =
        Backoff::new(keeper_cfg.restart_backoff, keeper_cfg.restart_backoff_max);
    let chain_id = wait_for_chain_id(chain.as_ref(), &mut connect_backoff).await;
    tracing::info!(
        target: "config",
        chain_id,
        rpc = %settings.http_provider,
        account = %wallet_address,
        "Connected"
    );
    if let Some(expected) = wrapped_native_for_chain(chain_id)
        && expected != settings.wrapped_native_address
    {
        tracing::warn!(
            target: "config",
            chain_id,
            configured = %settings.wrapped_native_address,
            expected = %expected,
            "wrapped_native_address differs from the chain's canonical wrapped token"
        );
    }

    let stats = Arc::new(KeeperStats::default());

    let health_port = cli.health_port.unwrap_or_else(|| settings.health_port_value());
    spawn_health_server(health_port, chain.clone(), stats.clone()).await;
    if let Some(url) = settings.keepalive_url_value() {
        spawn_keepalive(url, Duration::from_secs(settings.keepalive_interval_secs.max(1)));
    }

    tracing::info!(
        target: "config",
        pools = registry.len(),
        blacklisted = blacklist.skipped_count(),
        policy = ?keeper_cfg.blacklist_policy,
        "Starting keeper"
    );

    let scan = ScanLoop::new(chain, keeper_cfg, registry, blacklist, stats);
    Supervisor::new(scan).run().await;
    Ok(())
}
