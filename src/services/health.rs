// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::AppError;
use crate::common::units::fmt_gwei;
use crate::network::chain::ChainClient;
use crate::services::keeper::stats::KeeperStats;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

const GAS_READ_TIMEOUT: Duration = Duration::from_secs(2);

pub async fn spawn_health_server(
    port: u16,
    chain: Arc<dyn ChainClient>,
    stats: Arc<KeeperStats>,
) -> Option<SocketAddr> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::warn!(target: "health", "Health server failed to bind: {}", e);
            return None;
        }
    };

    let local = listener.local_addr().ok();
    if let Some(addr) = local {
        tracing::info!(target: "health", "Health server listening on {}", addr);
    }

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let chain = chain.clone();
                    let stats = stats.clone();
                    tokio::spawn(async move { serve(socket, chain.as_ref(), &stats).await });
                }
                Err(e) => {
                    tracing::warn!(target: "health", "Health accept error: {}", e);
                    continue;
                }
            }
        }
    });

    local
}

async fn serve(mut socket: TcpStream, chain: &dyn ChainClient, stats: &KeeperStats) {
    let mut buf = [0u8; 1024];
    let n = socket.read(&mut buf).await.unwrap_or(0);
    let req = String::from_utf8_lossy(&buf[..n]).to_string();
    let path = req
        .lines()
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or("/");
    let route = path.split_once('?').map_or(path, |(r, _)| r);

    let (status, content_type, body) = if route.starts_with("/status") {
        let body = serde_json::to_string(&stats.snapshot()).unwrap_or_else(|_| "{}".to_string());
        ("200 OK", "application/json", body)
    } else {
        let live = match tokio::time::timeout(GAS_READ_TIMEOUT, chain.gas_price()).await {
            Ok(Ok(wei)) => Some(wei),
            Ok(Err(e)) => {
                tracing::warn!(target: "health", error = %e, "Gas price read failed");
                None
            }
            Err(_) => {
                tracing::warn!(target: "health", "Gas price read timed out");
                None
            }
        };
        // Fall back to the last price the keeper applied.
        let last = stats.last_gas_price_wei.load(Ordering::Relaxed);
        match live.or((last > 0).then_some(last as u128)) {
            Some(wei) => ("200 OK", "text/plain", format!("GAS {}", fmt_gwei(wei))),
            None => ("503 Service Unavailable", "text/plain", "GAS unavailable".to_string()),
        }
    };

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        content_type,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
}

/// Single keep-alive request; returns the HTTP status code.
pub async fn ping_once(client: &reqwest::Client, url: &str) -> Result<u16, AppError> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::Connection(format!("keep-alive {url}: {e}")))?;
    Ok(resp.status().as_u16())
}

/// Hits `url` every `interval` so free-tier hosts keep the process awake.
pub fn spawn_keepalive(url: String, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let client = reqwest::Client::new();
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match ping_once(&client, &url).await {
                Ok(status) => tracing::debug!(target: "health", %url, status, "Keep-alive ping"),
                Err(e) => tracing::warn!(target: "health", error = %e, "Keep-alive ping failed"),
            }
        }
    })
}
