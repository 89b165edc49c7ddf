// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::AppError;
use alloy::network::{Ethereum, EthereumWallet};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use url::Url;

/// HTTP provider with nonce/chain-id fillers and a local signing wallet.
pub type SigningProvider = DynProvider<Ethereum>;

pub struct ConnectionFactory;

impl ConnectionFactory {
    fn parse_url(rpc_url: &str) -> Result<Url, AppError> {
        Url::parse(rpc_url).map_err(|e| AppError::Config(format!("Invalid RPC URL: {}", e)))
    }

    pub fn signing(rpc_url: &str, signer: PrivateKeySigner) -> Result<SigningProvider, AppError> {
        let url = Self::parse_url(rpc_url)?;
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();
        Ok(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_urls() {
        assert!(matches!(
            ConnectionFactory::parse_url("not a url"),
            Err(AppError::Config(_))
        ));
        assert!(ConnectionFactory::parse_url("http://localhost:8545").is_ok());
    }
}
