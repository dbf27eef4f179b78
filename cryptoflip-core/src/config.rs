use crate::error::{FlipError, Result};
use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const BASE_MAINNET_CHAIN_ID: u64 = 8453;
pub const BASE_GOERLI_CHAIN_ID: u64 = 84531;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlipConfig {
    /// JSON-RPC endpoint of the wallet that holds the player's keys.
    pub rpc_url: String,
    pub contract_address: Address,
    /// Chain offered to the wallet on a network switch.
    pub production_chain: ChainDescriptor,
    pub test_chain_id: u64,
    pub confirmation_timeout: Duration,
    pub poll_interval: Duration,
    pub illustrative_history: bool,
}

/// Everything `wallet_addEthereumChain` needs to register a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDescriptor {
    pub chain_id: u64,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl ChainDescriptor {
    pub fn base_mainnet() -> Self {
        Self {
            chain_id: BASE_MAINNET_CHAIN_ID,
            chain_name: "Base Mainnet".to_string(),
            native_currency: NativeCurrency {
                name: "ETH".to_string(),
                symbol: "ETH".to_string(),
                decimals: 18,
            },
            rpc_urls: vec!["https://mainnet.base.org".to_string()],
            block_explorer_urls: vec!["https://basescan.org".to_string()],
        }
    }

    pub fn base_goerli() -> Self {
        Self {
            chain_id: BASE_GOERLI_CHAIN_ID,
            chain_name: "Base Goerli".to_string(),
            native_currency: NativeCurrency {
                name: "Goerli Ether".to_string(),
                symbol: "ETH".to_string(),
                decimals: 18,
            },
            rpc_urls: vec!["https://goerli.base.org".to_string()],
            block_explorer_urls: vec!["https://goerli.basescan.org".to_string()],
        }
    }

    pub fn address_url(&self, address: &Address) -> Option<String> {
        self.block_explorer_urls
            .first()
            .map(|explorer| format!("{}/address/{}", explorer.trim_end_matches('/'), address))
    }

    pub fn tx_url(&self, tx_hash: &crate::types::TxHash) -> Option<String> {
        self.block_explorer_urls
            .first()
            .map(|explorer| format!("{}/tx/{}", explorer.trim_end_matches('/'), tx_hash))
    }
}

impl Default for FlipConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:1248".to_string(),
            contract_address: address!("1234567890123456789012345678901234567890"),
            production_chain: ChainDescriptor::base_mainnet(),
            test_chain_id: BASE_GOERLI_CHAIN_ID,
            confirmation_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(2),
            illustrative_history: false,
        }
    }
}

impl FlipConfig {
    pub fn new(rpc_url: impl Into<String>, contract_address: Address) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            contract_address,
            ..Self::default()
        }
    }

    /// Same allow-list, but network switches target Base Goerli.
    pub fn testnet() -> Self {
        Self {
            production_chain: ChainDescriptor::base_goerli(),
            test_chain_id: BASE_MAINNET_CHAIN_ID,
            ..Self::default()
        }
    }

    /// The fixed allow-list: production id first, then the test id.
    pub fn accepted_chain_ids(&self) -> [u64; 2] {
        [self.production_chain.chain_id, self.test_chain_id]
    }

    pub fn validate(&self) -> Result<()> {
        if self.rpc_url.is_empty() {
            return Err(FlipError::config("RPC URL cannot be empty"));
        }

        if self.contract_address == Address::ZERO {
            return Err(FlipError::config("Contract address cannot be the zero address"));
        }

        if self.production_chain.chain_id == self.test_chain_id {
            return Err(FlipError::config(
                "Production and test chain ids must differ",
            ));
        }

        if self.production_chain.rpc_urls.is_empty() {
            return Err(FlipError::config("Production chain needs at least one RPC URL"));
        }

        if self.confirmation_timeout.is_zero() {
            return Err(FlipError::config("Confirmation timeout must be greater than 0"));
        }

        if self.poll_interval.is_zero() {
            return Err(FlipError::config("Poll interval must be greater than 0"));
        }

        Ok(())
    }

    pub async fn load_or_default(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path).await? {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }
}
