use alloy_primitives::Address;
use anyhow::Context;
use cryptoflip_core::FlipConfig;
use std::path::PathBuf;

const CONFIG_FILE: &str = "config.json";

/// Where the CLI keeps its settings, plus the per-invocation overrides.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub data_dir: PathBuf,
    pub rpc_url: Option<String>,
    pub contract: Option<Address>,
}

impl CliConfig {
    pub fn new(
        data_dir: Option<PathBuf>,
        rpc_url: Option<String>,
        contract: Option<Address>,
    ) -> Self {
        Self {
            data_dir: data_dir.unwrap_or_else(default_data_dir),
            rpc_url,
            contract,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    /// The saved config (or defaults) with command line flags applied on top.
    pub async fn resolve(&self) -> anyhow::Result<FlipConfig> {
        let path = self.config_path();
        let config = FlipConfig::load_or_default(&path)
            .await
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        let config = self.apply_overrides(config);
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    fn apply_overrides(&self, mut config: FlipConfig) -> FlipConfig {
        if let Some(url) = &self.rpc_url {
            config.rpc_url = url.clone();
        }
        if let Some(contract) = self.contract {
            config.contract_address = contract;
        }
        config
    }

    pub fn exists(&self) -> bool {
        self.config_path().exists()
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cryptoflip")
}
