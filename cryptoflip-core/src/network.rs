use crate::config::FlipConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Accepted,
    Rejected,
}

/// What the session knows about the wallet's current chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NetworkState {
    #[default]
    Unknown,
    Correct,
    Incorrect,
}

impl From<Classification> for NetworkState {
    fn from(classification: Classification) -> Self {
        match classification {
            Classification::Accepted => NetworkState::Correct,
            Classification::Rejected => NetworkState::Incorrect,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NetworkChecker {
    accepted: [u64; 2],
}

impl NetworkChecker {
    pub fn new(production_id: u64, test_id: u64) -> Self {
        Self {
            accepted: [production_id, test_id],
        }
    }

    pub fn from_config(config: &FlipConfig) -> Self {
        let [production, test] = config.accepted_chain_ids();
        Self::new(production, test)
    }

    pub fn classify(&self, chain_id: u64) -> Classification {
        if self.accepted.contains(&chain_id) {
            Classification::Accepted
        } else {
            Classification::Rejected
        }
    }

    /// Classify a chain id in wire form; anything unparsable is rejected.
    pub fn classify_raw(&self, raw: &str) -> Classification {
        parse_chain_id(raw).map_or(Classification::Rejected, |id| self.classify(id))
    }
}

/// Accepts `0x`-prefixed hex quantities (as `eth_chainId` returns) or decimal.
pub fn parse_chain_id(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() => u64::from_str_radix(hex, 16).ok(),
        Some(_) => None,
        None if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) => raw.parse().ok(),
        None => None,
    }
}
