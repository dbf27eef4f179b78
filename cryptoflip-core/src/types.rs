use crate::error::{FlipError, Result};
use alloy_primitives::{Address, B256, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type TxHash = B256;

/// Coin side. The ordinal is part of the wire contract with the flip
/// contract: 0 = Heads, 1 = Tails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Heads,
    Tails,
}

impl Side {
    pub fn ordinal(self) -> u8 {
        match self {
            Side::Heads => 0,
            Side::Tails => 1,
        }
    }

    pub fn from_ordinal(ordinal: u8) -> Result<Self> {
        match ordinal {
            0 => Ok(Side::Heads),
            1 => Ok(Side::Tails),
            other => Err(FlipError::decode(format!("Unknown side ordinal: {}", other))),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Heads => write!(f, "Heads"),
            Side::Tails => write!(f, "Tails"),
        }
    }
}

impl FromStr for Side {
    type Err = FlipError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heads" | "head" | "h" => Ok(Side::Heads),
            "tails" | "tail" | "t" => Ok(Side::Tails),
            other => Err(FlipError::invalid_input(format!(
                "'{}' is not a side (expected heads or tails)",
                other
            ))),
        }
    }
}

/// A validated bet, ready to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WagerRequest {
    pub player: Address,
    pub side: Side,
    pub stake: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WagerOutcome {
    pub tx_hash: TxHash,
    pub chosen_side: Side,
    pub landed_side: Side,
    pub stake: U256,
    pub won: bool,
}

/// Terminal state of a confirmed wager transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Settlement {
    Resolved(WagerOutcome),
    /// The transaction was included but carried no decodable outcome event.
    Indeterminate { tx_hash: TxHash },
}

impl Settlement {
    pub fn outcome(&self) -> Option<&WagerOutcome> {
        match self {
            Settlement::Resolved(outcome) => Some(outcome),
            Settlement::Indeterminate { .. } => None,
        }
    }

    pub fn tx_hash(&self) -> TxHash {
        match self {
            Settlement::Resolved(outcome) => outcome.tx_hash,
            Settlement::Indeterminate { tx_hash } => *tx_hash,
        }
    }
}

/// One past game as reported by `getUserGameHistory`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: U256,
    pub player: Address,
    pub stake: U256,
    pub chosen_side: Side,
    pub landed_side: Side,
    pub won: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractStats {
    pub total_games: U256,
    pub total_fees: U256,
}
