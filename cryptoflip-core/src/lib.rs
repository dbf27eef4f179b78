//! CryptoFlip SDK - Core library for the on-chain coin flip
//!
//! This library manages a wallet session (connection, network, balance,
//! history) and the lifecycle of a single wager against the coin flip
//! contract. All chain access goes through a `WalletProvider`; keys never
//! leave the wallet.

pub mod amount;
pub mod config;
pub mod contract;
pub mod error;
pub mod history;
pub mod network;
pub mod provider;
pub mod session;
pub mod types;
pub mod wager;

pub use config::{ChainDescriptor, FlipConfig};
pub use contract::FlipContract;
pub use error::{FlipError, Result, TxFailure};
pub use history::{HistoryEntry, HistoryView, Provenance};
pub use network::{Classification, NetworkChecker, NetworkState};
pub use provider::{JsonRpcProvider, WalletProvider};
pub use session::{Session, SessionManager};
pub use types::{HistoryRecord, Settlement, Side, TxHash, WagerOutcome};
pub use wager::{GameView, WagerCoordinator};

pub use alloy_primitives::{Address, U256};
