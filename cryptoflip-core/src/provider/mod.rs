//! The wallet collaborator: the only path by which the client reaches the
//! chain. Implementations hold (or proxy to something holding) the player's
//! keys; this crate never signs anything itself.

#[cfg(test)]
pub(crate) mod mock;
pub mod rpc;

pub use rpc::JsonRpcProvider;

use crate::config::ChainDescriptor;
use crate::error::Result;
use crate::types::TxHash;
use alloy_primitives::{Address, Bytes, B256, U256, U64};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet for account access, prompting the user if needed.
    async fn request_accounts(&self) -> Result<Vec<Address>>;

    /// Accounts already authorised for this client; never prompts.
    async fn accounts(&self) -> Result<Vec<Address>>;

    async fn chain_id(&self) -> Result<u64>;

    async fn balance(&self, address: Address) -> Result<U256>;

    async fn add_chain(&self, chain: &ChainDescriptor) -> Result<()>;

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash>;

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<Receipt>>;

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    #[serde(default)]
    pub log_index: Option<U64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_hash: TxHash,
    /// `0x1` on success, `0x0` when the transaction reverted.
    #[serde(default)]
    pub status: Option<U64>,
    #[serde(default)]
    pub block_number: Option<U64>,
    #[serde(default)]
    pub logs: Vec<Log>,
}

impl Receipt {
    pub fn succeeded(&self) -> bool {
        self.status.map_or(true, |status| !status.is_zero())
    }
}
