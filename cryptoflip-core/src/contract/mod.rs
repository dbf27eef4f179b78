pub mod abi;

pub use abi::ResultEvent;

use crate::error::{FlipError, Result, TxFailure};
use crate::provider::{Log, Receipt, TransactionRequest, WalletProvider};
use crate::types::{ContractStats, HistoryRecord, Side, TxHash};
use alloy_primitives::{Address, U256};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct ConfirmationPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

/// Typed access to the deployed coin flip contract through a wallet.
pub struct FlipContract<P> {
    provider: Arc<P>,
    address: Address,
}

impl<P> Clone for FlipContract<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            address: self.address,
        }
    }
}

impl<P: WalletProvider> FlipContract<P> {
    pub fn new(provider: Arc<P>, address: Address) -> Self {
        Self { provider, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Send `flip(choice)` with `stake` attached, signed by `player`.
    pub async fn submit_wager(&self, player: Address, side: Side, stake: U256) -> Result<TxHash> {
        let tx = TransactionRequest {
            from: player,
            to: self.address,
            value: stake,
            data: abi::encode_flip(side),
        };

        let hash = self.provider.send_transaction(tx).await?;
        tracing::info!("Submitted flip({}) for {} wei: {}", side.ordinal(), stake, hash);
        Ok(hash)
    }

    /// Poll for the receipt of `hash`. Lookup errors inside the timeout are
    /// logged and retried. When the timeout elapses one last lookup is made,
    /// since the transaction may have landed in the meantime.
    pub async fn await_confirmation(
        &self,
        hash: TxHash,
        policy: ConfirmationPolicy,
    ) -> Result<Receipt> {
        let poll = async {
            loop {
                match self.provider.transaction_receipt(hash).await {
                    Ok(Some(receipt)) => return receipt,
                    Ok(None) => {}
                    Err(e) => tracing::warn!("Receipt lookup for {} failed, retrying: {}", hash, e),
                }
                tokio::time::sleep(policy.poll_interval).await;
            }
        };

        let receipt = match tokio::time::timeout(policy.timeout, poll).await {
            Ok(receipt) => receipt,
            Err(_) => {
                tracing::warn!(
                    "No receipt for {} after {:?}, checking once more",
                    hash,
                    policy.timeout
                );
                match self.provider.transaction_receipt(hash).await? {
                    Some(receipt) => receipt,
                    None => {
                        tracing::warn!(
                            "Transaction {} unconfirmed; it may still be mined later",
                            hash
                        );
                        return Err(FlipError::TransactionFailed(TxFailure::Timeout {
                            tx_hash: hash,
                        }));
                    }
                }
            }
        };

        if !receipt.succeeded() {
            return Err(FlipError::TransactionFailed(TxFailure::Reverted { tx_hash: hash }));
        }

        tracing::debug!(
            "Transaction {} confirmed with {} logs",
            hash,
            receipt.logs.len()
        );
        Ok(receipt)
    }

    /// `Result` events from this contract in `receipt`, ordered by log index.
    pub fn result_logs<'a>(&self, receipt: &'a Receipt) -> Vec<&'a Log> {
        let mut logs: Vec<&Log> = receipt
            .logs
            .iter()
            .filter(|log| abi::is_result_log(log, self.address))
            .collect();
        logs.sort_by_key(|log| log.log_index.map_or(u64::MAX, |index| index.to::<u64>()));
        logs
    }

    pub fn decode_result_log(&self, log: &Log) -> Result<ResultEvent> {
        abi::decode_result_log(log)
    }

    pub async fn history(&self, player: Address) -> Result<Vec<HistoryRecord>> {
        let data = self
            .provider
            .call(self.address, abi::encode_history_query(player))
            .await?;
        abi::decode_history(&data)
    }

    /// House edge in percent.
    pub async fn house_edge(&self) -> Result<U256> {
        let data = self
            .provider
            .call(self.address, abi::encode_call(abi::HOUSE_EDGE_SIGNATURE, &[]))
            .await?;
        abi::decode_uint(&data)
    }

    pub async fn stats(&self) -> Result<ContractStats> {
        let data = self
            .provider
            .call(self.address, abi::encode_call(abi::STATS_SIGNATURE, &[]))
            .await?;
        abi::decode_stats(&data)
    }
}
