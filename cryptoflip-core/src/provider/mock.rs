use super::{Log, Receipt, TransactionRequest, WalletProvider};
use crate::config::ChainDescriptor;
use crate::contract::abi;
use crate::error::{FlipError, Result};
use crate::types::{HistoryRecord, TxHash};
use alloy_primitives::{keccak256, Address, Bytes, U256, U64};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Instant;
use tokio::sync::Notify;

/// Scripted in-memory wallet. Every trait call is recorded in `calls` so
/// tests can assert whether the collaborator was reached at all.
pub(crate) struct MockWallet {
    state: Mutex<MockState>,
    /// Signalled once a transaction has been handed to the wallet.
    pub submitted: Notify,
    /// Signalled once a held balance or history read has been answered.
    pub reading: Notify,
    /// Releases a transaction held by `MockState::hold_submission`, or a
    /// read held by `MockState::hold_reads`.
    pub release: Notify,
}

pub(crate) struct MockState {
    pub available: bool,
    pub reject_accounts: bool,
    pub reject_signature: bool,
    pub authorised: bool,
    pub accounts: Vec<Address>,
    pub chain_id: u64,
    pub balance: U256,
    pub fail_balance: bool,
    pub fail_history: bool,
    pub hold_submission: bool,
    pub hold_reads: bool,
    pub receipt_logs: Vec<Log>,
    pub receipt_status: u64,
    /// Number of receipt polls answered with "pending"; `None` never confirms.
    pub pending_polls: Option<usize>,
    /// Receipt lookups before this instant answer "pending".
    pub confirm_at: Option<Instant>,
    /// Number of receipt lookups that fail with a transient RPC error.
    pub receipt_errors: usize,
    pub history: Vec<HistoryRecord>,
    pub house_edge: U256,
    pub calls: Vec<&'static str>,
    pub sent: Vec<TransactionRequest>,
    pub added_chains: Vec<ChainDescriptor>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            available: true,
            reject_accounts: false,
            reject_signature: false,
            authorised: true,
            accounts: vec![Address::repeat_byte(0xaa)],
            chain_id: 8453,
            balance: U256::from(1_000_000_000_000_000_000u64),
            fail_balance: false,
            fail_history: false,
            hold_submission: false,
            hold_reads: false,
            receipt_logs: Vec::new(),
            receipt_status: 1,
            pending_polls: Some(0),
            confirm_at: None,
            receipt_errors: 0,
            history: Vec::new(),
            house_edge: U256::from(3u64),
            calls: Vec::new(),
            sent: Vec::new(),
            added_chains: Vec::new(),
        }
    }
}

impl MockWallet {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            submitted: Notify::new(),
            reading: Notify::new(),
            release: Notify::new(),
        }
    }

    pub fn with(&self, f: impl FnOnce(&mut MockState)) {
        f(&mut self.state.lock());
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.state.lock().sent.clone()
    }

    pub fn added_chains(&self) -> Vec<ChainDescriptor> {
        self.state.lock().added_chains.clone()
    }

    /// Make the next receipt carry one `Result` event from `contract`.
    pub fn emit_result(&self, contract: Address, choice: u8, result: u8, won: bool) {
        let mut state = self.state.lock();
        let player = state.accounts[0];
        let log = abi::result_log(contract, player, U256::from(1u64), choice, result, won, 0);
        state.receipt_logs = vec![log];
    }

    async fn hold_if_asked(&self) {
        let hold = self.state.lock().hold_reads;
        if hold {
            self.reading.notify_one();
            self.release.notified().await;
        }
    }

    fn enter(&self, call: &'static str) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(call);
        if !state.available {
            return Err(FlipError::wallet_unavailable("no wallet installed"));
        }
        Ok(())
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        self.enter("request_accounts")?;
        let mut state = self.state.lock();
        if state.reject_accounts {
            return Err(FlipError::UserRejected);
        }
        state.authorised = true;
        Ok(state.accounts.clone())
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        self.enter("accounts")?;
        let state = self.state.lock();
        Ok(if state.authorised {
            state.accounts.clone()
        } else {
            Vec::new()
        })
    }

    async fn chain_id(&self) -> Result<u64> {
        self.enter("chain_id")?;
        Ok(self.state.lock().chain_id)
    }

    async fn balance(&self, _address: Address) -> Result<U256> {
        self.enter("balance")?;
        let result = {
            let state = self.state.lock();
            if state.fail_balance {
                Err(FlipError::Rpc {
                    code: -32603,
                    message: "balance unavailable".to_string(),
                })
            } else {
                Ok(state.balance)
            }
        };
        self.hold_if_asked().await;
        result
    }

    async fn add_chain(&self, chain: &ChainDescriptor) -> Result<()> {
        self.enter("add_chain")?;
        let mut state = self.state.lock();
        state.added_chains.push(chain.clone());
        state.chain_id = chain.chain_id;
        Ok(())
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash> {
        self.enter("send_transaction")?;
        let (hold, hash) = {
            let mut state = self.state.lock();
            if state.reject_signature {
                return Err(FlipError::UserRejected);
            }
            state.sent.push(tx);
            let nonce = state.sent.len() as u64;
            (state.hold_submission, keccak256(nonce.to_be_bytes()))
        };

        self.submitted.notify_one();
        if hold {
            self.release.notified().await;
        }
        Ok(hash)
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<Receipt>> {
        self.enter("transaction_receipt")?;
        let mut state = self.state.lock();
        if state.receipt_errors > 0 {
            state.receipt_errors -= 1;
            return Err(FlipError::Rpc {
                code: -32603,
                message: "transient".to_string(),
            });
        }
        if state.confirm_at.is_some_and(|at| Instant::now() < at) {
            return Ok(None);
        }
        match state.pending_polls {
            None => return Ok(None),
            Some(0) => {}
            Some(n) => {
                state.pending_polls = Some(n - 1);
                return Ok(None);
            }
        }

        Ok(Some(Receipt {
            transaction_hash: hash,
            status: Some(U64::from(state.receipt_status)),
            block_number: Some(U64::from(1u64)),
            logs: state.receipt_logs.clone(),
        }))
    }

    async fn call(&self, _to: Address, data: Bytes) -> Result<Bytes> {
        self.enter("call")?;
        let result = self.answer_call(&data);
        self.hold_if_asked().await;
        result
    }
}

impl MockWallet {
    fn answer_call(&self, data: &Bytes) -> Result<Bytes> {
        let state = self.state.lock();
        let selector = data.get(..4).unwrap_or_default();

        if selector == abi::selector(abi::HISTORY_SIGNATURE) {
            if state.fail_history {
                return Err(FlipError::Rpc {
                    code: -32000,
                    message: "execution reverted".to_string(),
                });
            }
            Ok(abi::encode_history(&state.history))
        } else if selector == abi::selector(abi::HOUSE_EDGE_SIGNATURE) {
            Ok(abi::encode_words(&[state.house_edge]))
        } else if selector == abi::selector(abi::STATS_SIGNATURE) {
            Ok(abi::encode_words(&[U256::from(12u64), U256::from(5u64)]))
        } else {
            Err(FlipError::Rpc {
                code: -32000,
                message: "execution reverted".to_string(),
            })
        }
    }
}
