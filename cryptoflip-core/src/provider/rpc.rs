use super::{Receipt, TransactionRequest, WalletProvider};
use crate::config::ChainDescriptor;
use crate::error::{FlipError, Result};
use crate::network::parse_chain_id;
use crate::types::TxHash;
use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// EIP-1193 error code for "user rejected the request".
const USER_REJECTED: i64 = 4001;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Wallet collaborator reached over JSON-RPC 2.0 on HTTP, e.g. a desktop
/// wallet's local RPC or a development node with unlocked accounts.
pub struct JsonRpcProvider {
    url: String,
    client: reqwest::Client,
    next_id: AtomicU64,
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl JsonRpcProvider {
    pub fn new(url: &str) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    /// `timeout` bounds each request; a wallet that stays silent past it
    /// counts as unavailable.
    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            url: url.to_string(),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        tracing::debug!("-> {} {}", method, request.params);

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(method, e))?;

        let response: RpcResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(method, e)
            } else {
                FlipError::Rpc {
                    code: 0,
                    message: format!("{} returned an unreadable response: {}", method, e),
                }
            }
        })?;

        into_result(method, response)
    }

    /// Refused connections, timeouts and dropped requests all mean the
    /// wallet cannot be reached.
    fn transport_error(&self, method: &str, e: reqwest::Error) -> FlipError {
        if e.is_connect() || e.is_timeout() || e.is_request() {
            FlipError::wallet_unavailable(format!("Cannot reach wallet at {}: {}", self.url, e))
        } else {
            FlipError::Rpc {
                code: 0,
                message: format!("{} request failed: {}", method, e),
            }
        }
    }
}

fn into_result<T: DeserializeOwned>(method: &str, response: RpcResponse) -> Result<T> {
    if let Some(error) = response.error {
        tracing::debug!("<- {} error {}: {}", method, error.code, error.message);
        return Err(match error.code {
            USER_REJECTED => FlipError::UserRejected,
            code => FlipError::Rpc {
                code,
                message: error.message,
            },
        });
    }

    let result = response.result.unwrap_or(Value::Null);
    tracing::debug!("<- {} {}", method, result);
    Ok(serde_json::from_value(result)?)
}

/// `wallet_addEthereumChain` parameter object.
fn add_chain_params(chain: &ChainDescriptor) -> Value {
    json!([{
        "chainId": format!("{:#x}", chain.chain_id),
        "chainName": chain.chain_name,
        "nativeCurrency": {
            "name": chain.native_currency.name,
            "symbol": chain.native_currency.symbol,
            "decimals": chain.native_currency.decimals,
        },
        "rpcUrls": chain.rpc_urls,
        "blockExplorerUrls": chain.block_explorer_urls,
    }])
}

#[async_trait]
impl WalletProvider for JsonRpcProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        self.request("eth_requestAccounts", json!([])).await
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        self.request("eth_accounts", json!([])).await
    }

    async fn chain_id(&self) -> Result<u64> {
        let raw: String = self.request("eth_chainId", json!([])).await?;
        parse_chain_id(&raw)
            .ok_or_else(|| FlipError::decode(format!("Malformed chain id '{}'", raw)))
    }

    async fn balance(&self, address: Address) -> Result<U256> {
        self.request("eth_getBalance", json!([address, "latest"]))
            .await
    }

    async fn add_chain(&self, chain: &ChainDescriptor) -> Result<()> {
        let _: Value = self
            .request("wallet_addEthereumChain", add_chain_params(chain))
            .await?;
        Ok(())
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash> {
        self.request("eth_sendTransaction", json!([tx])).await
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<Receipt>> {
        self.request("eth_getTransactionReceipt", json!([hash]))
            .await
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        self.request("eth_call", json!([{ "to": to, "data": data }, "latest"]))
            .await
    }
}
