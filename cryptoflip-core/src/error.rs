use alloy_primitives::B256;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FlipError>;

#[derive(Error, Debug)]
pub enum FlipError {
    #[error("Wallet unavailable: {0}")]
    WalletUnavailable(String),

    #[error("Request rejected by the wallet user")]
    UserRejected,

    #[error("Wallet is not connected")]
    NotConnected,

    #[error("Wrong network: {}", describe_chain(.chain_id))]
    WrongNetwork { chain_id: Option<u64> },

    #[error("Invalid stake: {0}")]
    InvalidStake(String),

    #[error("A wager is already in progress")]
    AlreadyInProgress,

    #[error("Transaction failed: {0}")]
    TransactionFailed(TxFailure),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dialog error: {0}")]
    Dialog(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a submitted (or attempted) wager transaction did not settle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TxFailure {
    #[error("signature request was declined")]
    Rejected,

    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: B256 },

    #[error(
        "no receipt for {tx_hash} before the confirmation timeout; it may still be mined"
    )]
    Timeout { tx_hash: B256 },

    /// `tx_hash` is set once the wallet accepted the transaction.
    #[error("{}{message}", describe_tx(.tx_hash))]
    Rpc {
        tx_hash: Option<B256>,
        message: String,
    },
}

impl FlipError {
    pub fn wallet_unavailable(msg: impl Into<String>) -> Self {
        Self::WalletUnavailable(msg.into())
    }

    pub fn invalid_stake(msg: impl Into<String>) -> Self {
        Self::InvalidStake(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Collapse a collaborator error raised while submitting or confirming
    /// into the coordinator's `TransactionFailed` form. Pass the hash once
    /// the transaction has been submitted.
    pub fn into_tx_failure(self, tx_hash: Option<B256>) -> Self {
        match self {
            Self::TransactionFailed(_) => self,
            Self::UserRejected => Self::TransactionFailed(TxFailure::Rejected),
            other => Self::TransactionFailed(TxFailure::Rpc {
                tx_hash,
                message: other.to_string(),
            }),
        }
    }
}

fn describe_chain(chain_id: &Option<u64>) -> String {
    match chain_id {
        Some(id) => format!("chain {}", id),
        None => "unknown chain".to_string(),
    }
}

fn describe_tx(tx_hash: &Option<B256>) -> String {
    match tx_hash {
        Some(hash) => format!("transaction {}: ", hash),
        None => String::new(),
    }
}

// conversion from dialoguer::Error
impl From<dialoguer::Error> for FlipError {
    fn from(err: dialoguer::Error) -> Self {
        FlipError::Dialog(err.to_string())
    }
}
