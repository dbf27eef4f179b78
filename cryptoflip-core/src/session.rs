use crate::amount::format_ether;
use crate::config::FlipConfig;
use crate::contract::FlipContract;
use crate::error::{FlipError, Result};
use crate::history::{HistoryBook, HistoryProjector, HistoryView};
use crate::network::{NetworkChecker, NetworkState};
use crate::provider::WalletProvider;
use alloy_primitives::{Address, U256};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One wallet connection. Only `SessionManager` mutates it; everyone else
/// works on snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub address: Option<Address>,
    pub connected: bool,
    pub has_signer: bool,
    pub chain_id: Option<u64>,
    pub network: NetworkState,
    pub balance: U256,
}

impl Session {
    pub fn is_connected(&self) -> bool {
        self.connected && self.address.is_some()
    }

    pub fn can_sign(&self) -> bool {
        self.is_connected() && self.has_signer
    }

    pub fn is_correct_network(&self) -> bool {
        self.network == NetworkState::Correct
    }

    /// Balance in ether, e.g. `0.25`.
    pub fn balance_display(&self) -> String {
        format_ether(self.balance)
    }

    pub fn short_address(&self) -> Option<String> {
        self.address.as_ref().map(short_address)
    }
}

/// `0x1234...abcd`
pub fn short_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

pub struct SessionManager<P> {
    provider: Arc<P>,
    config: FlipConfig,
    checker: NetworkChecker,
    contract: FlipContract<P>,
    session: RwLock<Session>,
    history: HistoryBook,
    wager_in_flight: AtomicBool,
}

/// Held while a wager is pending on a session; dropping it frees the slot.
pub struct WagerSlot<'a>(&'a AtomicBool);

impl Drop for WagerSlot<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<P: WalletProvider> SessionManager<P> {
    pub fn new(provider: Arc<P>, config: FlipConfig) -> Self {
        let checker = NetworkChecker::from_config(&config);
        let contract = FlipContract::new(provider.clone(), config.contract_address);
        let history = HistoryBook::new(HistoryProjector::new(config.illustrative_history));

        Self {
            provider,
            config,
            checker,
            contract,
            session: RwLock::new(Session::default()),
            history,
            wager_in_flight: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &FlipConfig {
        &self.config
    }

    pub fn contract(&self) -> &FlipContract<P> {
        &self.contract
    }

    pub fn snapshot(&self) -> Session {
        self.session.read().clone()
    }

    pub fn history(&self) -> HistoryView {
        self.history.view()
    }

    /// Claim the session's single wager slot.
    pub fn begin_wager(&self) -> Result<WagerSlot<'_>> {
        self.wager_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| FlipError::AlreadyInProgress)?;
        Ok(WagerSlot(&self.wager_in_flight))
    }

    pub fn is_wager_in_flight(&self) -> bool {
        self.wager_in_flight.load(Ordering::Acquire)
    }

    /// Ask the wallet for account access and establish the session.
    ///
    /// Balance and history are refreshed afterwards on a best-effort basis;
    /// their failure does not fail the connection.
    pub async fn connect(&self) -> Result<Session> {
        let accounts = self.provider.request_accounts().await?;
        let address = accounts.first().copied().ok_or(FlipError::UserRejected)?;

        self.establish(address).await;
        tracing::info!("Connected wallet {}", address);

        self.refresh_balance().await;
        self.refresh_history().await;
        Ok(self.snapshot())
    }

    /// Pick up an account the wallet has already authorised, without
    /// prompting. The network is classified either way.
    pub async fn restore(&self) -> Result<Session> {
        let accounts = self.provider.accounts().await?;

        match accounts.first().copied() {
            Some(address) => {
                self.establish(address).await;
                tracing::info!("Restored session for {}", address);
                self.refresh_balance().await;
                self.refresh_history().await;
            }
            None => {
                tracing::debug!("Wallet has no authorised accounts");
                self.classify_best_effort().await;
            }
        }

        Ok(self.snapshot())
    }

    async fn establish(&self, address: Address) {
        {
            let mut session = self.session.write();
            session.address = Some(address);
            session.connected = true;
            session.has_signer = true;
            session.network = NetworkState::Unknown;
            session.chain_id = None;
        }
        self.classify_best_effort().await;
    }

    async fn classify_best_effort(&self) {
        if let Err(e) = self.reclassify_network().await {
            tracing::warn!("Could not determine wallet network: {}", e);
        }
    }

    /// Read the wallet's chain id and classify it against the allow-list.
    pub async fn reclassify_network(&self) -> Result<NetworkState> {
        let chain_id = self.provider.chain_id().await?;
        let state = NetworkState::from(self.checker.classify(chain_id));

        {
            let mut session = self.session.write();
            session.chain_id = Some(chain_id);
            session.network = state;
        }

        if state == NetworkState::Incorrect {
            tracing::warn!(
                "Wallet is on chain {}, expected {} or {}",
                chain_id,
                self.config.production_chain.chain_id,
                self.config.test_chain_id
            );
        }
        Ok(state)
    }

    /// Best effort: on failure the previous balance stays in place.
    pub async fn refresh_balance(&self) {
        let Some(address) = self.session.read().address else {
            return;
        };

        match self.provider.balance(address).await {
            Ok(balance) => {
                let mut session = self.session.write();
                if session.address != Some(address) {
                    tracing::debug!("Dropping balance for {}: session changed", address);
                    return;
                }
                session.balance = balance;
                tracing::debug!("Balance for {}: {} ETH", address, format_ether(balance));
            }
            Err(e) => tracing::warn!("Failed to refresh balance: {}", e),
        }
    }

    /// Best effort: on failure the previous history projection stays.
    pub async fn refresh_history(&self) {
        let Some(address) = self.session.read().address else {
            return;
        };

        match self.contract.history(address).await {
            Ok(records) => {
                // held across the update so a concurrent disconnect clears after us
                let session = self.session.read();
                if session.address != Some(address) {
                    tracing::debug!("Dropping history for {}: session changed", address);
                    return;
                }
                let view = self.history.update(records, address);
                tracing::debug!("Fetched {} history entries", view.entries().len());
            }
            Err(e) => tracing::warn!("Failed to fetch game history: {}", e),
        }
    }

    /// Ask the wallet to add (and switch to) the production chain. Silent
    /// no-op without a wallet; success is not verified here, callers should
    /// run `reclassify_network` afterwards.
    pub async fn request_network_switch(&self) -> Result<()> {
        match self.provider.add_chain(&self.config.production_chain).await {
            Ok(()) => {
                tracing::info!(
                    "Requested switch to {} ({})",
                    self.config.production_chain.chain_name,
                    self.config.production_chain.chain_id
                );
                Ok(())
            }
            Err(FlipError::WalletUnavailable(reason)) => {
                tracing::debug!("Skipping network switch: {}", reason);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub fn disconnect(&self) {
        let mut session = self.session.write();
        *session = Session::default();
        self.history.clear();
        tracing::info!("Session reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockWallet;
    use crate::types::{HistoryRecord, Side};
    use chrono::Utc;

    fn manager() -> (Arc<MockWallet>, SessionManager<MockWallet>) {
        let wallet = Arc::new(MockWallet::new());
        let manager = SessionManager::new(wallet.clone(), FlipConfig::default());
        (wallet, manager)
    }

    #[tokio::test]
    async fn test_connect_populates_session() {
        let (wallet, manager) = manager();

        let session = manager.connect().await.unwrap();
        assert!(session.is_connected());
        assert!(session.can_sign());
        assert!(session.is_correct_network());
        assert_eq!(session.chain_id, Some(8453));
        assert_eq!(session.address, Some(Address::repeat_byte(0xaa)));
        assert_eq!(session.balance_display(), "1.0");

        let calls = wallet.calls();
        assert_eq!(calls, vec!["request_accounts", "chain_id", "balance", "call"]);
    }

    #[tokio::test]
    async fn test_connect_without_wallet() {
        let (wallet, manager) = manager();
        wallet.with(|s| s.available = false);

        let err = manager.connect().await.unwrap_err();
        assert!(matches!(err, FlipError::WalletUnavailable(_)));
        assert!(!manager.snapshot().is_connected());
    }

    #[tokio::test]
    async fn test_connect_declined() {
        let (wallet, manager) = manager();
        wallet.with(|s| s.reject_accounts = true);

        assert!(matches!(manager.connect().await, Err(FlipError::UserRejected)));
        assert_eq!(manager.snapshot(), Session::default());
    }

    #[tokio::test]
    async fn test_connect_on_wrong_network() {
        let (wallet, manager) = manager();
        wallet.with(|s| s.chain_id = 1);

        let session = manager.connect().await.unwrap();
        assert!(session.is_connected());
        assert_eq!(session.network, NetworkState::Incorrect);
    }

    #[tokio::test]
    async fn test_switch_then_reclassify() {
        let (wallet, manager) = manager();
        wallet.with(|s| s.chain_id = 1);
        manager.connect().await.unwrap();

        manager.request_network_switch().await.unwrap();
        assert_eq!(manager.snapshot().network, NetworkState::Incorrect);

        let state = manager.reclassify_network().await.unwrap();
        assert_eq!(state, NetworkState::Correct);

        let added = wallet.added_chains();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].chain_id, 8453);
        assert_eq!(added[0].chain_name, "Base Mainnet");
    }

    #[tokio::test]
    async fn test_switch_without_wallet_is_noop() {
        let (wallet, manager) = manager();
        wallet.with(|s| s.available = false);

        assert!(manager.request_network_switch().await.is_ok());
        assert!(wallet.added_chains().is_empty());
    }

    #[tokio::test]
    async fn test_balance_failure_keeps_previous() {
        let (wallet, manager) = manager();
        manager.connect().await.unwrap();

        wallet.with(|s| {
            s.fail_balance = true;
            s.balance = U256::ZERO;
        });
        manager.refresh_balance().await;
        assert_eq!(manager.snapshot().balance_display(), "1.0");
    }

    #[tokio::test]
    async fn test_restore_without_accounts() {
        let (wallet, manager) = manager();
        wallet.with(|s| s.authorised = false);

        let session = manager.restore().await.unwrap();
        assert!(!session.is_connected());
        assert_eq!(session.network, NetworkState::Correct);
        assert_eq!(wallet.calls(), vec!["accounts", "chain_id"]);
    }

    #[tokio::test]
    async fn test_restore_with_authorised_account() {
        let (_wallet, manager) = manager();
        let session = manager.restore().await.unwrap();
        assert!(session.can_sign());
    }

    #[tokio::test]
    async fn test_history_refresh_and_failure() {
        let (wallet, manager) = manager();
        let record = HistoryRecord {
            id: U256::from(1u64),
            player: Address::repeat_byte(0xaa),
            stake: U256::from(10u64),
            chosen_side: Side::Heads,
            landed_side: Side::Heads,
            won: true,
            timestamp: chrono::DateTime::from_timestamp(Utc::now().timestamp(), 0).unwrap(),
        };
        wallet.with(|s| s.history = vec![record.clone()]);

        manager.connect().await.unwrap();
        assert_eq!(manager.history().entries()[0].record, record);

        wallet.with(|s| s.fail_history = true);
        manager.refresh_history().await;
        assert_eq!(manager.history().entries().len(), 1);
    }

    #[tokio::test]
    async fn test_disconnect_resets() {
        let (_wallet, manager) = manager();
        manager.connect().await.unwrap();
        manager.disconnect();
        assert_eq!(manager.snapshot(), Session::default());
        assert!(manager.history().is_empty());
    }

    #[tokio::test]
    async fn test_balance_arriving_after_disconnect_is_dropped() {
        let (wallet, manager) = manager();
        manager.connect().await.unwrap();
        wallet.with(|s| {
            s.balance = U256::from(5u64);
            s.hold_reads = true;
        });

        let refresh = manager.refresh_balance();
        let leave = async {
            wallet.reading.notified().await;
            manager.disconnect();
            wallet.release.notify_one();
        };
        tokio::join!(refresh, leave);

        assert_eq!(manager.snapshot(), Session::default());
    }

    #[tokio::test]
    async fn test_history_arriving_after_disconnect_is_dropped() {
        let (wallet, manager) = manager();
        manager.connect().await.unwrap();
        let record = HistoryRecord {
            id: U256::from(2u64),
            player: Address::repeat_byte(0xaa),
            stake: U256::from(10u64),
            chosen_side: Side::Tails,
            landed_side: Side::Heads,
            won: false,
            timestamp: chrono::DateTime::from_timestamp(Utc::now().timestamp(), 0).unwrap(),
        };
        wallet.with(|s| {
            s.history = vec![record];
            s.hold_reads = true;
        });

        let refresh = manager.refresh_history();
        let leave = async {
            wallet.reading.notified().await;
            manager.disconnect();
            wallet.release.notify_one();
        };
        tokio::join!(refresh, leave);

        assert!(manager.history().is_empty());
        assert_eq!(manager.snapshot(), Session::default());
    }

    #[test]
    fn test_short_address() {
        let short = short_address(&Address::repeat_byte(0xab));
        assert_eq!(short.len(), 13);
        assert!(short.starts_with("0x"));
        assert!(short.contains("..."));
    }
}
