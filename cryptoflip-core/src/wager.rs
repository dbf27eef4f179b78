use crate::amount::{parse_stake, potential_payout};
use crate::contract::ConfirmationPolicy;
use crate::error::{FlipError, Result};
use crate::provider::{Receipt, WalletProvider};
use crate::session::SessionManager;
use crate::types::{Settlement, Side, TxHash, WagerOutcome, WagerRequest};
use alloy_primitives::U256;
use std::sync::Arc;
use tokio::sync::watch;

/// Edge assumed when the contract cannot be asked for it.
pub const DEFAULT_HOUSE_EDGE_PERCENT: u64 = 3;

/// What the presentation layer renders for the game panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameView {
    pub flipping: bool,
    pub choice: Option<Side>,
    pub last: Option<Settlement>,
    pub last_error: Option<String>,
}

/// Places wagers for the session's player. At most one wager is pending per
/// session, however many coordinators share it.
pub struct WagerCoordinator<P> {
    session: Arc<SessionManager<P>>,
    view: watch::Sender<GameView>,
}

impl<P: WalletProvider> WagerCoordinator<P> {
    pub fn new(session: Arc<SessionManager<P>>) -> Self {
        let (view, _) = watch::channel(GameView::default());
        Self { session, view }
    }

    pub fn session(&self) -> &Arc<SessionManager<P>> {
        &self.session
    }

    pub fn subscribe(&self) -> watch::Receiver<GameView> {
        self.view.subscribe()
    }

    pub fn view(&self) -> GameView {
        self.view.borrow().clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.session.is_wager_in_flight()
    }

    /// Submit one `flip` for `side` with `stake` ether attached and wait for
    /// the contract to report the result.
    ///
    /// Precondition failures return before the wallet is contacted. Once the
    /// transaction has been attempted, balance and history are refreshed
    /// regardless of the outcome, after the outcome has been published.
    pub async fn place_wager(&self, side: Side, stake: &str) -> Result<Settlement> {
        let request = self.prepare(side, stake)?;
        let slot = self.session.begin_wager()?;

        self.view.send_modify(|view| {
            view.flipping = true;
            view.choice = Some(side);
            view.last = None;
            view.last_error = None;
        });

        let result = self.execute(&request).await;

        match &result {
            Ok(settlement) => {
                self.view.send_modify(|view| {
                    view.flipping = false;
                    view.last = Some(settlement.clone());
                });
            }
            Err(e) => {
                tracing::warn!("Wager failed: {}", e);
                let message = e.to_string();
                self.view.send_modify(|view| {
                    view.flipping = false;
                    view.last_error = Some(message);
                });
            }
        }
        drop(slot);

        self.session.refresh_balance().await;
        self.session.refresh_history().await;

        result
    }

    fn prepare(&self, side: Side, stake: &str) -> Result<WagerRequest> {
        let session = self.session.snapshot();

        let player = match session.address {
            Some(address) if session.can_sign() => address,
            _ => return Err(FlipError::NotConnected),
        };

        if !session.is_correct_network() {
            return Err(FlipError::WrongNetwork {
                chain_id: session.chain_id,
            });
        }

        let stake = parse_stake(stake)?;

        Ok(WagerRequest {
            player,
            side,
            stake,
        })
    }

    async fn execute(&self, request: &WagerRequest) -> Result<Settlement> {
        let contract = self.session.contract();
        let config = self.session.config();
        let policy = ConfirmationPolicy {
            timeout: config.confirmation_timeout,
            poll_interval: config.poll_interval,
        };

        let tx_hash = contract
            .submit_wager(request.player, request.side, request.stake)
            .await
            .map_err(|e| e.into_tx_failure(None))?;

        let receipt = contract
            .await_confirmation(tx_hash, policy)
            .await
            .map_err(|e| e.into_tx_failure(Some(tx_hash)))?;

        let settlement = self.settle(request, tx_hash, &receipt);
        match &settlement {
            Settlement::Resolved(outcome) => tracing::info!(
                "Wager {} settled: landed {}, {}",
                tx_hash,
                outcome.landed_side,
                if outcome.won { "won" } else { "lost" }
            ),
            Settlement::Indeterminate { .. } => {
                tracing::info!("Wager {} confirmed without a readable result", tx_hash)
            }
        }
        Ok(settlement)
    }

    fn settle(&self, request: &WagerRequest, tx_hash: TxHash, receipt: &Receipt) -> Settlement {
        let contract = self.session.contract();
        let logs = contract.result_logs(receipt);

        let Some(log) = logs.first() else {
            tracing::warn!("Receipt for {} has no Result event", tx_hash);
            return Settlement::Indeterminate { tx_hash };
        };

        if logs.len() > 1 {
            tracing::warn!(
                "Receipt for {} has {} Result events, using the first",
                tx_hash,
                logs.len()
            );
        }

        let event = match contract.decode_result_log(log) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Could not decode Result event for {}: {}", tx_hash, e);
                return Settlement::Indeterminate { tx_hash };
            }
        };

        if event.choice != request.side {
            tracing::warn!(
                "Result event reports choice {} but {} was submitted",
                event.choice,
                request.side
            );
        }

        Settlement::Resolved(WagerOutcome {
            tx_hash,
            chosen_side: request.side,
            landed_side: event.result,
            stake: request.stake,
            won: event.won,
        })
    }

    /// House edge in percent, falling back to the usual 3%.
    pub async fn house_edge(&self) -> U256 {
        match self.session.contract().house_edge().await {
            Ok(edge) => edge,
            Err(e) => {
                tracing::debug!(
                    "House edge unavailable, assuming {}%: {}",
                    DEFAULT_HOUSE_EDGE_PERCENT,
                    e
                );
                U256::from(DEFAULT_HOUSE_EDGE_PERCENT)
            }
        }
    }

    /// The "To Win" figure for a stake typed by the player.
    pub async fn potential_payout(&self, stake: &str) -> Result<U256> {
        let stake = parse_stake(stake)?;
        Ok(potential_payout(stake, self.house_edge().await))
    }
}
