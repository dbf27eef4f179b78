pub mod config;
pub mod game;
pub mod history;
pub mod session;

pub use config::{handle_config_command, ConfigCommands};
pub use game::{flip, play};
pub use history::{show_history, show_info};
pub use session::{connect, show_balance, show_status, switch_network};

use cryptoflip_core::{
    FlipError, JsonRpcProvider, Result, Session, SessionManager, WagerCoordinator,
};
use std::sync::Arc;

/// Everything a command needs to talk to the wallet and the contract.
pub struct App {
    pub session: Arc<SessionManager<JsonRpcProvider>>,
    pub coordinator: WagerCoordinator<JsonRpcProvider>,
}

impl App {
    pub fn new(session: Arc<SessionManager<JsonRpcProvider>>) -> Self {
        let coordinator = WagerCoordinator::new(session.clone());
        Self {
            session,
            coordinator,
        }
    }

    /// Pick up the account the wallet already authorised for this client.
    /// Each invocation is a fresh process, so this runs before most commands.
    pub async fn restore(&self) -> Result<Session> {
        self.session.restore().await
    }

    pub async fn require_connected(&self) -> Result<Session> {
        let session = self.restore().await?;
        if !session.is_connected() {
            return Err(FlipError::NotConnected);
        }
        Ok(session)
    }
}
