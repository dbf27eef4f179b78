use cryptoflip_core::amount::format_ether;
use cryptoflip_core::{FlipConfig, JsonRpcProvider, SessionManager, Side, WagerCoordinator};
use std::sync::Arc;
use tempfile::tempdir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Config round trip through a temp dir
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join("config.json");
    FlipConfig::default().save(&path).await?;
    let config = FlipConfig::load_or_default(&path).await?;
    println!("Using wallet RPC at {}", config.rpc_url);

    let provider = Arc::new(JsonRpcProvider::new(&config.rpc_url)?);
    let session = Arc::new(SessionManager::new(provider, config));

    println!("Connecting wallet...");
    let snapshot = session.connect().await?;
    println!("Connected: {:?}", snapshot.short_address());
    println!("Network: {:?}", snapshot.network);
    println!("Balance: {} ETH", snapshot.balance_display());

    let coordinator = WagerCoordinator::new(session.clone());
    let payout = coordinator.potential_payout("0.01").await?;
    println!("\nTo win on 0.01 ETH: {} ETH", format_ether(payout));

    // Only wager when explicitly asked to
    if std::env::args().any(|arg| arg == "--flip") {
        let settlement = coordinator.place_wager(Side::Heads, "0.01").await?;
        println!("Settlement: {:?}", settlement);
    }

    let history = session.history();
    println!("\nGame history: {} games", history.entries().len());

    println!("\nExample completed successfully!");

    Ok(())
}
