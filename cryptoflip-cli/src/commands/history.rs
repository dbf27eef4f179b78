use super::App;
use crate::display;
use cryptoflip_core::amount::format_ether;
use cryptoflip_core::Result;

pub async fn show_history(app: &App) -> Result<()> {
    let session = app.require_connected().await?;
    println!(
        "Game history for {}:",
        session.short_address().unwrap_or_default()
    );
    display::print_history(&app.session.history());
    Ok(())
}

pub async fn show_info(app: &App) -> Result<()> {
    let config = app.session.config();
    let contract = app.session.contract();

    println!("CryptoFlip contract");
    println!("  Address: {}", contract.address());
    if let Some(url) = config.production_chain.address_url(&contract.address()) {
        println!("  Explorer: {}", url);
    }
    println!(
        "  Networks: {} ({}), test chain {}",
        config.production_chain.chain_name,
        config.production_chain.chain_id,
        config.test_chain_id
    );
    println!("  Wallet RPC: {}", config.rpc_url);

    println!("  House edge: {}%", app.coordinator.house_edge().await);

    match contract.stats().await {
        Ok(stats) => {
            println!("  Total games: {}", stats.total_games);
            println!("  Total fees: {} ETH", format_ether(stats.total_fees));
        }
        Err(e) => {
            tracing::debug!("Stats unavailable: {}", e);
            println!("  Stats: unavailable");
        }
    }
    Ok(())
}
