use super::App;
use cryptoflip_core::{NetworkState, Result, Session};

pub async fn connect(app: &App) -> Result<()> {
    println!("Requesting wallet access...");
    let session = app.session.connect().await?;

    println!("Wallet connected!");
    print_session(app, &session);

    if session.network == NetworkState::Incorrect {
        println!();
        println!("Your wallet is on the wrong network.");
        println!("Switch with: cryptoflip switch-network");
    }
    Ok(())
}

pub async fn show_status(app: &App) -> Result<()> {
    let session = app.restore().await?;

    if !session.is_connected() {
        println!("Status: not connected");
        println!("  Network: {}", network_label(&session));
        println!();
        println!("Connect with: cryptoflip connect");
        return Ok(());
    }

    println!("Status: connected");
    print_session(app, &session);
    Ok(())
}

pub async fn show_balance(app: &App) -> Result<()> {
    let session = app.require_connected().await?;
    println!("Balance: {} ETH", session.balance_display());
    Ok(())
}

pub async fn switch_network(app: &App) -> Result<()> {
    let chain = &app.session.config().production_chain;
    println!("Asking the wallet to switch to {}...", chain.chain_name);

    app.session.request_network_switch().await?;

    match app.session.reclassify_network().await? {
        NetworkState::Correct => println!("Wallet is on a supported network."),
        _ => {
            println!("Wallet is still on an unsupported network.");
            println!("Approve the switch in your wallet, then run: cryptoflip status");
        }
    }
    Ok(())
}

fn print_session(app: &App, session: &Session) {
    if let Some(address) = session.address {
        println!(
            "  Address: {} ({})",
            session.short_address().unwrap_or_default(),
            address
        );
        if let Some(url) = app.session.config().production_chain.address_url(&address) {
            println!("  Explorer: {}", url);
        }
    }
    println!("  Network: {}", network_label(session));
    println!("  Balance: {} ETH", session.balance_display());
}

fn network_label(session: &Session) -> String {
    let chain = session
        .chain_id
        .map(|id| format!("chain {}", id))
        .unwrap_or_else(|| "unknown chain".to_string());

    match session.network {
        NetworkState::Correct => format!("{} (supported)", chain),
        NetworkState::Incorrect => format!("{} (unsupported)", chain),
        NetworkState::Unknown => chain,
    }
}
