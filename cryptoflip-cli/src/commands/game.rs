use super::App;
use crate::display;
use cryptoflip_core::amount::{format_ether, parse_stake};
use cryptoflip_core::{FlipError, NetworkState, Result, Settlement, Side};
use dialoguer::{Confirm, Input, Select};

pub async fn flip(app: &App, side: Side, stake: &str) -> Result<()> {
    let session = app.require_connected().await?;
    println!("Balance: {} ETH", session.balance_display());
    play_round(app, side, stake).await?;
    Ok(())
}

/// Place one wager with the coin animation running, then print the result.
async fn play_round(app: &App, side: Side, stake: &str) -> Result<Settlement> {
    let payout = app.coordinator.potential_payout(stake).await.ok();
    if let Some(payout) = payout {
        println!(
            "Flipping {} for {} ETH (to win {} ETH)",
            side,
            stake.trim(),
            format_ether(payout)
        );
    }
    println!("Confirm the transaction in your wallet.");

    let settlement = display::with_coin_animation(
        app.coordinator.subscribe(),
        app.coordinator.place_wager(side, stake),
    )
    .await?;

    display::print_settlement(&settlement, payout, &app.session.config().production_chain);
    println!("Balance: {} ETH", app.session.snapshot().balance_display());
    Ok(settlement)
}

pub async fn play(app: &App) -> Result<()> {
    let mut session = app.restore().await?;

    if !session.is_connected() {
        let connect = Confirm::new()
            .with_prompt("No wallet connected. Connect now?")
            .default(true)
            .interact()?;
        if !connect {
            return Err(FlipError::NotConnected);
        }
        session = app.session.connect().await?;
    }

    if session.network != NetworkState::Correct {
        let switch = Confirm::new()
            .with_prompt(format!(
                "Wallet is not on a supported network. Switch to {}?",
                app.session.config().production_chain.chain_name
            ))
            .default(true)
            .interact()?;
        if switch {
            app.session.request_network_switch().await?;
            app.session.reclassify_network().await?;
        }
    }

    let edge = app.coordinator.house_edge().await;
    println!("House edge: {}%", edge);

    let sides = ["Heads", "Tails"];
    loop {
        println!();
        println!("Balance: {} ETH", app.session.snapshot().balance_display());

        let pick = Select::new()
            .with_prompt("Pick a side")
            .items(&sides)
            .default(0)
            .interact()?;
        let side = if pick == 0 { Side::Heads } else { Side::Tails };

        let stake: String = Input::new()
            .with_prompt("Stake (ETH)")
            .default("0.01".to_string())
            .validate_with(|input: &String| {
                parse_stake(input).map(|_| ()).map_err(|e| e.to_string())
            })
            .interact_text()?;

        match play_round(app, side, &stake).await {
            Ok(_) => {}
            Err(e @ (FlipError::WrongNetwork { .. } | FlipError::NotConnected)) => return Err(e),
            Err(e) => {
                tracing::debug!("Round failed: {:?}", e);
                println!("Flip failed: {}", e);
            }
        }

        let again = Confirm::new()
            .with_prompt("Play again?")
            .default(true)
            .interact()?;
        if !again {
            break;
        }
    }

    let summary = app.session.history().summary();
    if summary.games > 0 {
        println!(
            "Session over. All-time: {} won, {} lost, net {}",
            summary.wins,
            summary.losses,
            summary.net_display()
        );
    }
    Ok(())
}
