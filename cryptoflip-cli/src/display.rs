use alloy_primitives::U256;
use chrono::Utc;
use comfy_table::{presets::UTF8_FULL, Table};
use cryptoflip_core::amount::format_ether;
use cryptoflip_core::{ChainDescriptor, GameView, HistoryView, Settlement};
use std::future::Future;
use std::io::Write;
use std::time::Duration;
use tokio::sync::watch;

const COIN_FRAMES: [&str; 4] = ["(H)", "(|)", "(T)", "(|)"];

/// Drive `wager` to completion, spinning a coin while the game view says a
/// flip is in progress.
pub async fn with_coin_animation<F, T>(view: watch::Receiver<GameView>, wager: F) -> T
where
    F: Future<Output = T>,
{
    tokio::pin!(wager);
    let mut ticker = tokio::time::interval(Duration::from_millis(150));
    let mut frame = 0usize;

    loop {
        tokio::select! {
            result = &mut wager => {
                print!("\r{:40}\r", "");
                let _ = std::io::stdout().flush();
                return result;
            }
            _ = ticker.tick() => {
                if view.borrow().flipping {
                    print!(
                        "\r  Flipping {}  waiting for confirmation...",
                        COIN_FRAMES[frame % COIN_FRAMES.len()]
                    );
                    let _ = std::io::stdout().flush();
                    frame += 1;
                }
            }
        }
    }
}

pub fn print_settlement(settlement: &Settlement, payout: Option<U256>, chain: &ChainDescriptor) {
    println!();
    match settlement {
        Settlement::Resolved(outcome) => {
            if outcome.won {
                println!("=== YOU WON ===");
            } else {
                println!("=== YOU LOST ===");
            }
            println!("  Your choice: {}", outcome.chosen_side);
            println!("  Coin landed: {}", outcome.landed_side);
            println!("  Stake: {} ETH", format_ether(outcome.stake));
            if let (true, Some(payout)) = (outcome.won, payout) {
                println!("  Payout: {} ETH", format_ether(payout));
            }
        }
        Settlement::Indeterminate { .. } => {
            println!("=== RESULT UNKNOWN ===");
            println!("  The transaction was confirmed but carried no readable result.");
            println!("  Check the explorer before assuming a win or a loss.");
        }
    }

    let hash = settlement.tx_hash();
    match chain.tx_url(&hash) {
        Some(url) => println!("  Transaction: {}", url),
        None => println!("  Transaction: {}", hash),
    }
    println!();
}

pub fn print_history(view: &HistoryView) {
    if view.is_empty() {
        println!("No game history found.");
        return;
    }

    if view.is_illustrative() {
        println!("Sample games (not on-chain):");
    }

    let now = Utc::now();
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Choice", "Result", "Outcome", "Amount", "When"]);

    for entry in view.entries() {
        let record = &entry.record;
        table.add_row(vec![
            record.id.to_string(),
            record.chosen_side.to_string(),
            record.landed_side.to_string(),
            if record.won { "Won" } else { "Lost" }.to_string(),
            entry.signed_amount(),
            entry.relative_time(now),
        ]);
    }
    println!("{}", table);

    let summary = view.summary();
    if summary.games > 0 {
        println!(
            "{} games: {} won, {} lost, net {}",
            summary.games,
            summary.wins,
            summary.losses,
            summary.net_display()
        );
    }
}
