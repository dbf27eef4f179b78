mod commands;
mod config;
mod display;

use alloy_primitives::Address;
use clap::{Parser, Subcommand};
use commands::App;
use config::CliConfig;
use cryptoflip_core::{FlipError, JsonRpcProvider, SessionManager, Side, TxFailure};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cryptoflip")]
#[command(about = "CryptoFlip - on-chain coin flip on Base")]
#[command(version)]
struct Cli {
    /// Data directory for configuration
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Wallet JSON-RPC endpoint
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Coin flip contract address
    #[arg(long, global = true)]
    contract: Option<Address>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect your wallet
    Connect,
    /// Show connection, network and balance
    Status,
    /// Show wallet balance
    Balance,
    /// Ask the wallet to switch to Base
    SwitchNetwork,
    /// Flip the coin
    Flip {
        /// heads or tails
        side: Side,
        /// Stake in ETH, e.g. 0.01
        stake: String,
    },
    /// Show your game history
    History,
    /// Show contract information
    Info,
    /// Play interactively
    Play,
    /// Configuration commands
    #[command(subcommand)]
    Config(commands::ConfigCommands),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "cryptoflip={},cryptoflip_core={}",
            log_level, log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli_config = CliConfig::new(cli.data_dir, cli.rpc_url, cli.contract);

    // Ensure data directory exists
    tokio::fs::create_dir_all(&cli_config.data_dir).await?;

    let config = cli_config.resolve().await?;

    let provider = Arc::new(JsonRpcProvider::new(&config.rpc_url)?);
    let app = App::new(Arc::new(SessionManager::new(provider, config.clone())));

    // Execute command
    let result = match cli.command {
        Commands::Connect => commands::connect(&app).await,
        Commands::Status => commands::show_status(&app).await,
        Commands::Balance => commands::show_balance(&app).await,
        Commands::SwitchNetwork => commands::switch_network(&app).await,
        Commands::Flip { side, stake } => commands::flip(&app, side, &stake).await,
        Commands::History => commands::show_history(&app).await,
        Commands::Info => commands::show_info(&app).await,
        Commands::Play => commands::play(&app).await,
        Commands::Config(cmd) => commands::handle_config_command(cmd, &cli_config, config).await,
    };

    if let Err(e) = result {
        report(&e);
        std::process::exit(1);
    }

    Ok(())
}

fn report(e: &FlipError) {
    match e {
        FlipError::WalletUnavailable(reason) => {
            eprintln!("Error: No wallet reachable ({})", reason);
            eprintln!("Start your wallet's RPC endpoint or pass --rpc-url");
        }
        FlipError::NotConnected => {
            eprintln!("Error: Wallet is not connected");
            eprintln!("Use 'cryptoflip connect' to connect your wallet");
        }
        FlipError::WrongNetwork { .. } => {
            eprintln!("Error: {}", e);
            eprintln!("Use 'cryptoflip switch-network' to switch to Base");
        }
        FlipError::TransactionFailed(TxFailure::Timeout { tx_hash }) => {
            eprintln!("Error: Transaction {} was not confirmed in time", tx_hash);
            eprintln!("It may still be mined; check 'cryptoflip history' later");
        }
        _ => {
            eprintln!("Error: {}", e);
        }
    }
}
