use crate::config::CliConfig;
use clap::Subcommand;
use cryptoflip_core::{FlipConfig, Result};
use dialoguer::Confirm;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write the effective configuration to the data directory
    Init {
        /// Overwrite an existing file without asking
        #[arg(short, long)]
        force: bool,
        /// Target Base Goerli on network switches
        #[arg(long)]
        testnet: bool,
    },
}

pub async fn handle_config_command(
    cmd: ConfigCommands,
    cli: &CliConfig,
    config: FlipConfig,
) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let path = cli.config_path();
            if cli.exists() {
                println!("Config file: {}", path.display());
            } else {
                println!("Config file: {} (not created, showing defaults)", path.display());
            }
            println!("{}", serde_json::to_string_pretty(&config)?);
        }

        ConfigCommands::Init { force, testnet } => {
            let path = cli.config_path();

            if cli.exists() && !force {
                let overwrite = Confirm::new()
                    .with_prompt(format!("{} exists. Overwrite?", path.display()))
                    .default(false)
                    .interact()?;
                if !overwrite {
                    println!("Config unchanged.");
                    return Ok(());
                }
            }

            let config = if testnet {
                FlipConfig {
                    rpc_url: config.rpc_url,
                    contract_address: config.contract_address,
                    ..FlipConfig::testnet()
                }
            } else {
                config
            };

            config.save(&path).await?;
            println!("Config written to {}", path.display());
        }
    }

    Ok(())
}
