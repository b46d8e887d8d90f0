//! Command-line front end for the manager.
//!
//! # Commands
//!
//! - `block`, `balance`, `subnets`, `subnet`, `stats` - read-only views
//! - `transfer`, `stake`, `register` - signed with the coldkey in
//!   `BTM_COLDKEY_URI`

use crate::config::{expand_home, Config, DEFAULT_CONFIG_PATH};
use crate::logging::{init_logging, LogFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;
pub mod utils;

/// Bittensor wallet manager
#[derive(Parser)]
#[command(name = "btmanager")]
#[command(version)]
#[command(about = "Inspect and manage Bittensor wallets", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Network to connect to (finney, test, archive, local, or a URL)
    #[arg(long, global = true)]
    pub network: Option<String>,

    /// Custom RPC endpoint (overrides --network)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Fallback endpoint, tried in order after the primary (repeatable)
    #[arg(long = "fallback", global = true)]
    pub fallbacks: Vec<String>,

    /// JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log output format (text, json, compact)
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the current block number
    Block,

    /// Show free balances of one or more addresses
    #[command(alias = "b")]
    Balance {
        /// SS58 addresses
        #[arg(required = true)]
        addresses: Vec<String>,
    },

    /// List all subnets with prices and reserves
    Subnets,

    /// Show one subnet's market and registration details
    #[command(alias = "sn")]
    Subnet {
        netuid: u16,
    },

    /// Valued portfolio of a coldkey
    Stats(commands::stats::StatsArgs),

    /// Transfer TAO to another account
    Transfer(commands::wallet::TransferArgs),

    /// Stake operations (add, remove, remove-all, remove-subnet)
    #[command(alias = "s")]
    Stake(commands::stake::StakeCommand),

    /// Burn-register a hotkey on a subnet
    Register(commands::subnet::RegisterArgs),
}

impl Cli {
    /// File config, then environment, then command-line flags.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::load_or_default(expand_home(DEFAULT_CONFIG_PATH))?,
        }
        .apply_env_overrides();

        if let Some(network) = &self.network {
            config = config.with_network(network);
            config.rpc_endpoint = None;
        }
        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(endpoint);
        }
        if !self.fallbacks.is_empty() {
            config = config.with_fallbacks(self.fallbacks.clone());
        }
        if let Some(format) = self.log_format {
            config.logging = config.logging.with_format(format);
        }
        if self.debug {
            config.logging = config.logging.with_debug(true);
        }
        Ok(config)
    }
}

/// Run the CLI application
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    let _guard = init_logging(&config.logging);

    match &cli.command {
        Commands::Block => commands::chain::show_block(&config).await,
        Commands::Balance { addresses } => commands::chain::show_balances(addresses, &config).await,
        Commands::Subnets => commands::subnet::list_subnets(&config).await,
        Commands::Subnet { netuid } => commands::subnet::show_subnet(*netuid, &config).await,
        Commands::Stats(args) => commands::stats::execute(args, &config).await,
        Commands::Transfer(args) => commands::wallet::transfer(args, &config).await,
        Commands::Stake(cmd) => commands::stake::execute(cmd, &config).await,
        Commands::Register(args) => commands::subnet::register(args, &config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, r#"{"network": "test", "rpc_endpoint": "ws://file:9944"}"#).unwrap();
        let cli = Cli::parse_from([
            "btmanager",
            "--config",
            path.to_str().unwrap(),
            "--network",
            "local",
            "--fallback",
            "ws://a:9944",
            "--fallback",
            "ws://b:9944",
            "--log-format",
            "json",
            "block",
        ]);
        let config = cli.load_config().unwrap();
        assert_eq!(config.chain_endpoint(), "ws://127.0.0.1:9944");
        assert_eq!(config.fallback_endpoints, vec!["ws://a:9944", "ws://b:9944"]);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_stake_subcommands_parse() {
        let cli = Cli::parse_from([
            "btmanager",
            "stake",
            "remove-subnet",
            "--hotkey",
            "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY",
            "--netuid",
            "3",
        ]);
        assert!(matches!(cli.command, Commands::Stake(_)));
    }

    #[test]
    fn test_netuid_short_flag_with_network() {
        let hotkey = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";
        let cli = Cli::try_parse_from([
            "btmanager", "--network", "test", "register", "-n", "7", "-k", hotkey,
        ])
        .unwrap();
        assert_eq!(cli.network.as_deref(), Some("test"));
        match cli.command {
            Commands::Register(args) => assert_eq!(args.netuid, 7),
            _ => panic!("expected register"),
        }

        let cli = Cli::try_parse_from([
            "btmanager", "stake", "add", "-k", hotkey, "-n", "3", "-a", "1.5", "--network", "local",
        ])
        .unwrap();
        assert_eq!(cli.network.as_deref(), Some("local"));
        assert!(matches!(cli.command, Commands::Stake(_)));
    }
}
