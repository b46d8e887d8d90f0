//! Stake commands for moving TAO in and out of subnets.

use crate::chain::SubmitOptions;
use crate::cli::utils::{connect, print_error, print_info, report_outcome, signer_from_env};
use crate::config::Config;
use crate::core::constants::SUBTENSOR_MODULE;
use crate::operations::{add_stake, remove_stake, remove_stake_full_limit, unstake_all, PriceLimit};
use crate::utils::balance_newtypes::{Alpha, Tao};
use crate::utils::ss58::short_address;
use clap::{Args, Subcommand};

/// Stake command container
#[derive(Args, Clone)]
pub struct StakeCommand {
    #[command(subcommand)]
    pub command: StakeCommands,
}

#[derive(Subcommand, Clone)]
pub enum StakeCommands {
    /// Stake TAO on a hotkey in a subnet
    Add {
        /// Hotkey SS58 address
        #[arg(short = 'k', long)]
        hotkey: String,
        #[arg(short, long)]
        netuid: u16,
        /// Amount in TAO to stake
        #[arg(short, long)]
        amount: f64,
        /// Highest acceptable price in TAO per alpha
        #[arg(long)]
        limit_price: Option<f64>,
        /// Fail instead of partially filling at the limit
        #[arg(long, requires = "limit_price")]
        strict: bool,
    },

    /// Unstake alpha from a hotkey in a subnet
    Remove {
        #[arg(short = 'k', long)]
        hotkey: String,
        #[arg(short, long)]
        netuid: u16,
        /// Amount in alpha to unstake
        #[arg(short, long)]
        amount: f64,
        /// Lowest acceptable price in TAO per alpha
        #[arg(long)]
        limit_price: Option<f64>,
        #[arg(long, requires = "limit_price")]
        strict: bool,
    },

    /// Unstake everything from a hotkey on every subnet
    RemoveAll {
        #[arg(short = 'k', long)]
        hotkey: String,
    },

    /// Unstake everything from a hotkey in one subnet
    RemoveSubnet {
        #[arg(short = 'k', long)]
        hotkey: String,
        #[arg(short, long)]
        netuid: u16,
        /// Price floor in TAO per alpha; 0 means none
        #[arg(long)]
        min_price: Option<f64>,
    },
}

fn price_limit(price: Option<f64>, strict: bool) -> Option<PriceLimit> {
    price.map(|p| {
        let limit = PriceLimit::new(p);
        if strict {
            limit.all_or_nothing()
        } else {
            limit
        }
    })
}

/// Execute stake commands
pub async fn execute(cmd: &StakeCommand, config: &Config) -> anyhow::Result<()> {
    if let StakeCommands::Add { amount, .. } | StakeCommands::Remove { amount, .. } = &cmd.command {
        if *amount <= 0.0 {
            print_error("Amount must be positive");
            return Err(anyhow::anyhow!("Invalid amount"));
        }
    }

    let signer = signer_from_env()?;
    let mut conn = connect(config).await?;
    let opts = SubmitOptions::default();

    let (outcome, call) = match &cmd.command {
        StakeCommands::Add {
            hotkey,
            netuid,
            amount,
            limit_price,
            strict,
        } => {
            print_info(&format!(
                "Staking {} on {} in subnet {}",
                Tao(*amount),
                short_address(hotkey),
                netuid
            ));
            let limit = price_limit(*limit_price, *strict);
            let call = if limit.is_some() { "add_stake_limit" } else { "add_stake" };
            let outcome =
                add_stake(&conn, &signer, hotkey, *netuid, Tao(*amount), limit, &opts).await?;
            (outcome, call)
        }
        StakeCommands::Remove {
            hotkey,
            netuid,
            amount,
            limit_price,
            strict,
        } => {
            let amount = Alpha::from_alpha(*amount);
            print_info(&format!(
                "Unstaking {} from {} in subnet {}",
                amount,
                short_address(hotkey),
                netuid
            ));
            let limit = price_limit(*limit_price, *strict);
            let call = if limit.is_some() {
                "remove_stake_limit"
            } else {
                "remove_stake"
            };
            let outcome =
                remove_stake(&conn, &signer, hotkey, *netuid, amount, limit, &opts).await?;
            (outcome, call)
        }
        StakeCommands::RemoveAll { hotkey } => {
            print_info(&format!("Unstaking everything from {}", short_address(hotkey)));
            (unstake_all(&conn, &signer, hotkey, &opts).await?, "unstake_all")
        }
        StakeCommands::RemoveSubnet {
            hotkey,
            netuid,
            min_price,
        } => {
            print_info(&format!(
                "Unstaking everything from {} in subnet {}",
                short_address(hotkey),
                netuid
            ));
            let outcome =
                remove_stake_full_limit(&conn, &signer, hotkey, *netuid, *min_price, &opts).await?;
            (outcome, "remove_stake_full_limit")
        }
    };
    conn.close();
    report_outcome(&outcome, SUBTENSOR_MODULE, call)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_limit_flags() {
        assert_eq!(price_limit(None, false), None);
        assert!(price_limit(Some(0.5), false).unwrap().allow_partial);
        assert!(!price_limit(Some(0.5), true).unwrap().allow_partial);
    }
}
