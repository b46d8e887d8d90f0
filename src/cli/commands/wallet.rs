//! TAO transfers from the configured coldkey.

use crate::chain::{KeySigner, SubmitOptions};
use crate::cli::utils::{connect, print_error, print_info, report_outcome, signer_from_env};
use crate::config::Config;
use crate::core::constants::BALANCES_MODULE;
use crate::operations::{transfer as submit_transfer, TransferOptions};
use crate::utils::balance_newtypes::Tao;
use crate::utils::ss58::is_valid_ss58_address;
use clap::Args;

#[derive(Args, Clone)]
pub struct TransferArgs {
    /// Destination SS58 address
    #[arg(short, long)]
    pub dest: String,
    /// Amount in TAO
    #[arg(short, long)]
    pub amount: f64,
    /// Allow the transfer to reap the sender account
    #[arg(long)]
    pub allow_death: bool,
    /// Compare the free balance with the amount before submitting
    #[arg(long)]
    pub check_balance: bool,
}

pub async fn transfer(args: &TransferArgs, config: &Config) -> anyhow::Result<()> {
    if args.amount <= 0.0 {
        print_error("Amount must be positive");
        return Err(anyhow::anyhow!("Invalid amount"));
    }
    if !is_valid_ss58_address(&args.dest) {
        print_error(&format!("Invalid destination address: {}", args.dest));
        return Err(anyhow::anyhow!("Invalid destination address"));
    }

    let signer = signer_from_env()?;
    let mut conn = connect(config).await?;
    print_info(&format!(
        "Transferring {} from {} to {}",
        Tao(args.amount),
        signer.ss58_address(),
        args.dest
    ));

    let options = TransferOptions {
        keep_alive: !args.allow_death,
        check_balance: args.check_balance,
    };
    let outcome = submit_transfer(
        &conn,
        &signer,
        &args.dest,
        Tao(args.amount),
        options,
        &SubmitOptions::default(),
    )
    .await?;
    conn.close();

    let call = if options.keep_alive {
        "transfer_keep_alive"
    } else {
        "transfer_allow_death"
    };
    report_outcome(&outcome, BALANCES_MODULE, call)
}
