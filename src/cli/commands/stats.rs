//! Portfolio view of a coldkey.

use crate::cli::utils::{
    connect, create_table_with_headers, format_tao, format_usd, print_info, print_warning,
};
use crate::config::Config;
use crate::stats::{build_global_registration_cache, get_wallet_snapshot, HttpPriceFeed, PriceSource};
use clap::Args;

#[derive(Args, Clone)]
pub struct StatsArgs {
    /// Coldkey SS58 address
    pub address: String,
    /// Hotkeys owned by the coldkey, to list registrations without stake
    #[arg(short = 'k', long = "hotkey")]
    pub hotkeys: Vec<String>,
    /// Skip the USD price lookup
    #[arg(long)]
    pub no_usd: bool,
    /// Print the snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: &StatsArgs, config: &Config) -> anyhow::Result<()> {
    let mut conn = connect(config).await?;
    let feed = if args.no_usd {
        None
    } else {
        match HttpPriceFeed::new(config.price_feed.clone()) {
            Ok(feed) => Some(feed),
            Err(e) => {
                print_warning(&format!("Price feed unavailable, USD values skipped: {e}"));
                None
            }
        }
    };
    let price = feed.as_ref().map(|feed| feed as &dyn PriceSource);

    let cache = build_global_registration_cache(&conn).await?;
    let snapshot = get_wallet_snapshot(&conn, &args.address, price, &args.hotkeys, Some(&cache))
        .await?;
    conn.close();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let mut table = create_table_with_headers(&[
        "NetUID", "Subnet", "Hotkey", "UID", "Stake (α)", "Value (τ)", "Price", "τ/block", "Incentive",
    ]);
    for row in &snapshot.subnets {
        table.add_row(vec![
            row.netuid.to_string(),
            row.subnet_name.clone(),
            crate::utils::ss58::short_address(&row.hotkey),
            row.uid.map_or_else(|| "-".to_string(), |uid| uid.to_string()),
            format!("{:.4}", row.alpha_stake),
            format!("{:.4}", row.tao_value),
            format!("{:.6}", row.moving_price),
            format!("{:.6}", row.emission_per_block),
            format!("{:.4}", row.incentive),
        ]);
    }
    println!("{table}");

    print_info(&format!("Free balance: {}", format_tao(snapshot.free_balance)));
    print_info(&format!("Staked: {:.4} τ", snapshot.total_staked_tao));
    print_info(&format!("Total: {:.4} τ", snapshot.total_value_tao));
    print_info(&format!(
        "Emission: {:.6} τ/block",
        snapshot.total_emission_per_block
    ));
    if !args.no_usd {
        print_info(&format!(
            "TAO price: {}  Total value: {}",
            format_usd(snapshot.tao_price_usd),
            format_usd(snapshot.total_value_usd)
        ));
    }
    Ok(())
}
