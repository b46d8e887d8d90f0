//! Subnet views and burn registration.

use crate::chain::SubmitOptions;
use crate::cli::utils::{
    connect, create_table_with_headers, format_tao, print_error, print_info, print_success,
    print_warning, signer_from_env,
};
use crate::config::Config;
use crate::operations::{burn_register, get_registration_info};
use crate::queries::get_all_dynamic_info;
use crate::stats::get_subnet_overview;
use crate::utils::ss58::short_address;
use clap::Args;

#[derive(Args, Clone)]
pub struct RegisterArgs {
    /// Subnet ID
    #[arg(short, long)]
    pub netuid: u16,
    /// Hotkey SS58 address to register
    #[arg(short = 'k', long)]
    pub hotkey: String,
    /// Check the coldkey balance against the burn cost first
    #[arg(long)]
    pub check_balance: bool,
}

pub async fn list_subnets(config: &Config) -> anyhow::Result<()> {
    let mut conn = connect(config).await?;
    let mut subnets = get_all_dynamic_info(&conn).await?;
    conn.close();
    subnets.sort_by_key(|s| s.netuid);

    let mut table =
        create_table_with_headers(&["NetUID", "Name", "Symbol", "Price (τ)", "TAO In", "Tempo"]);
    for subnet in &subnets {
        table.add_row(vec![
            subnet.netuid.to_string(),
            subnet.display_name(),
            subnet.display_symbol().to_string(),
            format!("{:.6}", subnet.moving_price),
            format_tao(subnet.tao_in),
            subnet.tempo.to_string(),
        ]);
    }
    println!("{table}");
    print_info(&format!("{} subnets", subnets.len()));
    Ok(())
}

pub async fn show_subnet(netuid: u16, config: &Config) -> anyhow::Result<()> {
    let mut conn = connect(config).await?;
    let overview = get_subnet_overview(&conn, netuid).await?;
    conn.close();

    let Some(overview) = overview else {
        print_error(&format!("Subnet {netuid} not found"));
        return Err(anyhow::anyhow!("Subnet {netuid} not found"));
    };

    let optional = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
    let mut table = create_table_with_headers(&["Field", "Value"]);
    table.add_row(vec!["Name".to_string(), overview.name.clone()]);
    table.add_row(vec!["Symbol".to_string(), overview.symbol.clone()]);
    table.add_row(vec!["Tempo".to_string(), overview.tempo.to_string()]);
    table.add_row(vec!["Price (τ)".to_string(), format!("{:.6}", overview.moving_price)]);
    table.add_row(vec!["TAO in pool".to_string(), format_tao(overview.tao_in)]);
    table.add_row(vec!["Alpha out".to_string(), overview.alpha_out.to_string()]);
    table.add_row(vec!["Burn cost".to_string(), format_tao(overview.burn_cost)]);
    table.add_row(vec![
        "Registration".to_string(),
        optional(
            overview
                .registration_allowed
                .map(|allowed| if allowed { "open" } else { "closed" }.to_string()),
        ),
    ]);
    table.add_row(vec![
        "Burn range".to_string(),
        optional(
            overview
                .min_burn
                .zip(overview.max_burn)
                .map(|(min, max)| format!("{} .. {}", format_tao(min), format_tao(max))),
        ),
    ]);
    table.add_row(vec![
        "Neurons".to_string(),
        optional(
            overview
                .neurons
                .zip(overview.max_neurons)
                .map(|(n, max)| format!("{n}/{max}")),
        ),
    ]);
    println!("{table}");
    Ok(())
}

pub async fn register(args: &RegisterArgs, config: &Config) -> anyhow::Result<()> {
    let signer = signer_from_env()?;
    let mut conn = connect(config).await?;

    let info = get_registration_info(&conn, args.netuid).await?;
    print_info(&format!(
        "Registering {} on subnet {} for {}",
        short_address(&args.hotkey),
        args.netuid,
        format_tao(info.burn)
    ));
    if !info.registration_allowed {
        print_warning("Registration appears to be disabled on this subnet");
    }

    let outcome = burn_register(
        &conn,
        &signer,
        &args.hotkey,
        args.netuid,
        args.check_balance,
        &SubmitOptions::default(),
    )
    .await?;
    conn.close();

    if !outcome.success {
        let message = outcome.message.unwrap_or_else(|| "Unknown error".to_string());
        print_error(&format!("Registration failed: {message}"));
        return Err(anyhow::anyhow!("Registration failed: {message}"));
    }
    match (outcome.message, outcome.uid) {
        (Some(note), _) => print_success(&note),
        (None, Some(uid)) => print_success(&format!("Registered with UID {uid}")),
        (None, None) => print_success("Registered"),
    }
    Ok(())
}
