//! Block and balance views.

use crate::cli::utils::{connect, create_table_with_headers, format_tao, print_info};
use crate::config::Config;
use crate::operations::check_all_balances;
use crate::queries::get_current_block;
use crate::utils::balance_newtypes::Rao;

pub async fn show_block(config: &Config) -> anyhow::Result<()> {
    let mut conn = connect(config).await?;
    let block = get_current_block(&conn).await?;
    print_info(&format!("Current block: {block}"));
    conn.close();
    Ok(())
}

pub async fn show_balances(addresses: &[String], config: &Config) -> anyhow::Result<()> {
    let mut conn = connect(config).await?;
    let reports = check_all_balances(&conn, addresses).await?;
    conn.close();

    let mut table = create_table_with_headers(&["Address", "Free"]);
    for report in &reports {
        table.add_row(vec![report.address.clone(), format_tao(report.free)]);
    }
    let total: Rao = reports.iter().map(|r| r.free).sum();
    table.add_row(vec!["Total".to_string(), format_tao(total)]);
    println!("{table}");
    Ok(())
}
