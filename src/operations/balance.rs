use crate::chain::ChainConnection;
use crate::errors::ChainConnectionError;
use crate::queries::get_balance;
use crate::utils::balance_newtypes::Rao;
use futures::future::join_all;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceReport {
    pub address: String,
    pub free: Rao,
}

impl BalanceReport {
    pub fn free_tao(&self) -> f64 {
        self.free.as_tao()
    }
}

pub async fn check_balance(
    conn: &ChainConnection,
    address: &str,
) -> Result<BalanceReport, ChainConnectionError> {
    let free = get_balance(conn, address).await?;
    Ok(BalanceReport {
        address: address.to_string(),
        free,
    })
}

/// Balances of many addresses, fetched concurrently, in input order.
pub async fn check_all_balances(
    conn: &ChainConnection,
    addresses: &[String],
) -> Result<Vec<BalanceReport>, ChainConnectionError> {
    join_all(addresses.iter().map(|address| check_balance(conn, address)))
        .await
        .into_iter()
        .collect()
}
