use crate::chain::ChainConnection;
use crate::errors::ChainConnectionError;
use crate::queries::{get_burn_cost, get_subnet_dynamic_info, get_subnet_hyperparams, get_subnet_info};
use crate::utils::balance_newtypes::{Alpha, Rao};
use serde::Serialize;

/// Market and registration view of one subnet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubnetOverview {
    pub netuid: u16,
    pub name: String,
    pub symbol: String,
    pub tempo: u64,
    pub tao_in: Rao,
    pub alpha_out: Alpha,
    pub moving_price: f64,
    pub burn_cost: Rao,
    pub registration_allowed: Option<bool>,
    pub min_burn: Option<Rao>,
    pub max_burn: Option<Rao>,
    pub neurons: Option<u16>,
    pub max_neurons: Option<u16>,
}

/// Dynamic info of a subnet joined with its burn cost, hyperparameters and
/// neuron counts. `None` when the subnet has no dynamic info.
pub async fn get_subnet_overview(
    conn: &ChainConnection,
    netuid: u16,
) -> Result<Option<SubnetOverview>, ChainConnectionError> {
    let (info, burn, params, summary) = tokio::join!(
        get_subnet_dynamic_info(conn, netuid),
        get_burn_cost(conn, netuid),
        get_subnet_hyperparams(conn, netuid),
        get_subnet_info(conn, netuid),
    );
    let Some(info) = info? else {
        return Ok(None);
    };
    let (burn_cost, params, summary) = (burn?, params?, summary?);

    Ok(Some(SubnetOverview {
        netuid,
        name: info.display_name(),
        symbol: info.display_symbol().to_string(),
        tempo: info.tempo,
        tao_in: info.tao_in,
        alpha_out: info.alpha_out,
        moving_price: info.moving_price,
        burn_cost,
        registration_allowed: params.as_ref().map(|p| p.registration_allowed),
        min_burn: params.as_ref().map(|p| p.min_burn),
        max_burn: params.as_ref().map(|p| p.max_burn),
        neurons: summary.map(|s| s.subnetwork_n),
        max_neurons: summary.map(|s| s.max_allowed_uids),
    }))
}
