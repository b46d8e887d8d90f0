use super::{degrade, netuid_value};
use crate::chain::ChainConnection;
use crate::core::constants::{SUBNET_INFO_API, SUBTENSOR_MODULE};
use crate::errors::ChainConnectionError;
use crate::types::{SubnetDynamicInfo, SubnetHyperparams, SubnetInfoSummary};
use crate::utils::balance_newtypes::Rao;
use crate::utils::decoders::{decode_bool, decode_u128, decode_u16, into_list, Record};
use subxt::dynamic::Value;
use tracing::debug;

/// Current burn registration cost of a subnet.
///
/// Reads `SubtensorModule.Burn` directly. If that read fails the cost is
/// taken from `get_subnet_info_v2`; if both fail it is zero.
pub async fn get_burn_cost(
    conn: &ChainConnection,
    netuid: u16,
) -> Result<Rao, ChainConnectionError> {
    let rpc = conn.rpc()?;
    let context = format!("netuid={netuid}");
    match rpc
        .storage(SUBTENSOR_MODULE, "Burn", vec![netuid_value(netuid)])
        .await
    {
        Ok(None) => return Ok(Rao::ZERO),
        Ok(Some(value)) => match decode_u128(&value) {
            Some(burn) => return Ok(Rao(burn)),
            None => degrade("SubtensorModule.Burn", &context, "value is not an integer"),
        },
        Err(e) => degrade("SubtensorModule.Burn", &context, e),
    }

    debug!(netuid, "Falling back to subnet_info_v2 for burn cost");
    Ok(get_subnet_info(conn, netuid)
        .await?
        .map(|info| info.burn)
        .unwrap_or(Rao::ZERO))
}

/// Neuron counts and burn from `SubnetInfoRuntimeApi.get_subnet_info_v2`.
pub async fn get_subnet_info(
    conn: &ChainConnection,
    netuid: u16,
) -> Result<Option<SubnetInfoSummary>, ChainConnectionError> {
    Ok(subnet_runtime_record(conn, "get_subnet_info_v2", netuid, vec![])
        .await?
        .map(|record| SubnetInfoSummary::from_record(&record)))
}

pub async fn get_subnet_dynamic_info(
    conn: &ChainConnection,
    netuid: u16,
) -> Result<Option<SubnetDynamicInfo>, ChainConnectionError> {
    Ok(subnet_runtime_record(conn, "get_dynamic_info", netuid, vec![])
        .await?
        .map(|record| SubnetDynamicInfo::from_record(&record)))
}

/// Dynamic info of every subnet. Entries that don't decode are skipped.
pub async fn get_all_dynamic_info(
    conn: &ChainConnection,
) -> Result<Vec<SubnetDynamicInfo>, ChainConnectionError> {
    let rpc = conn.rpc()?;
    match rpc
        .runtime_api(SUBNET_INFO_API, "get_all_dynamic_info", vec![])
        .await
    {
        Ok(value) => Ok(into_list(value)
            .into_iter()
            .filter_map(Record::from_value)
            .map(|record| SubnetDynamicInfo::from_record(&record))
            .collect()),
        Err(e) => {
            degrade("SubnetInfoRuntimeApi.get_all_dynamic_info", "all subnets", e);
            Ok(Vec::new())
        }
    }
}

pub async fn get_subnet_hyperparams(
    conn: &ChainConnection,
    netuid: u16,
) -> Result<Option<SubnetHyperparams>, ChainConnectionError> {
    Ok(
        subnet_runtime_record(conn, "get_subnet_hyperparams", netuid, vec![])
            .await?
            .map(SubnetHyperparams::from_record),
    )
}

/// Full metagraph of a subnet as a field map.
pub async fn get_metagraph(
    conn: &ChainConnection,
    netuid: u16,
) -> Result<Option<Record>, ChainConnectionError> {
    subnet_runtime_record(conn, "get_metagraph", netuid, vec![]).await
}

/// Only the metagraph fields at `field_indices`, e.g. 52 for hotkeys or 62
/// for incentives. Fields not requested come back empty.
pub async fn get_selective_metagraph(
    conn: &ChainConnection,
    netuid: u16,
    field_indices: &[u16],
) -> Result<Option<Record>, ChainConnectionError> {
    let indices = Value::unnamed_composite(
        field_indices
            .iter()
            .map(|i| Value::u128(*i as u128))
            .collect::<Vec<_>>(),
    );
    subnet_runtime_record(conn, "get_selective_metagraph", netuid, vec![indices]).await
}

/// Netuids flagged true in `SubtensorModule.NetworksAdded`, ascending.
pub async fn get_all_subnet_ids(
    conn: &ChainConnection,
) -> Result<Vec<u16>, ChainConnectionError> {
    let rpc = conn.rpc()?;
    match rpc.storage_entries(SUBTENSOR_MODULE, "NetworksAdded").await {
        Ok(entries) => {
            let mut netuids: Vec<u16> = entries
                .into_iter()
                .filter(|(_, added)| decode_bool(added).unwrap_or(false))
                .filter_map(|(keys, _)| keys.first().and_then(decode_u16))
                .collect();
            netuids.sort_unstable();
            netuids.dedup();
            Ok(netuids)
        }
        Err(e) => {
            degrade("SubtensorModule.NetworksAdded", "all subnets", e);
            Ok(Vec::new())
        }
    }
}

pub async fn is_subnet_added(
    conn: &ChainConnection,
    netuid: u16,
) -> Result<bool, ChainConnectionError> {
    let rpc = conn.rpc()?;
    match rpc
        .storage(SUBTENSOR_MODULE, "NetworksAdded", vec![netuid_value(netuid)])
        .await
    {
        Ok(value) => Ok(value.as_ref().and_then(decode_bool).unwrap_or(false)),
        Err(e) => {
            degrade("SubtensorModule.NetworksAdded", &format!("netuid={netuid}"), e);
            Ok(false)
        }
    }
}

/// Call a `SubnetInfoRuntimeApi` method taking `netuid` first and normalize
/// the answer to a record. `None` when absent, malformed or failed.
async fn subnet_runtime_record(
    conn: &ChainConnection,
    method: &str,
    netuid: u16,
    extra: Vec<Value>,
) -> Result<Option<Record>, ChainConnectionError> {
    let rpc = conn.rpc()?;
    let mut params = vec![netuid_value(netuid)];
    params.extend(extra);
    match rpc.runtime_api(SUBNET_INFO_API, method, params).await {
        Ok(value) => Ok(Record::from_value(value)),
        Err(e) => {
            degrade(
                &format!("{SUBNET_INFO_API}.{method}"),
                &format!("netuid={netuid}"),
                e,
            );
            Ok(None)
        }
    }
}
