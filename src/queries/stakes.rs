use super::{account_value, degrade, netuid_value};
use crate::chain::ChainConnection;
use crate::core::constants::STAKE_INFO_API;
use crate::errors::ChainConnectionError;
use crate::types::StakeEntry;
use crate::utils::balance_newtypes::Alpha;
use crate::utils::decoders::{into_list, Record};

/// Every staked position of a coldkey across hotkeys and subnets.
pub async fn get_stake_info_for_coldkey(
    conn: &ChainConnection,
    coldkey: &str,
) -> Result<Vec<StakeEntry>, ChainConnectionError> {
    let rpc = conn.rpc()?;
    let source = "StakeInfoRuntimeApi.get_stake_info_for_coldkey";
    let key = match account_value(coldkey) {
        Ok(key) => key,
        Err(e) => {
            degrade(source, coldkey, e);
            return Ok(Vec::new());
        }
    };
    match rpc
        .runtime_api(STAKE_INFO_API, "get_stake_info_for_coldkey", vec![key])
        .await
    {
        Ok(value) => Ok(into_list(value)
            .into_iter()
            .filter_map(Record::from_value)
            .map(|record| StakeEntry::from_record(&record))
            .collect()),
        Err(e) => {
            degrade(source, coldkey, e);
            Ok(Vec::new())
        }
    }
}

/// Alpha staked by `coldkey` on `hotkey` in one subnet; zero if none.
pub async fn get_stake_for_hotkey_coldkey_netuid(
    conn: &ChainConnection,
    hotkey: &str,
    coldkey: &str,
    netuid: u16,
) -> Result<Alpha, ChainConnectionError> {
    let rpc = conn.rpc()?;
    let source = "StakeInfoRuntimeApi.get_stake_info_for_hotkey_coldkey_netuid";
    let context = format!("hotkey={hotkey} coldkey={coldkey} netuid={netuid}");
    let params = match (account_value(hotkey), account_value(coldkey)) {
        (Ok(h), Ok(c)) => vec![h, c, netuid_value(netuid)],
        (Err(e), _) | (_, Err(e)) => {
            degrade(source, &context, e);
            return Ok(Alpha::ZERO);
        }
    };
    match rpc
        .runtime_api(
            STAKE_INFO_API,
            "get_stake_info_for_hotkey_coldkey_netuid",
            params,
        )
        .await
    {
        Ok(value) => Ok(Record::from_value(value)
            .map(|record| Alpha(record.u128("stake")))
            .unwrap_or(Alpha::ZERO)),
        Err(e) => {
            degrade(source, &context, e);
            Ok(Alpha::ZERO)
        }
    }
}
