use super::{account_value, degrade, netuid_value};
use crate::chain::ChainConnection;
use crate::core::constants::{NEURON_INFO_API, SUBTENSOR_MODULE};
use crate::errors::ChainConnectionError;
use crate::types::NeuronRecord;
use crate::utils::decoders::{decode_u16, into_list, Record};
use futures::future::join_all;
use std::collections::BTreeMap;
use subxt::dynamic::Value;

/// Lite records of every neuron on a subnet.
pub async fn get_neurons_lite(
    conn: &ChainConnection,
    netuid: u16,
) -> Result<Vec<NeuronRecord>, ChainConnectionError> {
    let rpc = conn.rpc()?;
    match rpc
        .runtime_api(NEURON_INFO_API, "get_neurons_lite", vec![netuid_value(netuid)])
        .await
    {
        Ok(value) => Ok(into_list(value)
            .into_iter()
            .filter_map(Record::from_value)
            .map(|record| neuron_on(netuid, &record))
            .collect()),
        Err(e) => {
            degrade(
                "NeuronInfoRuntimeApi.get_neurons_lite",
                &format!("netuid={netuid}"),
                e,
            );
            Ok(Vec::new())
        }
    }
}

pub async fn get_neuron_for_uid(
    conn: &ChainConnection,
    netuid: u16,
    uid: u16,
) -> Result<Option<NeuronRecord>, ChainConnectionError> {
    let rpc = conn.rpc()?;
    let params = vec![netuid_value(netuid), Value::u128(uid as u128)];
    match rpc
        .runtime_api(NEURON_INFO_API, "get_neuron_lite", params)
        .await
    {
        Ok(value) => Ok(Record::from_value(value).map(|record| neuron_on(netuid, &record))),
        Err(e) => {
            degrade(
                "NeuronInfoRuntimeApi.get_neuron_lite",
                &format!("netuid={netuid} uid={uid}"),
                e,
            );
            Ok(None)
        }
    }
}

/// UID of `hotkey` on a subnet from `SubtensorModule.Uids`.
///
/// `None` covers both "not registered" and "could not tell".
pub async fn get_uid_for_hotkey(
    conn: &ChainConnection,
    netuid: u16,
    hotkey: &str,
) -> Result<Option<u16>, ChainConnectionError> {
    let rpc = conn.rpc()?;
    let context = format!("netuid={netuid} hotkey={hotkey}");
    let key = match account_value(hotkey) {
        Ok(key) => key,
        Err(e) => {
            degrade("SubtensorModule.Uids", &context, e);
            return Ok(None);
        }
    };
    match rpc
        .storage(SUBTENSOR_MODULE, "Uids", vec![netuid_value(netuid), key])
        .await
    {
        Ok(value) => Ok(value.as_ref().and_then(decode_u16)),
        Err(e) => {
            degrade("SubtensorModule.Uids", &context, e);
            Ok(None)
        }
    }
}

/// `(netuid, uid)` pairs for each hotkey over `netuids`, looked up
/// concurrently. Every hotkey gets an entry, possibly empty.
pub async fn get_registered_subnets_for_hotkeys(
    conn: &ChainConnection,
    hotkeys: &[String],
    netuids: &[u16],
) -> Result<BTreeMap<String, Vec<(u16, u16)>>, ChainConnectionError> {
    conn.rpc()?;
    let lookups = hotkeys.iter().flat_map(move |hotkey| {
        netuids.iter().map(move |&netuid| async move {
            let uid = get_uid_for_hotkey(conn, netuid, hotkey).await;
            (hotkey, netuid, uid)
        })
    });

    let mut registered: BTreeMap<String, Vec<(u16, u16)>> = hotkeys
        .iter()
        .map(|hotkey| (hotkey.clone(), Vec::new()))
        .collect();
    for (hotkey, netuid, uid) in join_all(lookups).await {
        if let Some(uid) = uid? {
            registered
                .entry(hotkey.clone())
                .or_default()
                .push((netuid, uid));
        }
    }
    Ok(registered)
}

/// Some runtimes leave `netuid` out of lite records; the subnet queried is
/// authoritative.
fn neuron_on(netuid: u16, record: &Record) -> NeuronRecord {
    NeuronRecord {
        netuid,
        ..NeuronRecord::from_record(record)
    }
}
