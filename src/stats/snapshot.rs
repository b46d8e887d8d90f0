//! Valued wallet snapshots.

use super::price::PriceSource;
use super::registration_cache::{build_global_registration_cache, RegistrationCache};
use crate::chain::ChainConnection;
use crate::core::constants::ROOT_NETUID;
use crate::errors::ChainConnectionError;
use crate::queries::{get_all_dynamic_info, get_balance, get_stake_info_for_coldkey};
use crate::types::{NeuronRecord, StakeEntry, SubnetDynamicInfo};
use crate::utils::balance_newtypes::Rao;
use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// One subnet position of a wallet, valued in TAO.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubnetStakeRow {
    pub netuid: u16,
    pub subnet_name: String,
    pub hotkey: String,
    pub uid: Option<u16>,
    /// Stake in whole alpha
    pub alpha_stake: f64,
    pub tao_value: f64,
    pub moving_price: f64,
    /// TAO emitted to this position per block
    pub emission_per_block: f64,
    /// Incentive as a fraction of 1
    pub incentive: f64,
    pub is_registered: bool,
}

/// Everything known about one coldkey at the time of the call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletSnapshot {
    pub address: String,
    pub free_balance: Rao,
    /// Sorted by TAO value, largest first
    pub subnets: Vec<SubnetStakeRow>,
    pub total_staked_tao: f64,
    pub total_emission_per_block: f64,
    /// Free balance plus staked value
    pub total_value_tao: f64,
    pub tao_price_usd: Option<f64>,
    pub total_value_usd: Option<f64>,
}

impl WalletSnapshot {
    pub fn free_balance_tao(&self) -> f64 {
        self.free_balance.as_tao()
    }
}

/// A price fetched once and replayed, so many snapshots share one quote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnownPrice(pub Option<f64>);

#[async_trait]
impl PriceSource for KnownPrice {
    async fn tao_usd(&self) -> Option<f64> {
        self.0
    }
}

/// Per-netuid lookups derived from the dynamic info list.
#[derive(Debug, Default)]
struct SubnetLookup {
    price: HashMap<u16, f64>,
    tempo: HashMap<u16, u64>,
    name: HashMap<u16, String>,
}

impl SubnetLookup {
    fn new(infos: &[SubnetDynamicInfo]) -> Self {
        let mut lookup = Self::default();
        for info in infos {
            lookup.price.insert(info.netuid, info.moving_price);
            lookup.tempo.insert(info.netuid, info.tempo);
            lookup.name.insert(info.netuid, info.display_name());
        }
        lookup
    }

    fn price(&self, netuid: u16) -> f64 {
        self.price.get(&netuid).copied().unwrap_or(0.0)
    }

    /// TAO per alpha used for valuation; root stake is TAO itself.
    fn tao_rate(&self, netuid: u16) -> f64 {
        if netuid == ROOT_NETUID {
            1.0
        } else {
            self.price(netuid)
        }
    }

    fn tempo(&self, netuid: u16) -> u64 {
        self.tempo.get(&netuid).copied().unwrap_or(0)
    }

    fn name(&self, netuid: u16) -> String {
        self.name
            .get(&netuid)
            .cloned()
            .unwrap_or_else(|| format!("SN{netuid}"))
    }

    /// Per-tempo TAO amount spread over the subnet's tempo.
    fn per_block(&self, netuid: u16, tao_per_tempo: f64) -> f64 {
        match self.tempo(netuid) {
            0 => 0.0,
            tempo => tao_per_tempo / tempo as f64,
        }
    }
}

fn matched_row(
    lookup: &SubnetLookup,
    hotkey: &str,
    netuid: u16,
    stake: Option<&StakeEntry>,
    neuron: &NeuronRecord,
) -> SubnetStakeRow {
    let rate = lookup.tao_rate(netuid);
    SubnetStakeRow {
        netuid,
        subnet_name: lookup.name(netuid),
        hotkey: hotkey.to_string(),
        uid: Some(neuron.uid),
        alpha_stake: stake.map_or(0.0, |s| s.stake.as_alpha()),
        tao_value: stake.map_or(0.0, |s| s.stake.value_in_tao(netuid, lookup.price(netuid))),
        moving_price: lookup.price(netuid),
        emission_per_block: lookup.per_block(netuid, neuron.emission.as_alpha() * rate),
        incentive: neuron.incentive_fraction(),
        is_registered: true,
    }
}

fn unmatched_row(lookup: &SubnetLookup, entry: &StakeEntry) -> SubnetStakeRow {
    let netuid = entry.netuid;
    let emission_tao = if entry.tao_emission.is_zero() {
        entry.emission.as_alpha() * lookup.tao_rate(netuid)
    } else {
        entry.tao_emission.as_tao()
    };
    SubnetStakeRow {
        netuid,
        subnet_name: lookup.name(netuid),
        hotkey: entry.hotkey.clone(),
        uid: None,
        alpha_stake: entry.stake.as_alpha(),
        tao_value: entry.stake.value_in_tao(netuid, lookup.price(netuid)),
        moving_price: lookup.price(netuid),
        emission_per_block: lookup.per_block(netuid, emission_tao),
        incentive: 0.0,
        is_registered: entry.is_registered,
    }
}

/// Snapshot of one coldkey.
///
/// Balance, stakes, subnet info and (with a `price` source) the USD quote
/// are fetched concurrently; any of them failing leaves its part at zero or
/// unknown. Stake rows are joined with `cache` on (hotkey, netuid) to pick
/// up UID, incentive and emission. Registrations of `known_hotkeys` that
/// hold no stake still get a zero-stake row.
pub async fn get_wallet_snapshot(
    conn: &ChainConnection,
    address: &str,
    price: Option<&dyn PriceSource>,
    known_hotkeys: &[String],
    cache: Option<&RegistrationCache>,
) -> Result<WalletSnapshot, ChainConnectionError> {
    conn.rpc()?;
    let (balance, stakes, infos, tao_price) = tokio::join!(
        get_balance(conn, address),
        get_stake_info_for_coldkey(conn, address),
        get_all_dynamic_info(conn),
        async {
            match price {
                Some(source) => source.tao_usd().await,
                None => None,
            }
        },
    );
    let (free_balance, stakes, infos) = (balance?, stakes?, infos?);
    debug!(
        address,
        stakes = stakes.len(),
        subnets = infos.len(),
        "Snapshot inputs fetched"
    );

    let lookup = SubnetLookup::new(&infos);
    let mut rows = Vec::new();
    let mut total_staked_tao = 0.0;
    let mut total_emission_per_block = 0.0;
    let mut seen: HashSet<(String, u16)> = HashSet::new();

    for entry in &stakes {
        seen.insert((entry.hotkey.clone(), entry.netuid));
        let row = match cache.and_then(|c| c.get(&entry.hotkey, entry.netuid)) {
            Some(neuron) => matched_row(&lookup, &entry.hotkey, entry.netuid, Some(entry), neuron),
            None => unmatched_row(&lookup, entry),
        };
        total_staked_tao += row.tao_value;
        total_emission_per_block += row.emission_per_block;
        if !entry.stake.is_zero() || row.is_registered {
            rows.push(row);
        }
    }

    if let Some(cache) = cache {
        for hotkey in known_hotkeys {
            for neuron in cache.registrations(hotkey) {
                if seen.insert((hotkey.clone(), neuron.netuid)) {
                    let row = matched_row(&lookup, hotkey, neuron.netuid, None, neuron);
                    total_emission_per_block += row.emission_per_block;
                    rows.push(row);
                }
            }
        }
    }

    rows.sort_by(|a, b| b.tao_value.total_cmp(&a.tao_value));

    let total_value_tao = free_balance.as_tao() + total_staked_tao;
    Ok(WalletSnapshot {
        address: address.to_string(),
        free_balance,
        subnets: rows,
        total_staked_tao,
        total_emission_per_block,
        total_value_tao,
        tao_price_usd: tao_price,
        total_value_usd: tao_price.map(|p| total_value_tao * p),
    })
}

/// Snapshots of many coldkeys sharing one registration cache and one price.
///
/// `known_hotkeys` maps a coldkey address to the hotkeys it owns.
pub async fn summarize_wallets(
    conn: &ChainConnection,
    addresses: &[String],
    price: Option<&dyn PriceSource>,
    known_hotkeys: &HashMap<String, Vec<String>>,
) -> Result<Vec<WalletSnapshot>, ChainConnectionError> {
    let (cache, quote) = tokio::join!(build_global_registration_cache(conn), async {
        match price {
            Some(source) => Some(KnownPrice(source.tao_usd().await)),
            None => None,
        }
    });
    let cache = cache?;
    info!(wallets = addresses.len(), "Summarizing wallets");

    let snapshots = addresses.iter().map(|address| {
        let hotkeys = known_hotkeys
            .get(address)
            .map(Vec::as_slice)
            .unwrap_or_default();
        get_wallet_snapshot(
            conn,
            address,
            quote.as_ref().map(|q| q as &dyn PriceSource),
            hotkeys,
            Some(&cache),
        )
    });
    join_all(snapshots).await.into_iter().collect()
}
