//! Hotkey -> neuron index over every subnet.

use crate::chain::ChainConnection;
use crate::core::constants::NEURON_BATCH_SIZE;
use crate::errors::ChainConnectionError;
use crate::queries::{get_all_subnet_ids, get_neurons_lite};
use crate::types::NeuronRecord;
use futures::future::join_all;
use std::collections::HashMap;
use tracing::{debug, info};

/// Where each hotkey is registered, built once per stats request and shared
/// by every wallet summarized in it.
#[derive(Debug, Clone, Default)]
pub struct RegistrationCache {
    by_hotkey: HashMap<String, Vec<NeuronRecord>>,
}

impl RegistrationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, neuron: NeuronRecord) {
        self.by_hotkey
            .entry(neuron.hotkey.clone())
            .or_default()
            .push(neuron);
    }

    /// Neuron of `hotkey` on `netuid`, if registered there.
    pub fn get(&self, hotkey: &str, netuid: u16) -> Option<&NeuronRecord> {
        self.registrations(hotkey)
            .iter()
            .find(|neuron| neuron.netuid == netuid)
    }

    /// Every registration of `hotkey`, in subnet order.
    pub fn registrations(&self, hotkey: &str) -> &[NeuronRecord] {
        self.by_hotkey
            .get(hotkey)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn hotkey_count(&self) -> usize {
        self.by_hotkey.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hotkey.is_empty()
    }
}

impl Extend<NeuronRecord> for RegistrationCache {
    fn extend<I: IntoIterator<Item = NeuronRecord>>(&mut self, iter: I) {
        for neuron in iter {
            self.insert(neuron);
        }
    }
}

impl FromIterator<NeuronRecord> for RegistrationCache {
    fn from_iter<I: IntoIterator<Item = NeuronRecord>>(iter: I) -> Self {
        let mut cache = Self::new();
        cache.extend(iter);
        cache
    }
}

/// Index the neurons of every subnet on chain.
pub async fn build_global_registration_cache(
    conn: &ChainConnection,
) -> Result<RegistrationCache, ChainConnectionError> {
    let netuids = get_all_subnet_ids(conn).await?;
    build_registration_cache(conn, &netuids).await
}

/// Index the neurons of `netuids`.
///
/// Subnets are fetched [`NEURON_BATCH_SIZE`] at a time and each wave
/// completes before the next starts. A subnet that fails contributes nothing.
pub async fn build_registration_cache(
    conn: &ChainConnection,
    netuids: &[u16],
) -> Result<RegistrationCache, ChainConnectionError> {
    conn.rpc()?;
    let mut cache = RegistrationCache::new();
    for (wave, batch) in netuids.chunks(NEURON_BATCH_SIZE).enumerate() {
        debug!(wave, subnets = batch.len(), "Fetching neuron batch");
        let results = join_all(batch.iter().map(|&netuid| get_neurons_lite(conn, netuid))).await;
        for neurons in results {
            cache.extend(neurons?);
        }
    }
    info!(
        subnets = netuids.len(),
        hotkeys = cache.hotkey_count(),
        "Registration cache built"
    );
    Ok(cache)
}
