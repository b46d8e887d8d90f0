//! Single-endpoint RPC backend over subxt's dynamic API.

use crate::chain::extrinsic::{
    CallDescriptor, ChainEvent, ExtrinsicReceipt, SubmissionStep, SubmitError, SubmitOptions,
};
use crate::chain::signer::{KeySigner, SubxtSigner};
use crate::chain::{ChainRpc, Error};
use async_trait::async_trait;
use subxt::blocks::ExtrinsicEvents;
use subxt::config::DefaultExtrinsicParamsBuilder;
use subxt::dynamic::Value;
use subxt::tx::{TxInBlock, TxStatus};
use subxt::utils::H256;
use subxt::{OnlineClient, PolkadotConfig};
use tracing::{debug, warn};

/// A live connection to one node.
pub struct SubxtRpc {
    api: OnlineClient<PolkadotConfig>,
    url: String,
}

impl SubxtRpc {
    /// Connect to `url` and download the runtime metadata.
    pub async fn connect(url: impl Into<String>) -> Result<Self, Error> {
        let url = url.into();
        let api = OnlineClient::<PolkadotConfig>::from_url(&url).await?;
        debug!(endpoint = %url, "Connected to chain endpoint");
        Ok(Self { api, url })
    }

    /// Get the underlying subxt API client
    pub fn api(&self) -> &OnlineClient<PolkadotConfig> {
        &self.api
    }

    async fn finish_in_block(
        &self,
        in_block: TxInBlock<PolkadotConfig, OnlineClient<PolkadotConfig>>,
    ) -> Result<ExtrinsicReceipt, SubmitError> {
        let extrinsic_hash = format!("{:?}", in_block.extrinsic_hash());
        let block_hash = format!("{:?}", in_block.block_hash());
        match in_block.wait_for_success().await {
            Ok(events) => Ok(ExtrinsicReceipt::included(
                extrinsic_hash,
                block_hash,
                collect_events(&events),
            )),
            Err(subxt::Error::Runtime(dispatch_error)) => Ok(ExtrinsicReceipt::failed(
                extrinsic_hash,
                block_hash,
                dispatch_error.to_string(),
            )),
            Err(e) => Err(SubmitError::new(SubmissionStep::AwaitInclusion, e)),
        }
    }
}

fn collect_events(events: &ExtrinsicEvents<PolkadotConfig>) -> Vec<ChainEvent> {
    let mut out = Vec::new();
    for event in events.iter() {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Skipping undecodable event");
                continue;
            }
        };
        let fields = match event.field_values() {
            Ok(subxt::ext::scale_value::Composite::Named(named)) => named
                .into_iter()
                .map(|(name, v)| (Some(name), v.remove_context()))
                .collect(),
            Ok(subxt::ext::scale_value::Composite::Unnamed(vals)) => vals
                .into_iter()
                .map(|v| (None, v.remove_context()))
                .collect(),
            Err(e) => {
                warn!(
                    pallet = event.pallet_name(),
                    variant = event.variant_name(),
                    error = %e,
                    "Event fields could not be decoded"
                );
                Vec::new()
            }
        };
        out.push(ChainEvent {
            pallet: event.pallet_name().to_string(),
            variant: event.variant_name().to_string(),
            fields,
        });
    }
    out
}

#[async_trait]
impl ChainRpc for SubxtRpc {
    fn endpoint(&self) -> String {
        self.url.clone()
    }

    async fn storage(
        &self,
        module: &str,
        entry: &str,
        keys: Vec<Value>,
    ) -> Result<Option<Value>, Error> {
        let storage_query = subxt::dynamic::storage(module, entry, keys);
        let storage = self.api.storage().at_latest().await?;
        match storage.fetch(&storage_query).await? {
            Some(thunk) => thunk
                .to_value()
                .map(|v| Some(v.remove_context()))
                .map_err(|e| Error::Decoding(format!("{module}.{entry}: {e}"))),
            None => Ok(None),
        }
    }

    async fn storage_entries(
        &self,
        module: &str,
        entry: &str,
    ) -> Result<Vec<(Vec<Value>, Value)>, Error> {
        let storage_query = subxt::dynamic::storage(module, entry, Vec::<Value>::new());
        let storage = self.api.storage().at_latest().await?;
        let mut iter = storage.iter(storage_query).await?;
        let mut entries = Vec::new();
        while let Some(kv) = iter.next().await {
            let kv = kv?;
            let value = kv
                .value
                .to_value()
                .map_err(|e| Error::Decoding(format!("{module}.{entry}: {e}")))?
                .remove_context();
            entries.push((kv.keys, value));
        }
        Ok(entries)
    }

    async fn runtime_api(
        &self,
        api: &str,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Value, Error> {
        let api_call = subxt::dynamic::runtime_api_call(api, method, params);
        let result = self
            .api
            .runtime_api()
            .at_latest()
            .await?
            .call(api_call)
            .await?;
        result
            .to_value()
            .map(|v| v.remove_context())
            .map_err(|e| Error::Decoding(format!("{api}.{method}: {e}")))
    }

    async fn constant(&self, pallet: &str, name: &str) -> Result<Value, Error> {
        let address = subxt::dynamic::constant(pallet, name);
        let thunk = self.api.constants().at(&address)?;
        thunk
            .to_value()
            .map(|v| v.remove_context())
            .map_err(|e| Error::Decoding(format!("{pallet}.{name}: {e}")))
    }

    async fn chain_head(&self) -> Result<H256, Error> {
        let block = self.api.blocks().at_latest().await?;
        Ok(block.hash())
    }

    async fn block_number(&self, hash: H256) -> Result<Option<u64>, Error> {
        let header = self
            .api
            .backend()
            .block_header(hash)
            .await
            .map_err(|e| Error::Rpc(format!("Failed to get block header: {e}")))?;
        Ok(header.map(|h| h.number as u64))
    }

    async fn submit_extrinsic(
        &self,
        call: &CallDescriptor,
        signer: &dyn KeySigner,
        options: &SubmitOptions,
    ) -> Result<ExtrinsicReceipt, SubmitError> {
        let tx = subxt::dynamic::tx(
            call.pallet.as_str(),
            call.function.as_str(),
            call.fields(),
        );
        self.api
            .tx()
            .validate(&tx)
            .map_err(|e| SubmitError::new(SubmissionStep::Compose, e))?;

        let mut params = DefaultExtrinsicParamsBuilder::<PolkadotConfig>::new();
        if let Some(nonce) = options.nonce {
            params = params.nonce(nonce);
        }
        if let Some(period) = options.era_period {
            params = params.mortal(period);
        }

        let signer = SubxtSigner(signer);
        let signed = self
            .api
            .tx()
            .create_signed(&tx, &signer, params.build())
            .await
            .map_err(|e| SubmitError::new(SubmissionStep::Sign, e))?;

        let mut progress = signed
            .submit_and_watch()
            .await
            .map_err(|e| SubmitError::new(SubmissionStep::Submit, e))?;

        if options.wait_for_finalization {
            let in_block = progress
                .wait_for_finalized()
                .await
                .map_err(|e| SubmitError::new(SubmissionStep::AwaitInclusion, e))?;
            return self.finish_in_block(in_block).await;
        }
        if !options.wait_for_inclusion {
            return Ok(ExtrinsicReceipt::pending(format!(
                "{:?}",
                progress.extrinsic_hash()
            )));
        }

        let in_block = loop {
            let status = match progress.next().await {
                Some(Ok(status)) => status,
                Some(Err(e)) => {
                    return Err(SubmitError::new(
                        SubmissionStep::AwaitInclusion,
                        format!("Transaction status error: {e}"),
                    ))
                }
                None => {
                    return Err(SubmitError::new(
                        SubmissionStep::AwaitInclusion,
                        "Transaction stream ended unexpectedly",
                    ))
                }
            };
            match status {
                TxStatus::InBestBlock(in_block) | TxStatus::InFinalizedBlock(in_block) => {
                    break in_block
                }
                TxStatus::Error { message } => {
                    return Err(SubmitError::new(
                        SubmissionStep::AwaitInclusion,
                        format!("Transaction error: {message}"),
                    ))
                }
                TxStatus::Invalid { message } => {
                    return Err(SubmitError::new(
                        SubmissionStep::AwaitInclusion,
                        format!("Invalid transaction: {message}"),
                    ))
                }
                TxStatus::Dropped { message } => {
                    return Err(SubmitError::new(
                        SubmissionStep::AwaitInclusion,
                        format!("Transaction dropped: {message}"),
                    ))
                }
                _ => continue,
            }
        };
        self.finish_in_block(in_block).await
    }
}
