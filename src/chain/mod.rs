pub mod client;
pub mod connection;
pub mod extrinsic;
pub mod signer;

use async_trait::async_trait;
use subxt::dynamic::Value;
use subxt::utils::H256;
use thiserror::Error;

pub use client::SubxtRpc;
pub use connection::{ChainConnection, ConnectionState, FailoverRpc, RetryConfig};
pub use extrinsic::{
    compose_and_submit, compose_and_submit_checked, CallDescriptor, ChainEvent,
    DispatchOutcome, ExtrinsicOutcome, ExtrinsicReceipt, SubmissionStatus, SubmissionStep,
    SubmitError, SubmitOptions,
};
pub use signer::{signer_from_seed, KeySigner, PairSigner};

/// Error types for chain operations
#[derive(Debug, Error)]
pub enum Error {
    #[error("Subxt error: {0}")]
    Subxt(#[from] subxt::Error),
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("Decoding error: {0}")]
    Decoding(String),
    #[error("Invalid account: {0}")]
    InvalidAccount(String),
    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl Error {
    /// Whether switching endpoints could plausibly fix this failure.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Subxt(e) => matches!(e, subxt::Error::Rpc(_) | subxt::Error::Io(_)),
            Error::Rpc(_) | Error::Timeout(_) => true,
            Error::Decoding(_) | Error::InvalidAccount(_) => false,
        }
    }
}

/// RPC primitives the manager needs from a node.
///
/// Values cross this boundary as dynamic [`Value`] trees with type context
/// removed; normalization into records happens in the query layer.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Endpoint currently serving requests.
    fn endpoint(&self) -> String;

    /// Read one storage value at the latest block. `Ok(None)` means the key
    /// has no value.
    async fn storage(
        &self,
        module: &str,
        entry: &str,
        keys: Vec<Value>,
    ) -> Result<Option<Value>, Error>;

    /// Iterate a whole storage map, returning decoded keys with their values.
    async fn storage_entries(
        &self,
        module: &str,
        entry: &str,
    ) -> Result<Vec<(Vec<Value>, Value)>, Error>;

    async fn runtime_api(
        &self,
        api: &str,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Value, Error>;

    /// Pallet constant from the runtime metadata.
    async fn constant(&self, pallet: &str, name: &str) -> Result<Value, Error>;

    /// Hash of the current best block.
    async fn chain_head(&self) -> Result<H256, Error>;

    async fn block_number(&self, hash: H256) -> Result<Option<u64>, Error>;

    /// Compose, sign and submit a call, waiting as `options` asks.
    async fn submit_extrinsic(
        &self,
        call: &CallDescriptor,
        signer: &dyn KeySigner,
        options: &SubmitOptions,
    ) -> Result<ExtrinsicReceipt, SubmitError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_transient_classification() {
        assert!(Error::Rpc("socket closed".into()).is_transient());
        assert!(Error::Timeout(Duration::from_secs(1)).is_transient());
        assert!(!Error::Decoding("bad shape".into()).is_transient());
        assert!(!Error::InvalidAccount("x".into()).is_transient());
    }
}
