//! Chain session lifecycle and endpoint failover.
//!
//! [`ChainConnection`] is the one handle every query and submission goes
//! through. Its states are `Disconnected -> Connecting -> Connected -> Closed`.
//! With fallback endpoints it builds a [`FailoverRpc`], which tries the
//! primary, then each fallback in order, with a bounded attempt count and a
//! per-request timeout. Without fallbacks it holds a plain [`SubxtRpc`].

use async_trait::async_trait;
use backoff::{backoff::Backoff, ExponentialBackoff, ExponentialBackoffBuilder};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use subxt::dynamic::Value;
use subxt::utils::H256;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::chain::client::SubxtRpc;
use crate::chain::extrinsic::{CallDescriptor, ExtrinsicReceipt, SubmitError, SubmitOptions};
use crate::chain::{ChainRpc, Error as ChainError, KeySigner};
use crate::errors::ChainConnectionError;

/// Maximum number of attempts for one RPC operation
pub const MAX_RETRIES: u32 = 5;

/// Per-attempt timeout, also applied to connecting
pub const RETRY_TIMEOUT: Duration = Duration::from_secs(30);

/// Initial retry delay in milliseconds
pub const INITIAL_RETRY_DELAY_MS: u64 = 500;

/// Maximum retry delay in milliseconds
pub const MAX_RETRY_DELAY_MS: u64 = 10_000;

/// Retry configuration for RPC operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub retry_timeout_secs: u64,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            retry_timeout_secs: RETRY_TIMEOUT.as_secs(),
            initial_delay_ms: INITIAL_RETRY_DELAY_MS,
            max_delay_ms: MAX_RETRY_DELAY_MS,
        }
    }
}

impl RetryConfig {
    pub fn retry_timeout(&self) -> Duration {
        Duration::from_secs(self.retry_timeout_secs)
    }

    /// At least one attempt, whatever the config says.
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Delay schedule between attempts
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(self.initial_delay_ms))
            .with_max_interval(Duration::from_millis(self.max_delay_ms))
            .with_max_elapsed_time(None)
            .build()
    }
}

/// Opens an RPC backend for a URL.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<Arc<dyn ChainRpc>, ChainError>;
}

/// Connects over websocket with subxt.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubxtConnector;

#[async_trait]
impl Connector for SubxtConnector {
    async fn connect(&self, url: &str) -> Result<Arc<dyn ChainRpc>, ChainError> {
        let rpc = SubxtRpc::connect(url).await?;
        Ok(Arc::new(rpc))
    }
}

async fn connect_with_timeout(
    connector: &dyn Connector,
    url: &str,
    timeout: Duration,
) -> Result<Arc<dyn ChainRpc>, ChainError> {
    match tokio::time::timeout(timeout, connector.connect(url)).await {
        Ok(result) => result,
        Err(_) => Err(ChainError::Timeout(timeout)),
    }
}

struct ActiveEndpoint {
    index: usize,
    rpc: Arc<dyn ChainRpc>,
}

/// RPC backend over an ordered endpoint list.
///
/// Reads that fail with a transient error move on to the next endpoint and
/// try again, up to `max_retries` attempts in total. Submissions are passed
/// to the active endpoint once and never retried.
pub struct FailoverRpc {
    endpoints: Vec<String>,
    connector: Arc<dyn Connector>,
    retry: RetryConfig,
    active: RwLock<ActiveEndpoint>,
}

impl FailoverRpc {
    /// Connect to the first reachable endpoint, primary first.
    pub async fn connect(
        endpoints: Vec<String>,
        connector: Arc<dyn Connector>,
        retry: RetryConfig,
    ) -> Result<Self, ChainError> {
        if endpoints.is_empty() {
            return Err(ChainError::Rpc("No endpoints configured".to_string()));
        }

        let attempts = retry.attempts().max(endpoints.len() as u32);
        let mut backoff = retry.backoff();
        let mut last_error = None;

        for attempt in 0..attempts {
            let index = attempt as usize % endpoints.len();
            let url = &endpoints[index];
            match connect_with_timeout(connector.as_ref(), url, retry.retry_timeout()).await {
                Ok(rpc) => {
                    info!(endpoint = %url, attempt = attempt + 1, "Connected");
                    return Ok(Self {
                        active: RwLock::new(ActiveEndpoint { index, rpc }),
                        endpoints,
                        connector,
                        retry,
                    });
                }
                Err(e) => {
                    warn!(endpoint = %url, attempt = attempt + 1, error = %e, "Endpoint unreachable");
                    last_error = Some(e);
                    if attempt + 1 < attempts {
                        if let Some(delay) = backoff.next_backoff() {
                            tokio::time::sleep(delay).await;
                        }
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ChainError::Rpc("No endpoint reachable".to_string())))
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    async fn current(&self) -> (usize, Arc<dyn ChainRpc>) {
        let active = self.active.read().await;
        (active.index, Arc::clone(&active.rpc))
    }

    /// Move past the endpoint at `failed_index`, unless another task already
    /// did. Keeps the current endpoint if nothing else answers.
    async fn rotate(&self, failed_index: usize) {
        let mut active = self.active.write().await;
        if active.index != failed_index || self.endpoints.len() < 2 {
            return;
        }
        for step in 1..self.endpoints.len() {
            let index = (failed_index + step) % self.endpoints.len();
            let url = &self.endpoints[index];
            match connect_with_timeout(self.connector.as_ref(), url, self.retry.retry_timeout())
                .await
            {
                Ok(rpc) => {
                    info!(endpoint = %url, "Switched to fallback endpoint");
                    *active = ActiveEndpoint { index, rpc };
                    return;
                }
                Err(e) => warn!(endpoint = %url, error = %e, "Fallback endpoint unreachable"),
            }
        }
    }

    async fn with_failover<T, F, Fut>(&self, what: &str, op: F) -> Result<T, ChainError>
    where
        F: Fn(Arc<dyn ChainRpc>) -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, ChainError>> + Send,
        T: Send,
    {
        let attempts = self.retry.attempts();
        let timeout = self.retry.retry_timeout();
        let mut backoff = self.retry.backoff();
        let mut attempt = 1;
        loop {
            let (index, rpc) = self.current().await;
            let result = match tokio::time::timeout(timeout, op(rpc)).await {
                Ok(result) => result,
                Err(_) => Err(ChainError::Timeout(timeout)),
            };
            match result {
                Err(e) if e.is_transient() && attempt < attempts => {
                    warn!(
                        operation = what,
                        endpoint = %self.endpoints[index],
                        attempt,
                        error = %e,
                        "RPC failed, retrying"
                    );
                    if let Some(delay) = backoff.next_backoff() {
                        tokio::time::sleep(delay).await;
                    }
                    self.rotate(index).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

#[async_trait]
impl ChainRpc for FailoverRpc {
    fn endpoint(&self) -> String {
        match self.active.try_read() {
            Ok(active) => self.endpoints[active.index].clone(),
            Err(_) => self.endpoints[0].clone(),
        }
    }

    async fn storage(
        &self,
        module: &str,
        entry: &str,
        keys: Vec<Value>,
    ) -> Result<Option<Value>, ChainError> {
        self.with_failover(entry, |rpc| {
            let keys = keys.clone();
            async move { rpc.storage(module, entry, keys).await }
        })
        .await
    }

    async fn storage_entries(
        &self,
        module: &str,
        entry: &str,
    ) -> Result<Vec<(Vec<Value>, Value)>, ChainError> {
        self.with_failover(entry, |rpc| async move {
            rpc.storage_entries(module, entry).await
        })
        .await
    }

    async fn runtime_api(
        &self,
        api: &str,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Value, ChainError> {
        self.with_failover(method, |rpc| {
            let params = params.clone();
            async move { rpc.runtime_api(api, method, params).await }
        })
        .await
    }

    async fn constant(&self, pallet: &str, name: &str) -> Result<Value, ChainError> {
        self.with_failover(name, |rpc| async move { rpc.constant(pallet, name).await })
            .await
    }

    async fn chain_head(&self) -> Result<H256, ChainError> {
        self.with_failover("chain_head", |rpc| async move { rpc.chain_head().await })
            .await
    }

    async fn block_number(&self, hash: H256) -> Result<Option<u64>, ChainError> {
        self.with_failover("block_number", |rpc| async move {
            rpc.block_number(hash).await
        })
        .await
    }

    async fn submit_extrinsic(
        &self,
        call: &CallDescriptor,
        signer: &dyn KeySigner,
        options: &SubmitOptions,
    ) -> Result<ExtrinsicReceipt, SubmitError> {
        let (_, rpc) = self.current().await;
        rpc.submit_extrinsic(call, signer, options).await
    }
}

/// Lifecycle of a [`ChainConnection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Closed,
}

/// The caller-owned chain session.
pub struct ChainConnection {
    state: ConnectionState,
    rpc: Option<Arc<dyn ChainRpc>>,
    retry: RetryConfig,
}

impl Default for ChainConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainConnection {
    pub fn new() -> Self {
        Self::with_retry(RetryConfig::default())
    }

    pub fn with_retry(retry: RetryConfig) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            rpc: None,
            retry,
        }
    }

    /// Wrap an already open backend.
    pub fn from_rpc(rpc: Arc<dyn ChainRpc>) -> Self {
        let mut conn = Self::new();
        conn.connect_with(rpc);
        conn
    }

    /// Connect with subxt to `primary`, falling back to `fallbacks` in order.
    pub async fn connect(
        &mut self,
        primary: &str,
        fallbacks: &[String],
    ) -> Result<(), ChainConnectionError> {
        self.connect_using(Arc::new(SubxtConnector), primary, fallbacks)
            .await
    }

    /// Same as [`connect`](Self::connect) with a custom transport.
    pub async fn connect_using(
        &mut self,
        connector: Arc<dyn Connector>,
        primary: &str,
        fallbacks: &[String],
    ) -> Result<(), ChainConnectionError> {
        self.rpc = None;
        self.state = ConnectionState::Connecting;

        let result = if fallbacks.is_empty() {
            debug!(endpoint = primary, "Connecting to single endpoint");
            connect_with_timeout(connector.as_ref(), primary, self.retry.retry_timeout()).await
        } else {
            let mut endpoints = Vec::with_capacity(fallbacks.len() + 1);
            endpoints.push(primary.to_string());
            endpoints.extend(fallbacks.iter().filter(|u| *u != primary).cloned());
            debug!(?endpoints, "Connecting with fallbacks");
            FailoverRpc::connect(endpoints, connector, self.retry.clone())
                .await
                .map(|rpc| Arc::new(rpc) as Arc<dyn ChainRpc>)
        };

        match result {
            Ok(rpc) => {
                self.connect_with(rpc);
                Ok(())
            }
            Err(e) => {
                self.state = ConnectionState::Disconnected;
                Err(ChainConnectionError::with_url(e.to_string(), primary))
            }
        }
    }

    /// Use an already open backend as the live session.
    pub fn connect_with(&mut self, rpc: Arc<dyn ChainRpc>) {
        info!(endpoint = %rpc.endpoint(), "Chain connection ready");
        self.rpc = Some(rpc);
        self.state = ConnectionState::Connected;
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// The live backend, or the fixed not-connected error.
    pub fn rpc(&self) -> Result<&dyn ChainRpc, ChainConnectionError> {
        match (&self.state, &self.rpc) {
            (ConnectionState::Connected, Some(rpc)) => Ok(rpc.as_ref()),
            _ => Err(ChainConnectionError::not_connected()),
        }
    }

    /// Endpoint serving requests right now.
    pub fn endpoint(&self) -> Option<String> {
        self.rpc.as_ref().map(|rpc| rpc.endpoint())
    }

    /// Drop the session. Safe to call repeatedly or before any connect.
    pub fn close(&mut self) {
        if self.rpc.take().is_some() {
            info!("Chain connection closed");
        }
        self.state = ConnectionState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_config_defaults() {
        let cfg = RetryConfig::default();
        assert_eq!(cfg.max_retries, 5);
        assert_eq!(cfg.retry_timeout(), Duration::from_secs(30));
        assert_eq!(RetryConfig { max_retries: 0, ..cfg }.attempts(), 1);
    }

    #[test]
    fn test_backoff_is_bounded_by_max_delay() {
        let cfg = RetryConfig {
            initial_delay_ms: 10,
            max_delay_ms: 40,
            ..RetryConfig::default()
        };
        let mut backoff = cfg.backoff();
        for _ in 0..10 {
            let delay = backoff.next_backoff().unwrap();
            // randomization may push a single step up to 1.5x the cap
            assert!(delay <= Duration::from_millis(60));
        }
    }

    #[test]
    fn test_fresh_connection_is_not_connected() {
        let conn = ChainConnection::new();
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert!(matches!(conn.rpc(), Err(e) if e.is_not_connected()));
        assert!(conn.endpoint().is_none());
    }

    #[test]
    fn test_close_is_idempotent_without_connect() {
        let mut conn = ChainConnection::new();
        conn.close();
        conn.close();
        assert_eq!(conn.state(), ConnectionState::Closed);
        assert!(conn.rpc().is_err());
    }
}
