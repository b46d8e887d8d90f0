//! Configuration and network settings.
//!
//! A [`Config`] is read from a JSON file, with every field optional, and then
//! patched from `BTM_*` environment variables.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::chain::RetryConfig;
use crate::core::constants::{
    ARCHIVE_ENDPOINT, BINANCE_TAO_PRICE_URL, COINGECKO_TAO_PRICE_URL, DEFAULT_ENDPOINT,
    DEFAULT_NETWORK, FINNEY_ENDPOINT, FINNEY_TEST_ENDPOINT, LOCAL_ENDPOINT, NETWORK_ARCHIVE,
    NETWORK_FINNEY, NETWORK_LOCAL, NETWORK_TEST,
};
use crate::errors::{BtManagerError, BtManagerResult};
use crate::logging::LoggingConfig;

/// Default price feed timeout in seconds
pub const PRICE_FEED_TIMEOUT_SECS: u64 = 5;

/// Default wallet directory
pub const DEFAULT_WALLET_PATH: &str = "~/.bittensor/wallets";

/// Config file read by the command-line tool when `--config` is absent.
pub const DEFAULT_CONFIG_PATH: &str = "~/.bittensor/btmanager.json";

/// Network enum for type-safe network selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Finney,
    Test,
    Archive,
    Local,
    Custom,
}

impl Network {
    /// Well-known endpoint; `None` for [`Network::Custom`].
    pub fn endpoint(&self) -> Option<&'static str> {
        match self {
            Network::Finney => Some(FINNEY_ENDPOINT),
            Network::Test => Some(FINNEY_TEST_ENDPOINT),
            Network::Archive => Some(ARCHIVE_ENDPOINT),
            Network::Local => Some(LOCAL_ENDPOINT),
            Network::Custom => None,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            NETWORK_FINNEY | "mainnet" => Some(Network::Finney),
            NETWORK_TEST | "testnet" => Some(Network::Test),
            NETWORK_ARCHIVE => Some(Network::Archive),
            NETWORK_LOCAL => Some(Network::Local),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Network::Finney => NETWORK_FINNEY,
            Network::Test => NETWORK_TEST,
            Network::Archive => NETWORK_ARCHIVE,
            Network::Local => NETWORK_LOCAL,
            Network::Custom => "custom",
        }
    }

    /// Reverse lookup from a websocket URL.
    pub fn from_endpoint(url: &str) -> Self {
        [
            Network::Finney,
            Network::Test,
            Network::Archive,
            Network::Local,
        ]
        .into_iter()
        .find(|n| n.endpoint() == Some(url))
        .unwrap_or(Network::Custom)
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Determine chain endpoint and network from a network string or URL
///
/// If the input looks like a URL (starts with ws:// or wss://), it's used directly.
/// Otherwise, it's treated as a network name. Unknown names resolve to finney.
pub fn determine_chain_endpoint_and_network(network: &str) -> (String, String) {
    if network.starts_with("ws://") || network.starts_with("wss://") {
        let name = Network::from_endpoint(network).name();
        (network.to_string(), name.to_string())
    } else {
        match Network::parse(network) {
            Some(n) => (
                n.endpoint().unwrap_or(DEFAULT_ENDPOINT).to_string(),
                n.name().to_string(),
            ),
            None => (DEFAULT_ENDPOINT.to_string(), DEFAULT_NETWORK.to_string()),
        }
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from(path));
    }
    match path.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}

/// TAO/USD price sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceFeedConfig {
    pub primary_url: String,
    pub fallback_url: String,
    pub timeout_secs: u64,
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        Self {
            primary_url: BINANCE_TAO_PRICE_URL.to_string(),
            fallback_url: COINGECKO_TAO_PRICE_URL.to_string(),
            timeout_secs: PRICE_FEED_TIMEOUT_SECS,
        }
    }
}

impl PriceFeedConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub base_path: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_WALLET_PATH.to_string(),
        }
    }
}

impl WalletConfig {
    /// `base_path` with `~` expanded
    pub fn path(&self) -> PathBuf {
        expand_home(&self.base_path)
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Network name, or a raw websocket URL
    pub network: String,
    /// Explicit primary endpoint; overrides `network` when set
    pub rpc_endpoint: Option<String>,
    /// Tried in order after the primary
    pub fallback_endpoints: Vec<String>,
    pub retry: RetryConfig,
    pub price_feed: PriceFeedConfig,
    pub wallet: WalletConfig,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: DEFAULT_NETWORK.to_string(),
            rpc_endpoint: None,
            fallback_endpoints: Vec::new(),
            retry: RetryConfig::default(),
            price_feed: PriceFeedConfig::default(),
            wallet: WalletConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> BtManagerResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| {
            BtManagerError::config(format!("{}: {}", path.display(), e))
        })
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> BtManagerResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Patch from `BTM_NETWORK`, `BTM_RPC_ENDPOINT`, `BTM_FALLBACK_ENDPOINTS`
    /// (comma separated) and `BTM_WALLET_PATH`, then the logging variables.
    pub fn apply_env_overrides(mut self) -> Self {
        if let Ok(network) = env::var("BTM_NETWORK") {
            self.network = network;
        }
        if let Ok(endpoint) = env::var("BTM_RPC_ENDPOINT") {
            self.rpc_endpoint = Some(endpoint);
        }
        if let Ok(fallbacks) = env::var("BTM_FALLBACK_ENDPOINTS") {
            self.fallback_endpoints = split_endpoints(&fallbacks);
        }
        if let Ok(path) = env::var("BTM_WALLET_PATH") {
            self.wallet.base_path = path;
        }
        self.logging = self.logging.merge_env();
        self
    }

    pub fn with_network(mut self, network: &str) -> Self {
        self.network = network.to_string();
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.rpc_endpoint = Some(endpoint.to_string());
        self
    }

    pub fn with_fallbacks(mut self, fallbacks: Vec<String>) -> Self {
        self.fallback_endpoints = fallbacks;
        self
    }

    /// The primary endpoint: `rpc_endpoint` if set, otherwise the network's.
    pub fn chain_endpoint(&self) -> String {
        match &self.rpc_endpoint {
            Some(url) => url.clone(),
            None => determine_chain_endpoint_and_network(&self.network).0,
        }
    }

    pub fn network_name(&self) -> String {
        determine_chain_endpoint_and_network(&self.chain_endpoint()).1
    }
}

fn split_endpoints(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::new();
        assert_eq!(config.network, "finney");
        assert_eq!(config.chain_endpoint(), FINNEY_ENDPOINT);
        assert!(config.fallback_endpoints.is_empty());
        assert_eq!(config.price_feed.timeout(), Duration::from_secs(5));
        assert_eq!(config.retry.max_retries, 5);
    }

    #[test]
    fn test_determine_endpoint() {
        assert_eq!(
            determine_chain_endpoint_and_network("test"),
            (FINNEY_TEST_ENDPOINT.to_string(), "test".to_string())
        );
        assert_eq!(
            determine_chain_endpoint_and_network(LOCAL_ENDPOINT),
            (LOCAL_ENDPOINT.to_string(), "local".to_string())
        );
        assert_eq!(
            determine_chain_endpoint_and_network("wss://node.example:443"),
            ("wss://node.example:443".to_string(), "custom".to_string())
        );
        assert_eq!(determine_chain_endpoint_and_network("nowhere").1, "finney");
    }

    #[test]
    fn test_explicit_endpoint_wins() {
        let config = Config::new()
            .with_network("test")
            .with_endpoint("ws://10.0.0.2:9944");
        assert_eq!(config.chain_endpoint(), "ws://10.0.0.2:9944");
        assert_eq!(config.network_name(), "custom");
    }

    #[test]
    fn test_load_partial_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "rpc_endpoint": "wss://primary.example:443",
                "fallback_endpoints": ["wss://a.example:443", "wss://b.example:443"],
                "wallet": {{ "base_path": "/srv/wallets" }},
                "retry": {{ "max_retries": 2 }}
            }}"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.chain_endpoint(), "wss://primary.example:443");
        assert_eq!(config.fallback_endpoints.len(), 2);
        assert_eq!(config.wallet.path(), PathBuf::from("/srv/wallets"));
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.retry.retry_timeout_secs, 30);
        assert_eq!(config.network, "finney");
    }

    #[test]
    fn test_load_invalid_json_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, BtManagerError::Config(_)));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
        assert!(Config::load(dir.path().join("absent.json")).is_err());
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/wallets"), home.join("wallets"));
        }
    }

    #[test]
    fn test_split_endpoints() {
        assert_eq!(
            split_endpoints(" wss://a:443, ,wss://b:443 "),
            vec!["wss://a:443".to_string(), "wss://b:443".to_string()]
        );
    }
}
