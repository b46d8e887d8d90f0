//! TAO/USD price lookup.
//!
//! The price is optional everywhere it is used: when no source answers,
//! USD figures are reported as unknown rather than zero.

use crate::config::PriceFeedConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from a single price provider
#[derive(Debug, Error)]
pub enum PriceFeedError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("No usable price in response")]
    Missing,
}

/// Anything that can quote TAO in USD.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Current price, `None` when unknown.
    async fn tao_usd(&self) -> Option<f64>;
}

/// Binance first, CoinGecko second, each bounded by the configured timeout.
pub struct HttpPriceFeed {
    client: Client,
    config: PriceFeedConfig,
}

impl HttpPriceFeed {
    /// Fails only when the HTTP client cannot be built, e.g. TLS setup.
    pub fn new(config: PriceFeedConfig) -> Result<Self, PriceFeedError> {
        let client = Client::builder()
            .connect_timeout(config.timeout())
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client, config })
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout()
    }

    async fn fetch(&self, url: &str) -> Result<JsonValue, PriceFeedError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(PriceFeedError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    async fn binance(&self) -> Result<f64, PriceFeedError> {
        let body = self.fetch(&self.config.primary_url).await?;
        parse_binance_price(&body).ok_or(PriceFeedError::Missing)
    }

    async fn coingecko(&self) -> Result<f64, PriceFeedError> {
        let body = self.fetch(&self.config.fallback_url).await?;
        parse_coingecko_price(&body).ok_or(PriceFeedError::Missing)
    }
}

impl Default for HttpPriceFeed {
    fn default() -> Self {
        Self::new(PriceFeedConfig::default())
    }
}

#[async_trait]
impl PriceSource for HttpPriceFeed {
    async fn tao_usd(&self) -> Option<f64> {
        match self.binance().await {
            Ok(price) => {
                debug!(price, "TAO price from Binance");
                return Some(price);
            }
            Err(e) => warn!(error = %e, "Binance price failed"),
        }
        match self.coingecko().await {
            Ok(price) => {
                debug!(price, "TAO price from CoinGecko");
                Some(price)
            }
            Err(e) => {
                warn!(error = %e, "CoinGecko price failed");
                None
            }
        }
    }
}

/// `{"symbol":"TAOUSDT","price":"412.50000000"}`
pub fn parse_binance_price(body: &JsonValue) -> Option<f64> {
    let price = match body.get("price")? {
        JsonValue::String(s) => s.parse().ok()?,
        JsonValue::Number(n) => n.as_f64()?,
        _ => return None,
    };
    positive(price)
}

/// `{"bittensor":{"usd":412.5}}`
pub fn parse_coingecko_price(body: &JsonValue) -> Option<f64> {
    body.get("bittensor")?
        .get("usd")?
        .as_f64()
        .and_then(positive)
}

fn positive(price: f64) -> Option<f64> {
    (price.is_finite() && price > 0.0).then_some(price)
}
