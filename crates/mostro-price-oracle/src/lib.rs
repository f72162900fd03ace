//! The fiat price-oracle port (§6 "Price oracle") plus a `reqwest`-backed
//! default implementation. A null or failed response must never block
//! trading — callers treat `Err` as "fall back to a conservative
//! estimate", never as a hard failure.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("price request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("price API returned no quote for currency {0}")]
    MissingCurrency(String),
}

/// Queries the current BTC price in a given fiat currency.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn btc_price(&self, fiat_code: &str) -> Result<f64, OracleError>;
}

/// `GET {base_url}` → `{"BTC": {"USD": 65000.0, ...}}`, matching the
/// reference price API's response shape.
pub struct HttpPriceOracle {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPriceOracle {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PriceOracle for HttpPriceOracle {
    async fn btc_price(&self, fiat_code: &str) -> Result<f64, OracleError> {
        let response = self.client.get(&self.base_url).send().await?;
        let body: HashMap<String, HashMap<String, f64>> = response.json().await?;
        let currency = fiat_code.to_uppercase();
        body.get("BTC")
            .and_then(|quotes| quotes.get(&currency))
            .copied()
            .ok_or(OracleError::MissingCurrency(currency))
    }
}

/// A fixed-price oracle for tests and as a documented fallback value
/// shape; not the conservative-estimate fallback itself (that lives in
/// the Safety Envelope, which picks its own constant when the real oracle
/// errors).
pub struct FixedPriceOracle {
    pub price: f64,
}

#[async_trait]
impl PriceOracle for FixedPriceOracle {
    async fn btc_price(&self, _fiat_code: &str) -> Result<f64, OracleError> {
        Ok(self.price)
    }
}
