//! Fiat reference price lookup (CoinGecko simple-price API).

use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use url::Url;

const COINGECKO_ENDPOINT: &str = "https://api.coingecko.com/api/v3/simple/price";

/// A source of the current fiat price for the base asset.
///
/// Only used to size the trial quantity; all failures map to
/// `PricingUnavailable` so the caller can skip the cycle and retry.
#[async_trait]
pub trait ReferencePriceSource: Send + Sync {
    async fn price_usd(&self, asset_id: &str) -> Result<f64>;
}

#[derive(Debug, Deserialize)]
struct Currencies {
    usd: f64,
}

/// CoinGecko-backed implementation of [`ReferencePriceSource`].
pub struct PriceFeed {
    http: reqwest::Client,
    endpoint: Url,
}

impl PriceFeed {
    pub fn new() -> Result<Self> {
        Self::with_endpoint(COINGECKO_ENDPOINT)
    }

    /// Point the feed at an alternate endpoint (used by tests).
    pub fn with_endpoint(endpoint: &str) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint: Url::parse(endpoint)?,
        })
    }
}

#[async_trait]
impl ReferencePriceSource for PriceFeed {
    async fn price_usd(&self, asset_id: &str) -> Result<f64> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("ids", asset_id)
            .append_pair("vs_currencies", "usd");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::PricingUnavailable(e.to_string()))?;
        let body: HashMap<String, Currencies> = response
            .json()
            .await
            .map_err(|e| AppError::PricingUnavailable(e.to_string()))?;

        extract_price(&body, asset_id)
    }
}

fn extract_price(body: &HashMap<String, Currencies>, asset_id: &str) -> Result<f64> {
    body.get(asset_id)
        .map(|c| c.usd)
        .filter(|p| p.is_finite() && *p > 0.0)
        .ok_or_else(|| {
            AppError::PricingUnavailable(format!("no usable usd price for {asset_id}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_price_shape() {
        let raw = r#"{"ethereum":{"usd":1797.25}}"#;
        let body: HashMap<String, Currencies> = serde_json::from_str(raw).expect("json parses");
        let price = extract_price(&body, "ethereum").expect("price present");
        assert_eq!(price, 1797.25);
    }

    #[test]
    fn missing_asset_is_pricing_unavailable() {
        let body: HashMap<String, Currencies> = HashMap::new();
        assert!(matches!(
            extract_price(&body, "ethereum"),
            Err(AppError::PricingUnavailable(_))
        ));
    }

    #[test]
    fn zero_price_is_pricing_unavailable() {
        let raw = r#"{"ethereum":{"usd":0.0}}"#;
        let body: HashMap<String, Currencies> = serde_json::from_str(raw).expect("json parses");
        assert!(matches!(
            extract_price(&body, "ethereum"),
            Err(AppError::PricingUnavailable(_))
        ));
    }
}
