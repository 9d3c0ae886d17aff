//! Rate-aggregator quote source (Kyber-style `getExpectedRate` contract).

use super::QuoteSource;
use crate::chain::RateAggregator;
use crate::errors::{AppError, Result};
use crate::models::{NormalizedQuote, TrialQuantity};
use crate::utils::fixed_to_f64;
use async_trait::async_trait;
use ethers::{
    providers::{Provider, Ws},
    types::{Address, U256},
};
use std::sync::Arc;

const SOURCE: &str = "aggregator";

/// Sentinel address the aggregator uses for the native base asset.
fn native_asset() -> Address {
    Address::repeat_byte(0xee)
}

/// Quote source backed by an on-chain rate-aggregator contract.
pub struct AggregatorSource {
    contract: RateAggregator<Provider<Ws>>,
    quote_token: Address,
}

impl AggregatorSource {
    pub fn new(provider: Arc<Provider<Ws>>, contract_addr: Address, quote_token: Address) -> Self {
        Self {
            contract: RateAggregator::new(contract_addr, provider),
            quote_token,
        }
    }
}

#[async_trait]
impl QuoteSource for AggregatorSource {
    fn name(&self) -> &'static str {
        SOURCE
    }

    /// Two independent rate queries, both of which must succeed: one pricing
    /// quote-currency into base asset at the trial's quote amount, one the
    /// inverse at the trial's base amount.
    async fn quote_for(&self, trial: &TrialQuantity) -> Result<NormalizedQuote> {
        let base = native_asset();
        let buy_call = self
            .contract
            .get_expected_rate(self.quote_token, base, trial.quote_units);
        let sell_call = self
            .contract
            .get_expected_rate(base, self.quote_token, trial.base_units);

        let ((raw_buy, _worst_buy), (raw_sell, _worst_sell)) =
            tokio::try_join!(buy_call.call(), sell_call.call()).map_err(|e| {
                AppError::QuoteUnavailable {
                    source: SOURCE,
                    reason: e.to_string(),
                }
            })?;

        normalize(raw_buy, raw_sell)
    }
}

/// Invert and rescale the raw 1e18 fixed-point rates.
///
/// `raw_buy` is base-per-quote, so the buy rate is its inverse; `raw_sell` is
/// already quote-per-base. A zero rate means the venue cannot serve the size
/// and must never be divided into.
fn normalize(raw_buy: U256, raw_sell: U256) -> Result<NormalizedQuote> {
    let buy_rate = fixed_to_f64(raw_buy, 18);
    let sell_rate = fixed_to_f64(raw_sell, 18);
    if buy_rate <= 0.0 || sell_rate <= 0.0 {
        return Err(AppError::QuoteUnavailable {
            source: SOURCE,
            reason: format!("zero or unusable rate (buy={raw_buy}, sell={raw_sell})"),
        });
    }
    Ok(NormalizedQuote::new(1.0 / buy_rate, sell_rate))
}
