//! Quote sources: one adapter per liquidity venue, normalizing raw provider
//! responses into a common `{buy, sell, spread}` form.

use crate::errors::Result;
use crate::models::{NormalizedQuote, TrialQuantity};
use async_trait::async_trait;

pub mod aggregator;
pub mod pair;

pub use aggregator::AggregatorSource;
pub use pair::{PairSource, PairState, PairToken};

/// A liquidity venue that can price the trial quantity.
///
/// The single capability the evaluator depends on; adding a third venue means
/// adding another implementation, not another evaluator.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Short venue label used in logs and errors.
    fn name(&self) -> &'static str;

    /// Fetch and normalize a quote for the given trial quantity.
    ///
    /// Rates are quote currency per base unit. Fails with `QuoteUnavailable`
    /// when the venue cannot produce a usable quote this cycle.
    async fn quote_for(&self, trial: &TrialQuantity) -> Result<NormalizedQuote>;
}
