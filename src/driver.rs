//! Cycle driver: one evaluation per block notification, at most one in
//! flight.

use crate::chain::GasPriceSource;
use crate::errors::{AppError, Result};
use crate::evaluator;
use crate::models::{BlockContext, CycleOutcome, NormalizedQuote, TrialQuantity};
use crate::pricefeed::ReferencePriceSource;
use crate::quotes::QuoteSource;
use crate::report::Reporter;
use crate::sizer;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Drives one detection cycle per block notification.
///
/// The driver is a two-state machine: Idle and Evaluating. A notification
/// arriving while a cycle is in flight is dropped, not queued; the next block
/// supersedes a stale one. The busy flag is released by an RAII guard, so an
/// error anywhere inside a cycle cannot leave the driver stuck in Evaluating.
pub struct CycleDriver {
    aggregator: Arc<dyn QuoteSource>,
    pair: Arc<dyn QuoteSource>,
    gas: Arc<dyn GasPriceSource>,
    prices: Arc<dyn ReferencePriceSource>,
    reporter: Arc<dyn Reporter>,
    reference_asset_id: String,
    trial_amount: f64,
    gas_units: u64,
    quote_timeout: Duration,
    trial: OnceCell<TrialQuantity>,
    busy: AtomicBool,
}

impl CycleDriver {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        aggregator: Arc<dyn QuoteSource>,
        pair: Arc<dyn QuoteSource>,
        gas: Arc<dyn GasPriceSource>,
        prices: Arc<dyn ReferencePriceSource>,
        reporter: Arc<dyn Reporter>,
        reference_asset_id: String,
        trial_amount: f64,
        gas_units: u64,
        quote_timeout: Duration,
    ) -> Self {
        Self {
            aggregator,
            pair,
            gas,
            prices,
            reporter,
            reference_asset_id,
            trial_amount,
            gas_units,
            quote_timeout,
            trial: OnceCell::new(),
            busy: AtomicBool::new(false),
        }
    }

    /// Entry point for one block notification.
    ///
    /// Returns `true` if a cycle ran, `false` if the notification was dropped
    /// because a cycle was already in flight.
    pub async fn on_block(&self, block: BlockContext) -> bool {
        let Some(_guard) = self.try_begin() else {
            debug!(block = block.number, "cycle in flight; dropping notification");
            return false;
        };
        self.run_cycle(&block).await;
        true
    }

    /// Idle -> Evaluating transition; `None` when already Evaluating.
    fn try_begin(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(BusyGuard { flag: &self.busy })
    }

    async fn run_cycle(&self, block: &BlockContext) {
        // Sized once from the reference price; retried on later blocks until
        // the feed answers.
        let trial = match self
            .trial
            .get_or_try_init(|| async {
                let price = self.prices.price_usd(&self.reference_asset_id).await?;
                sizer::size_for(self.trial_amount, price)
            })
            .await
        {
            Ok(trial) => *trial,
            Err(e) => {
                warn!(block = block.number, error = %e, "skipping cycle: trial quantity not sizable");
                return;
            }
        };

        let (agg, pair) = tokio::join!(
            self.fetch_quote(self.aggregator.as_ref(), &trial),
            self.fetch_quote(self.pair.as_ref(), &trial),
        );
        let agg = self.usable(agg, block);
        let pair = self.usable(pair, block);

        let outcome = match (agg, pair) {
            (Some(a), Some(b)) => match self.gas.gas_price().await {
                Ok(gas_price) => {
                    evaluator::evaluate(Some(&a), Some(&b), &trial, gas_price, self.gas_units)
                }
                Err(e) => {
                    warn!(block = block.number, error = %e, "gas price fetch failed");
                    CycleOutcome::Indeterminate
                }
            },
            _ => CycleOutcome::Indeterminate,
        };

        self.reporter.report(&outcome, block);
    }

    /// One quote fetch, bounded by the collaborator timeout so a hung call
    /// cannot hold the cycle slot indefinitely.
    async fn fetch_quote(
        &self,
        source: &dyn QuoteSource,
        trial: &TrialQuantity,
    ) -> Result<NormalizedQuote> {
        match tokio::time::timeout(self.quote_timeout, source.quote_for(trial)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::QuoteUnavailable {
                source: source.name(),
                reason: format!("timed out after {:?}", self.quote_timeout),
            }),
        }
    }

    fn usable(
        &self,
        quote: Result<NormalizedQuote>,
        block: &BlockContext,
    ) -> Option<NormalizedQuote> {
        match quote {
            Ok(q) => Some(q),
            Err(e) => {
                warn!(block = block.number, error = %e, "quote fetch failed");
                None
            }
        }
    }
}

struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
