//! Cycle-scoped value objects shared throughout the engine.

use ethers::types::U256;
use std::fmt;

/// Fixed trial size used for every evaluation cycle.
///
/// Computed once from the fiat reference price and never mutated afterwards;
/// each cycle borrows it read-only.
#[derive(Debug, Clone, Copy)]
pub struct TrialQuantity {
    /// Trial size in whole base-asset units (e.g. 10 ETH).
    pub amount: f64,
    /// Same amount in 18-decimal fixed point (wei).
    pub base_units: U256,
    /// Quote-currency equivalent at the reference price, 18-decimal fixed point.
    pub quote_units: U256,
}

/// Buy/sell rates for one liquidity venue, in quote currency per base unit.
///
/// `buy` is what one base unit costs to acquire from the venue, `sell` what
/// disposing one base unit into the venue yields. `spread` may be negative on
/// bad data; the evaluator does not assume a rational market maker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedQuote {
    pub buy: f64,
    pub sell: f64,
    pub spread: f64,
}

impl NormalizedQuote {
    pub fn new(buy: f64, sell: f64) -> Self {
        Self {
            buy,
            sell,
            spread: buy - sell,
        }
    }

    /// Midpoint of this venue's own buy/sell rates.
    pub fn midpoint(&self) -> f64 {
        (self.buy + self.sell) / 2.0
    }
}

/// Gas cost of one hypothetical round trip, converted into quote currency.
/// Recomputed every cycle from the current network fee level.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionCost {
    pub gas_price_wei: U256,
    pub gas_units: u64,
    pub cost_quote: f64,
}

/// Which venue to buy from and which to sell into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Buy from the rate aggregator, sell into the AMM pair.
    AggregatorToPair,
    /// Buy from the AMM pair, sell into the rate aggregator.
    PairToAggregator,
}

impl Direction {
    /// Venue labels as (buy side, sell side).
    pub fn venues(&self) -> (&'static str, &'static str) {
        match self {
            Direction::AggregatorToPair => ("aggregator", "pair"),
            Direction::PairToAggregator => ("pair", "aggregator"),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (buy, sell) = self.venues();
        write!(f, "{buy}->{sell}")
    }
}

/// A profitable divergence found by the evaluator.
#[derive(Debug, Clone, Copy)]
pub struct ArbitrageResult {
    pub direction: Direction,
    /// Buy rate at the source venue, quote per base unit.
    pub buy_at: f64,
    /// Sell rate at the destination venue, quote per base unit.
    pub sell_at: f64,
    pub gross_profit: f64,
    pub net_profit: f64,
    pub cost: ExecutionCost,
}

/// Outcome of one detection cycle.
#[derive(Debug, Clone, Copy)]
pub enum CycleOutcome {
    Opportunity(ArbitrageResult),
    /// Both quotes arrived and neither direction cleared the execution cost.
    /// The expected common case, not an error.
    NoOpportunity,
    /// One or both quote sources failed; distinguishable from a genuine
    /// no-arbitrage result so operators can see degraded data.
    Indeterminate,
}

/// Context carried from the block notification that triggered a cycle.
#[derive(Debug, Clone, Copy)]
pub struct BlockContext {
    pub number: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spread_is_buy_minus_sell() {
        let q = NormalizedQuote::new(1800.0, 1795.0);
        assert_eq!(q.spread, 5.0);
        assert_eq!(q.midpoint(), 1797.5);
    }

    #[test]
    fn spread_may_be_negative() {
        let q = NormalizedQuote::new(1790.0, 1795.0);
        assert_eq!(q.spread, -5.0);
    }

    #[test]
    fn direction_labels() {
        assert_eq!(Direction::AggregatorToPair.to_string(), "aggregator->pair");
        assert_eq!(
            Direction::PairToAggregator.venues(),
            ("pair", "aggregator")
        );
    }
}
