//! The decision core: directional profit computation over two normalized
//! quotes, net of execution cost.

use crate::models::{
    ArbitrageResult, CycleOutcome, Direction, ExecutionCost, NormalizedQuote, TrialQuantity,
};
use crate::utils::fixed_to_f64;
use ethers::types::U256;

/// Convert the gas estimate for one round trip into quote currency at the
/// midpoint of the first source's buy/sell (midpoint, not the buy or sell
/// rate alone).
pub fn execution_cost(a: &NormalizedQuote, gas_price_wei: U256, gas_units: u64) -> ExecutionCost {
    let total_wei = gas_price_wei.saturating_mul(U256::from(gas_units));
    let cost_quote = fixed_to_f64(total_wei, 18) * a.midpoint();
    ExecutionCost {
        gas_price_wei,
        gas_units,
        cost_quote,
    }
}

/// Evaluate both directions over the trial amount and decide whether an
/// opportunity exists.
///
/// A missing quote from either normalizer short-circuits to `Indeterminate`;
/// the evaluator never guesses a quote value. If both directions come out
/// positive, which genuine markets do not produce, the strictly larger one is
/// reported and the condition flagged as a data-quality signal.
pub fn evaluate(
    a: Option<&NormalizedQuote>,
    b: Option<&NormalizedQuote>,
    trial: &TrialQuantity,
    gas_price_wei: U256,
    gas_units: u64,
) -> CycleOutcome {
    let (Some(a), Some(b)) = (a, b) else {
        return CycleOutcome::Indeterminate;
    };

    let cost = execution_cost(a, gas_price_wei, gas_units);

    // Buy from a, sell into b.
    let gross_forward = trial.amount * (b.sell - a.buy);
    let net_forward = gross_forward - cost.cost_quote;
    // Buy from b, sell into a.
    let gross_reverse = trial.amount * (a.sell - b.buy);
    let net_reverse = gross_reverse - cost.cost_quote;

    let forward = ArbitrageResult {
        direction: Direction::AggregatorToPair,
        buy_at: a.buy,
        sell_at: b.sell,
        gross_profit: gross_forward,
        net_profit: net_forward,
        cost,
    };
    let reverse = ArbitrageResult {
        direction: Direction::PairToAggregator,
        buy_at: b.buy,
        sell_at: a.sell,
        gross_profit: gross_reverse,
        net_profit: net_reverse,
        cost,
    };

    match (net_forward > 0.0, net_reverse > 0.0) {
        (false, false) => CycleOutcome::NoOpportunity,
        (true, false) => CycleOutcome::Opportunity(forward),
        (false, true) => CycleOutcome::Opportunity(reverse),
        (true, true) => {
            // Simultaneous arbitrage both ways across the same two venues
            // should not occur; one of the inputs is suspect.
            tracing::warn!(
                net_forward,
                net_reverse,
                "both directions positive; treating quotes as a data-quality signal"
            );
            if net_forward >= net_reverse {
                CycleOutcome::Opportunity(forward)
            } else {
                CycleOutcome::Opportunity(reverse)
            }
        }
    }
}
