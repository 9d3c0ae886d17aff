//! Outcome reporting sink.

use crate::models::{BlockContext, CycleOutcome};

/// Side-effecting sink for cycle outcomes; the engine does not depend on any
/// return value from it.
pub trait Reporter: Send + Sync {
    fn report(&self, outcome: &CycleOutcome, block: &BlockContext);
}

/// Logs outcomes through `tracing`.
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, outcome: &CycleOutcome, block: &BlockContext) {
        match outcome {
            CycleOutcome::Opportunity(result) => {
                let (buy_venue, sell_venue) = result.direction.venues();
                tracing::info!(
                    block = block.number,
                    direction = %result.direction,
                    "[OPP] arb opportunity found"
                );
                tracing::info!(
                    "Buy base on {} at {:.2} -> sell on {} at {:.2} | expected profit {:.2} (gross {:.2}, gas {:.2})",
                    buy_venue,
                    result.buy_at,
                    sell_venue,
                    result.sell_at,
                    result.net_profit,
                    result.gross_profit,
                    result.cost.cost_quote,
                );
            }
            CycleOutcome::NoOpportunity => {
                tracing::debug!(block = block.number, "[CYCLE] no opportunity");
            }
            CycleOutcome::Indeterminate => {
                tracing::warn!(
                    block = block.number,
                    "[CYCLE] indeterminate; one or more data sources degraded"
                );
            }
        }
    }
}
