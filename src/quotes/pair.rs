//! AMM pair quote source (Uniswap-V2-style constant-product pool).

use super::QuoteSource;
use crate::chain::AmmPair;
use crate::errors::{AppError, Result};
use crate::models::{NormalizedQuote, TrialQuantity};
use crate::utils::fixed_to_f64;
use async_trait::async_trait;
use ethers::{
    providers::{Provider, Ws},
    types::{Address, U256},
};
use std::sync::Arc;

const SOURCE: &str = "pair";

/// Which side of the pair an input amount is denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairToken {
    Base,
    Quote,
}

/// Reserve snapshot of the pair, oriented as base/quote.
#[derive(Debug, Clone, Copy)]
pub struct PairState {
    pub reserve_base: U256,
    pub reserve_quote: U256,
}

impl PairState {
    /// Output amount for disposing `amount_in` of `input` into the pool,
    /// per the constant-product formula with the 0.3% pool fee on input.
    pub fn output_amount_for(&self, input: PairToken, amount_in: U256) -> Result<U256> {
        let (reserve_in, reserve_out) = match input {
            PairToken::Base => (self.reserve_base, self.reserve_quote),
            PairToken::Quote => (self.reserve_quote, self.reserve_base),
        };
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(AppError::QuoteUnavailable {
                source: SOURCE,
                reason: "empty reserves".into(),
            });
        }
        if amount_in.is_zero() {
            return Err(AppError::QuoteUnavailable {
                source: SOURCE,
                reason: "zero input amount".into(),
            });
        }
        let amount_with_fee = amount_in * U256::from(997u64);
        let numerator = amount_with_fee * reserve_out;
        let denominator = reserve_in * U256::from(1000u64) + amount_with_fee;
        Ok(numerator / denominator)
    }
}

/// Quote source backed by an on-chain AMM liquidity pair.
pub struct PairSource {
    contract: AmmPair<Provider<Ws>>,
    base_token: Address,
    quote_token: Address,
}

impl PairSource {
    pub fn new(
        provider: Arc<Provider<Ws>>,
        pair_addr: Address,
        base_token: Address,
        quote_token: Address,
    ) -> Self {
        Self {
            contract: AmmPair::new(pair_addr, provider),
            base_token,
            quote_token,
        }
    }

    /// Resolve the current reserve state, oriented to base/quote.
    async fn fetch_state(&self) -> Result<PairState> {
        let token0_call = self.contract.token_0();
        let reserves_call = self.contract.get_reserves();
        let (token0, (reserve0, reserve1, _last_update)) =
            tokio::try_join!(token0_call.call(), reserves_call.call()).map_err(|e| {
                AppError::QuoteUnavailable {
                    source: SOURCE,
                    reason: e.to_string(),
                }
            })?;
        orient(
            token0,
            self.base_token,
            self.quote_token,
            U256::from(reserve0),
            U256::from(reserve1),
        )
    }
}

#[async_trait]
impl QuoteSource for PairSource {
    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn quote_for(&self, trial: &TrialQuantity) -> Result<NormalizedQuote> {
        let state = self.fetch_state().await?;
        // Dispose quote currency into the pool -> base out -> buy-side rate.
        let base_out = state.output_amount_for(PairToken::Quote, trial.quote_units)?;
        // Dispose base asset into the pool -> quote out -> sell-side rate.
        let quote_out = state.output_amount_for(PairToken::Base, trial.base_units)?;
        normalize(trial, base_out, quote_out)
    }
}

/// Map the pair's token0/token1 reserve order onto base/quote.
fn orient(
    token0: Address,
    base_token: Address,
    quote_token: Address,
    reserve0: U256,
    reserve1: U256,
) -> Result<PairState> {
    if token0 == base_token {
        Ok(PairState {
            reserve_base: reserve0,
            reserve_quote: reserve1,
        })
    } else if token0 == quote_token {
        Ok(PairState {
            reserve_base: reserve1,
            reserve_quote: reserve0,
        })
    } else {
        Err(AppError::QuoteUnavailable {
            source: SOURCE,
            reason: format!("pair token0 {token0:#x} matches neither base nor quote token"),
        })
    }
}

/// Normalize both pool outputs back into quote-currency-per-base-unit,
/// using the trial quantity as denominator.
fn normalize(trial: &TrialQuantity, base_out: U256, quote_out: U256) -> Result<NormalizedQuote> {
    let base_out = fixed_to_f64(base_out, 18);
    let quote_out = fixed_to_f64(quote_out, 18);
    if base_out <= 0.0 || quote_out <= 0.0 || trial.amount <= 0.0 {
        return Err(AppError::QuoteUnavailable {
            source: SOURCE,
            reason: format!("degenerate pool output (base_out={base_out}, quote_out={quote_out})"),
        });
    }
    let buy = fixed_to_f64(trial.quote_units, 18) / base_out;
    let sell = quote_out / trial.amount;
    Ok(NormalizedQuote::new(buy, sell))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(n: u64) -> U256 {
        U256::from(n) * U256::exp10(18)
    }

    // 1000 base / 2,000,000 quote => 2000 spot price.
    fn state() -> PairState {
        PairState {
            reserve_base: units(1_000),
            reserve_quote: units(2_000_000),
        }
    }

    #[test]
    fn constant_product_output_matches_reference_values() {
        // 10 in against 10/10 reserves: 10*997*10 / (10*1000 + 10*997) = 4.99..
        let small = PairState {
            reserve_base: U256::from(10u64),
            reserve_quote: U256::from(10u64),
        };
        let out = small
            .output_amount_for(PairToken::Base, U256::from(10u64))
            .expect("output computes");
        assert_eq!(out, U256::from(4u64));
    }

    #[test]
    fn empty_reserves_are_unavailable() {
        let empty = PairState {
            reserve_base: U256::zero(),
            reserve_quote: units(1),
        };
        let err = empty
            .output_amount_for(PairToken::Quote, units(1))
            .unwrap_err();
        assert!(matches!(err, AppError::QuoteUnavailable { .. }));
    }

    #[test]
    fn buy_sits_above_spot_and_sell_below() {
        let trial = crate::sizer::size_for(1.0, 2000.0).expect("sizing succeeds");
        let base_out = state()
            .output_amount_for(PairToken::Quote, trial.quote_units)
            .expect("buy leg computes");
        let quote_out = state()
            .output_amount_for(PairToken::Base, trial.base_units)
            .expect("sell leg computes");
        let quote = normalize(&trial, base_out, quote_out).expect("normalizes");

        // Fee plus slippage push the buy rate above spot and the sell rate below.
        assert!(quote.buy > 2000.0, "buy {} should exceed spot", quote.buy);
        assert!(quote.sell < 2000.0, "sell {} should undercut spot", quote.sell);
        assert!(quote.spread > 0.0);
        // Both within ~1% of spot for a pool this deep.
        assert!((quote.buy - 2000.0) / 2000.0 < 0.01);
        assert!((2000.0 - quote.sell) / 2000.0 < 0.01);
    }

    #[test]
    fn orients_reserves_by_token0() {
        let base = Address::repeat_byte(0xaa);
        let quote = Address::repeat_byte(0xbb);

        let forward = orient(base, base, quote, units(1), units(2)).expect("orients");
        assert_eq!(forward.reserve_base, units(1));
        let flipped = orient(quote, base, quote, units(1), units(2)).expect("orients");
        assert_eq!(flipped.reserve_base, units(2));

        let stranger = Address::repeat_byte(0xcc);
        assert!(orient(stranger, base, quote, units(1), units(2)).is_err());
    }

    #[test]
    fn zero_output_never_becomes_a_quote() {
        let trial = crate::sizer::size_for(1.0, 2000.0).expect("sizing succeeds");
        let err = normalize(&trial, U256::zero(), units(1)).unwrap_err();
        assert!(matches!(err, AppError::QuoteUnavailable { .. }));
    }
}
