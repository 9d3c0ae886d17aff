//! Trial-quantity sizing from the fiat reference price.

use crate::errors::{AppError, Result};
use crate::models::TrialQuantity;
use bigdecimal::{BigDecimal, RoundingMode};
use ethers::types::U256;

const FIXED_POINT_SCALE: u64 = 1_000_000_000_000_000_000; // 10^18

/// Size a trial quantity for quote fetching.
///
/// `amount` is the trial size in whole base-asset units; `reference_price`
/// the current fiat price in quote currency per base unit. Both amounts are
/// converted into the 18-decimal fixed point the on-chain providers expect,
/// going through `BigDecimal` so the scale factor never passes through float
/// rounding.
pub fn size_for(amount: f64, reference_price: f64) -> Result<TrialQuantity> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::PricingUnavailable(format!(
            "trial amount must be positive, got {amount}"
        )));
    }
    if !reference_price.is_finite() || reference_price <= 0.0 {
        return Err(AppError::PricingUnavailable(format!(
            "reference price must be positive, got {reference_price}"
        )));
    }

    let base_units = to_fixed(amount)?;
    let quote_units = to_fixed(amount * reference_price)?;
    Ok(TrialQuantity {
        amount,
        base_units,
        quote_units,
    })
}

fn to_fixed(value: f64) -> Result<U256> {
    let decimal = BigDecimal::try_from(value)
        .map_err(|e| AppError::PricingUnavailable(format!("unrepresentable amount {value}: {e}")))?;
    let scaled =
        (decimal * BigDecimal::from(FIXED_POINT_SCALE)).with_scale_round(0, RoundingMode::Down);
    U256::from_dec_str(&scaled.to_string())
        .map_err(|e| AppError::PricingUnavailable(format!("fixed-point conversion failed: {e}")))
}
