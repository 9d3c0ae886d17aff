//! Miscellaneous helper utilities.

use ethers::types::U256;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize `tracing` subscriber with env-based filter.
///
/// If `RUST_LOG` is not set, defaults to `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Convert a fixed-point integer into a decimal float.
///
/// Values too large for `f64` lose precision; unparseable values map to 0.0,
/// which callers must treat as unusable rather than as a real rate.
pub fn fixed_to_f64(value: U256, decimals: u32) -> f64 {
    value
        .to_string()
        .parse::<f64>()
        .map(|v| v / 10f64.powi(decimals as i32))
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_wei_to_whole_units() {
        let one_eth = U256::exp10(18);
        assert_eq!(fixed_to_f64(one_eth, 18), 1.0);
        let half = U256::exp10(17) * U256::from(5u64);
        assert_eq!(fixed_to_f64(half, 18), 0.5);
    }

    #[test]
    fn zero_stays_zero() {
        assert_eq!(fixed_to_f64(U256::zero(), 18), 0.0);
    }

    #[test]
    fn respects_decimals_argument() {
        let v = U256::from(1_500_000u64);
        assert_eq!(fixed_to_f64(v, 6), 1.5);
    }
}
