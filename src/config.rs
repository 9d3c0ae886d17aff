//! Configuration loader and application settings.

use crate::errors::{AppError, Result};
use ethers::types::Address;
use std::fmt::Display;
use std::str::FromStr;

// Mainnet defaults for the ETH/DAI deployment this watcher targets.
const DEFAULT_AGGREGATOR: &str = "0x818E6FECD516Ecc3849DAf6845e3EC868087B755";
const DEFAULT_PAIR: &str = "0xA478c2975Ab1Ea89e8196811F51A7B7Ade33eB11";
const DEFAULT_BASE_TOKEN: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"; // WETH
const DEFAULT_QUOTE_TOKEN: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F"; // DAI

/// Consolidated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// WebSocket endpoint of the Ethereum-compatible node.
    pub ws_rpc_url: String,
    /// Rate-aggregator proxy contract.
    pub aggregator_address: Address,
    /// AMM pair contract holding the base/quote reserves.
    pub pair_address: Address,
    /// ERC-20 base asset held by the pair (e.g. WETH).
    pub base_token: Address,
    /// ERC-20 quote currency (e.g. DAI).
    pub quote_token: Address,
    /// Asset id understood by the fiat reference price feed.
    pub reference_asset_id: String,
    /// Trial size in whole base-asset units.
    pub trial_amount: f64,
    /// Fixed gas-unit estimate for one hypothetical round trip.
    pub gas_units: u64,
    /// Upper bound on a single quote fetch.
    pub quote_timeout_secs: u64,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let ws_rpc_url = std::env::var("WS_RPC_URL").map_err(|_| {
            AppError::Config("Set WS_RPC_URL env var to your Ethereum node WebSocket endpoint".into())
        })?;
        let aggregator_address = parse_address("AGGREGATOR_ADDRESS", DEFAULT_AGGREGATOR)?;
        let pair_address = parse_address("PAIR_ADDRESS", DEFAULT_PAIR)?;
        let base_token = parse_address("BASE_TOKEN", DEFAULT_BASE_TOKEN)?;
        let quote_token = parse_address("QUOTE_TOKEN", DEFAULT_QUOTE_TOKEN)?;
        let reference_asset_id =
            std::env::var("REFERENCE_ASSET_ID").unwrap_or_else(|_| "ethereum".into());
        let trial_amount: f64 = env_or("TRIAL_AMOUNT", 10.0)?;
        if !(trial_amount > 0.0) {
            return Err(AppError::Config(format!(
                "TRIAL_AMOUNT must be positive, got {trial_amount}"
            )));
        }
        let gas_units: u64 = env_or("GAS_UNITS", 200_000)?;
        let quote_timeout_secs: u64 = env_or("QUOTE_TIMEOUT_SECS", 10)?;

        Ok(Self {
            ws_rpc_url,
            aggregator_address,
            pair_address,
            base_token,
            quote_token,
            reference_asset_id,
            trial_amount,
            gas_units,
            quote_timeout_secs,
        })
    }
}

fn parse_address(var: &str, default: &str) -> Result<Address> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.into());
    raw.parse()
        .map_err(|e| AppError::Config(format!("{var}: invalid address {raw}: {e}")))
}

fn env_or<T>(var: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(var) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("{var}: invalid value {raw}: {e}"))),
        Err(_) => Ok(default),
    }
}
