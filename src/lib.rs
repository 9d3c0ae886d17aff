//! Core library for the block-arb-watcher project.
//!
//! One detection cycle per new block: fetch quotes from the rate aggregator
//! and the AMM pair concurrently, normalize them, and evaluate both
//! directional spreads net of gas cost.

pub mod chain;
pub mod config;
pub mod driver;
pub mod errors;
pub mod evaluator;
pub mod models;
pub mod pricefeed;
pub mod quotes;
pub mod report;
pub mod sizer;
pub mod utils;
