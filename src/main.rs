use anyhow::Result;
use block_arb_watcher::{
    chain::Chain,
    config::AppConfig,
    driver::CycleDriver,
    pricefeed::PriceFeed,
    quotes::{AggregatorSource, PairSource},
    report::ConsoleReporter,
    utils,
};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();

    let config = AppConfig::load()?;
    tracing::info!(
        trial_amount = config.trial_amount,
        gas_units = config.gas_units,
        aggregator = %config.aggregator_address,
        pair = %config.pair_address,
        "[INIT] block-arb-watcher starting"
    );

    let chain = Arc::new(Chain::connect(&config.ws_rpc_url).await?);
    let provider = chain.provider();

    let aggregator = Arc::new(AggregatorSource::new(
        provider.clone(),
        config.aggregator_address,
        config.quote_token,
    ));
    let pair = Arc::new(PairSource::new(
        provider,
        config.pair_address,
        config.base_token,
        config.quote_token,
    ));
    let feed = Arc::new(PriceFeed::new()?);

    let driver = Arc::new(CycleDriver::new(
        aggregator,
        pair,
        chain.clone(),
        feed,
        Arc::new(ConsoleReporter),
        config.reference_asset_id.clone(),
        config.trial_amount,
        config.gas_units,
        Duration::from_secs(config.quote_timeout_secs),
    ));

    let blocks = chain.subscribe_blocks().await?;
    tracing::info!("[INIT] subscribed to new block headers");
    futures::pin_mut!(blocks);
    while let Some(block) = blocks.next().await {
        // Detached per-block task; the driver drops it if a cycle is already
        // in flight.
        let driver = driver.clone();
        tokio::spawn(async move {
            driver.on_block(block).await;
        });
    }

    tracing::error!("block subscription ended");
    Err(anyhow::anyhow!("block header subscription terminated"))
}
