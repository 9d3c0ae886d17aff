//! Blockchain collaborators: node connection, block subscription, gas price,
//! and the contract bindings used by the quote sources.

use crate::errors::Result;
use crate::models::BlockContext;
use async_trait::async_trait;
use ethers::{
    contract::abigen,
    providers::{Middleware, Provider, Ws},
    types::U256,
};
use futures::{Stream, StreamExt};
use std::sync::Arc;

abigen!(
    RateAggregator,
    r#"[
        function getExpectedRate(address src, address dest, uint256 srcQty) view returns (uint256 expectedRate, uint256 worstRate)
    ]"#,
);

abigen!(
    AmmPair,
    r#"[
        function getReserves() view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast)
        function token0() view returns (address)
    ]"#,
);

/// Current network fee level, in wei per gas unit.
#[async_trait]
pub trait GasPriceSource: Send + Sync {
    async fn gas_price(&self) -> Result<U256>;
}

/// WebSocket connection to an Ethereum-compatible node.
///
/// The provider is shared by the block subscription, the gas price reads and
/// the contract clients; it is safe for concurrent independent requests.
pub struct Chain {
    provider: Arc<Provider<Ws>>,
}

impl Chain {
    pub async fn connect(ws_url: &str) -> Result<Self> {
        let provider = Provider::<Ws>::connect(ws_url).await?;
        Ok(Self {
            provider: Arc::new(provider),
        })
    }

    pub fn provider(&self) -> Arc<Provider<Ws>> {
        self.provider.clone()
    }

    /// Lazy, infinite stream of new block headers in chain order.
    ///
    /// Headers without a number (pending blocks) are skipped. The stream ends
    /// only if the underlying subscription is lost; there is no replay.
    pub async fn subscribe_blocks(&self) -> Result<impl Stream<Item = BlockContext> + '_> {
        let blocks = self.provider.subscribe_blocks().await?;
        Ok(blocks.filter_map(|header| async move {
            header.number.map(|n| BlockContext { number: n.as_u64() })
        }))
    }
}

#[async_trait]
impl GasPriceSource for Chain {
    async fn gas_price(&self) -> Result<U256> {
        Ok(self.provider.get_gas_price().await?)
    }
}
