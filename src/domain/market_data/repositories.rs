use crate::domain::errors::FeedError;
use crate::domain::market_data::{Candle, Symbol, Timeframe};

/// Source of full candle snapshots.
///
/// Implementations resolve on the browser event loop, so the returned future is not `Send`.
#[allow(async_fn_in_trait)]
pub trait MarketDataRepository {
    async fn fetch_series(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
    ) -> Result<Vec<Candle>, FeedError>;
}
