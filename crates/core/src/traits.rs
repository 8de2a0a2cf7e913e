use crate::market::{Candle, Timeframe};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Supplies chronologically ordered candles for a symbol.
///
/// Implementations may return partial or empty histories. Callers inside the
/// snapshot engine treat an error the same as an empty history.
#[async_trait]
pub trait CandleSource: Send + Sync {
    async fn fetch_candles(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Candle>>;

    /// Returns a short name used in logs.
    fn name(&self) -> &str;
}

#[async_trait]
impl<S: CandleSource + ?Sized> CandleSource for Arc<S> {
    async fn fetch_candles(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Candle>> {
        (**self).fetch_candles(symbol, timeframe).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
