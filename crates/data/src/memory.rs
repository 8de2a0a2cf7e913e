use anyhow::{anyhow, Result};
use async_trait::async_trait;
use flowvalue_core::{Candle, CandleSource, SourceError, Timeframe};
use std::collections::{HashMap, HashSet};

/// Candle source backed by a fixed in-memory map.
#[derive(Debug, Clone, Default)]
pub struct MemoryCandleSource {
    series: HashMap<(String, Timeframe), Vec<Candle>>,
    failing: HashSet<String>,
}

impl MemoryCandleSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores candles for a symbol and timeframe, sorted ascending by time.
    pub fn insert(&mut self, symbol: impl Into<String>, timeframe: Timeframe, mut candles: Vec<Candle>) {
        candles.sort_by_key(|c| c.time);
        self.series.insert((symbol.into(), timeframe), candles);
    }

    #[must_use]
    pub fn with_series(mut self, symbol: impl Into<String>, timeframe: Timeframe, candles: Vec<Candle>) -> Self {
        self.insert(symbol, timeframe, candles);
        self
    }

    /// Makes every fetch for `symbol` fail.
    #[must_use]
    pub fn with_failure(mut self, symbol: impl Into<String>) -> Self {
        self.failing.insert(symbol.into());
        self
    }
}

#[async_trait]
impl CandleSource for MemoryCandleSource {
    async fn fetch_candles(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Candle>> {
        if self.failing.contains(symbol) {
            return Err(anyhow!("fetch failed for {symbol}"));
        }
        self.series
            .get(&(symbol.to_string(), timeframe))
            .cloned()
            .ok_or_else(|| SourceError::UnknownSymbol(format!("{symbol} ({timeframe})")).into())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_sorted_candles() {
        let source = MemoryCandleSource::new().with_series(
            "SPY",
            Timeframe::Daily,
            vec![Candle::flat(2, 2.0), Candle::flat(1, 1.0)],
        );
        let candles = source.fetch_candles("SPY", Timeframe::Daily).await.unwrap();
        assert_eq!(candles.iter().map(|c| c.time).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn unknown_and_failing_symbols_error() {
        let source = MemoryCandleSource::new()
            .with_series("SPY", Timeframe::Daily, vec![Candle::flat(1, 1.0)])
            .with_failure("BAD");
        assert!(source.fetch_candles("SPY", Timeframe::Weekly).await.is_err());
        assert!(source.fetch_candles("BAD", Timeframe::Daily).await.is_err());
    }
}
