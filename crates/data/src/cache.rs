//! TTL cache in front of a candle source.
//!
//! Daily candles are kept for 15 minutes and weekly/monthly candles for two
//! hours by default. Failed fetches are never cached.

use anyhow::Result;
use async_trait::async_trait;
use flowvalue_core::{Candle, CandleSource, SourceConfig, Timeframe};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct CacheEntry {
    stored_at: Instant,
    candles: Vec<Candle>,
}

pub struct CachedCandleSource<S> {
    inner: S,
    ttl_daily: Duration,
    ttl_long: Duration,
    entries: Mutex<HashMap<(String, Timeframe), CacheEntry>>,
}

impl<S: CandleSource> CachedCandleSource<S> {
    #[must_use]
    pub fn new(inner: S, ttl_daily: Duration, ttl_long: Duration) -> Self {
        Self {
            inner,
            ttl_daily,
            ttl_long,
            entries: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn from_config(inner: S, config: &SourceConfig) -> Self {
        Self::new(
            inner,
            Duration::from_secs(config.cache_ttl_daily_secs),
            Duration::from_secs(config.cache_ttl_long_secs),
        )
    }

    const fn ttl(&self, timeframe: Timeframe) -> Duration {
        match timeframe {
            Timeframe::Daily => self.ttl_daily,
            Timeframe::Weekly | Timeframe::Monthly => self.ttl_long,
        }
    }
}

#[async_trait]
impl<S: CandleSource> CandleSource for CachedCandleSource<S> {
    async fn fetch_candles(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Candle>> {
        let key = (symbol.to_string(), timeframe);
        let ttl = self.ttl(timeframe);

        {
            let mut entries = self.entries.lock().await;
            match entries.get(&key) {
                Some(entry) if entry.stored_at.elapsed() < ttl => {
                    tracing::trace!(symbol, %timeframe, "Candle cache hit");
                    return Ok(entry.candles.clone());
                }
                Some(_) => {
                    entries.remove(&key);
                }
                None => {}
            }
        }

        let candles = self.inner.fetch_candles(symbol, timeframe).await?;
        self.entries.lock().await.insert(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                candles: candles.clone(),
            },
        );
        Ok(candles)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCandleSource;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSource {
        inner: MemoryCandleSource,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CandleSource for CountingSource {
        async fn fetch_candles(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Candle>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_candles(symbol, timeframe).await
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn counting() -> (CountingSource, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let inner = MemoryCandleSource::new()
            .with_series("SPY", Timeframe::Daily, vec![Candle::flat(1, 100.0)])
            .with_failure("BAD");
        (
            CountingSource {
                inner,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }

    #[tokio::test]
    async fn serves_repeated_requests_from_cache() {
        let (source, calls) = counting();
        let cached = CachedCandleSource::new(source, Duration::from_secs(60), Duration::from_secs(60));

        let first = cached.fetch_candles("SPY", Timeframe::Daily).await.unwrap();
        let second = cached.fetch_candles("SPY", Timeframe::Daily).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_entries_are_refetched() {
        let (source, calls) = counting();
        let cached = CachedCandleSource::new(source, Duration::ZERO, Duration::ZERO);

        cached.fetch_candles("SPY", Timeframe::Daily).await.unwrap();
        cached.fetch_candles("SPY", Timeframe::Daily).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let (source, calls) = counting();
        let cached = CachedCandleSource::new(source, Duration::from_secs(60), Duration::from_secs(60));

        assert!(cached.fetch_candles("BAD", Timeframe::Daily).await.is_err());
        assert!(cached.fetch_candles("BAD", Timeframe::Daily).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
