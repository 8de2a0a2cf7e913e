//! Async snapshot engine: fetches candles for a universe and runs the pipeline.
//!
//! All fetches for one invocation are issued concurrently. A failed fetch is
//! logged and treated as an empty history, so one bad symbol degrades only its
//! own asset.

use crate::align::SeriesMap;
use crate::fx::{to_usd_series, FxRates, DEFAULT_FALLBACK_RATE};
use crate::pipeline::{series_counts, snapshot_from_series, Snapshot, SnapshotWithTrails};
use crate::trails::{trails_from_series, DEFAULT_TRAIL_STEP};
use anyhow::{Context, Result};
use flowvalue_core::{
    validate_universe, AppConfig, AssetDef, Candle, CandleOverride, CandleSource, PriceConversion, SnapshotParams,
    Timeframe,
};
use futures_util::future::join_all;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Where USD/JPY rates come from.
#[derive(Debug, Clone, PartialEq)]
pub struct FxSettings {
    pub symbol: String,
    pub fallback_rate: f64,
}

impl Default for FxSettings {
    fn default() -> Self {
        Self {
            symbol: "USDJPY=X".to_string(),
            fallback_rate: DEFAULT_FALLBACK_RATE,
        }
    }
}

/// Converted daily and weekly series for a universe.
#[derive(Debug, Clone, Default)]
pub struct LoadedSeries {
    pub daily: SeriesMap,
    pub weekly: SeriesMap,
}

/// Computes Flow/Value snapshots from a [`CandleSource`].
pub struct SnapshotEngine<S> {
    source: S,
    params: SnapshotParams,
    fx: FxSettings,
    trail_step: usize,
}

impl<S: CandleSource> SnapshotEngine<S> {
    #[must_use]
    pub fn new(source: S, params: SnapshotParams) -> Self {
        Self {
            source,
            params,
            fx: FxSettings::default(),
            trail_step: DEFAULT_TRAIL_STEP,
        }
    }

    /// Builds an engine from loaded configuration.
    #[must_use]
    pub fn from_config(source: S, config: &AppConfig) -> Self {
        Self::new(source, config.snapshot)
            .with_fx(FxSettings {
                symbol: config.source.fx_symbol.clone(),
                fallback_rate: config.source.fx_fallback_rate,
            })
            .with_trail_step(config.trails.step)
    }

    #[must_use]
    pub fn with_fx(mut self, fx: FxSettings) -> Self {
        self.fx = fx;
        self
    }

    #[must_use]
    pub fn with_trail_step(mut self, step: usize) -> Self {
        self.trail_step = step.max(1);
        self
    }

    #[must_use]
    pub const fn params(&self) -> &SnapshotParams {
        &self.params
    }

    /// Computes the current snapshot for `universe`.
    ///
    /// # Errors
    /// Returns an error only for invalid parameters or a universe with
    /// duplicate ids. Missing market data yields null scores instead.
    pub async fn compute_snapshot(&self, universe: &[AssetDef]) -> Result<Snapshot> {
        self.validate(universe)?;
        info!("Computing snapshot for {} assets via {}", universe.len(), self.source.name());

        let loaded = self.load_series(universe, &HashMap::new()).await;
        let items = snapshot_from_series(&self.params, universe, &loaded.daily, &loaded.weekly);

        Ok(Snapshot {
            items,
            params: self.params,
        })
    }

    /// Computes the current snapshot plus trails reaching `months_back`
    /// samples into the past.
    ///
    /// `overrides` supplies candles for assets matched by id first, then by
    /// symbol. Those assets are never requested from the source.
    ///
    /// # Errors
    /// Returns an error only for invalid parameters or a universe with
    /// duplicate ids.
    pub async fn compute_snapshot_with_trails(
        &self,
        universe: &[AssetDef],
        months_back: usize,
        overrides: &HashMap<String, CandleOverride>,
    ) -> Result<SnapshotWithTrails> {
        self.validate(universe)?;
        info!(
            "Computing snapshot with {} trail samples for {} assets ({} overrides)",
            months_back,
            universe.len(),
            overrides.len()
        );

        let loaded = self.load_series(universe, overrides).await;
        let items = snapshot_from_series(&self.params, universe, &loaded.daily, &loaded.weekly);
        let trails = trails_from_series(&self.params, &loaded.daily, &loaded.weekly, months_back, self.trail_step);
        let meta = series_counts(universe, &loaded.daily, &loaded.weekly);

        Ok(SnapshotWithTrails {
            items,
            trails,
            meta,
            params: self.params,
        })
    }

    /// Fetches and converts the daily and weekly series of every asset.
    pub async fn load_series(
        &self,
        universe: &[AssetDef],
        overrides: &HashMap<String, CandleOverride>,
    ) -> LoadedSeries {
        let (fx_daily, fx_weekly) = self.load_fx(universe).await;

        let fetched = join_all(universe.iter().map(|asset| async move {
            let (daily, weekly) = self.asset_candles(asset, overrides).await;
            (asset, daily, weekly)
        }))
        .await;

        let mut loaded = LoadedSeries::default();
        for (asset, daily, weekly) in fetched {
            if daily.is_empty() {
                debug!(asset = %asset.id, "No daily candles, flow will be null");
            }
            if weekly.is_empty() {
                debug!(asset = %asset.id, "No weekly candles, value will be null");
            }
            loaded.daily.insert(asset.id.clone(), to_usd_series(&daily, asset, &fx_daily));
            loaded.weekly.insert(asset.id.clone(), to_usd_series(&weekly, asset, &fx_weekly));
        }
        loaded
    }

    fn validate(&self, universe: &[AssetDef]) -> Result<()> {
        self.params.validate().context("Invalid snapshot parameters")?;
        validate_universe(universe).context("Invalid universe")?;
        Ok(())
    }

    async fn load_fx(&self, universe: &[AssetDef]) -> (FxRates, FxRates) {
        let fallback = self.fx.fallback_rate;
        let needs_fx = universe
            .iter()
            .any(|a| a.price_to_usd == Some(PriceConversion::Jpy));
        if !needs_fx {
            return (FxRates::fallback_only(fallback), FxRates::fallback_only(fallback));
        }

        let (daily, weekly) = tokio::join!(
            self.fetch_or_empty(&self.fx.symbol, Timeframe::Daily),
            self.fetch_or_empty(&self.fx.symbol, Timeframe::Weekly),
        );
        let rates = (
            FxRates::from_candles(&daily, fallback),
            FxRates::from_candles(&weekly, fallback),
        );
        if rates.0.is_empty() || rates.1.is_empty() {
            warn!(
                symbol = %self.fx.symbol,
                fallback,
                "FX history incomplete, JPY assets use the fallback rate where no quote exists"
            );
        }
        rates
    }

    async fn asset_candles(
        &self,
        asset: &AssetDef,
        overrides: &HashMap<String, CandleOverride>,
    ) -> (Vec<Candle>, Vec<Candle>) {
        let injected = overrides
            .get(&asset.id)
            .or_else(|| overrides.get(&asset.symbol));
        if injected.is_some() {
            debug!(asset = %asset.id, "Using injected candles");
        }

        tokio::join!(
            self.candles_for(&asset.symbol, injected, Timeframe::Daily),
            self.candles_for(&asset.symbol, injected, Timeframe::Weekly),
        )
    }

    async fn candles_for(
        &self,
        symbol: &str,
        injected: Option<&CandleOverride>,
        timeframe: Timeframe,
    ) -> Vec<Candle> {
        match injected.and_then(|ov| ov.for_timeframe(timeframe)) {
            Some(candles) => candles.to_vec(),
            None => self.fetch_or_empty(symbol, timeframe).await,
        }
    }

    async fn fetch_or_empty(&self, symbol: &str, timeframe: Timeframe) -> Vec<Candle> {
        match self.source.fetch_candles(symbol, timeframe).await {
            Ok(candles) => candles,
            Err(e) => {
                warn!(symbol, %timeframe, error = %e, "Candle fetch failed, treating as empty");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowvalue_core::Currency;
    use flowvalue_data::MemoryCandleSource;

    fn flat(n: i64, price: f64, step: i64) -> Vec<Candle> {
        (0..n).map(|i| Candle::flat(i * step, price)).collect()
    }

    #[tokio::test]
    async fn invalid_params_are_rejected() {
        let mut params = SnapshotParams::default();
        params.winsor_sigma = 0.0;
        let engine = SnapshotEngine::new(MemoryCandleSource::new(), params);
        assert!(engine.compute_snapshot(&[]).await.is_err());
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let engine = SnapshotEngine::new(MemoryCandleSource::new(), SnapshotParams::default());
        let a = AssetDef::new("A", "A", "EQ", "A", Currency::Usd);
        assert!(engine.compute_snapshot(&[a.clone(), a]).await.is_err());
    }

    #[tokio::test]
    async fn empty_universe_is_empty_snapshot() {
        let engine = SnapshotEngine::new(MemoryCandleSource::new(), SnapshotParams::default());
        let snapshot = engine.compute_snapshot(&[]).await.unwrap();
        assert!(snapshot.items.is_empty());
    }

    #[tokio::test]
    async fn override_is_matched_by_symbol() {
        let engine = SnapshotEngine::new(MemoryCandleSource::new(), SnapshotParams::default());
        let asset = AssetDef::new("SEC", "Sector", "INDEX", "SECTOR:SEC", Currency::Usd);
        let overrides: HashMap<String, CandleOverride> = [(
            "SECTOR:SEC".to_string(),
            CandleOverride {
                daily: flat(5, 10.0, 86_400),
                weekly: flat(2, 10.0, 7 * 86_400),
            },
        )]
        .into_iter()
        .collect();

        let loaded = engine.load_series(&[asset], &overrides).await;
        assert_eq!(loaded.daily["SEC"].len(), 5);
        assert_eq!(loaded.weekly["SEC"].len(), 2);
    }

    #[tokio::test]
    async fn override_by_id_replaces_source_candles() {
        let source = MemoryCandleSource::new()
            .with_series("SPY", Timeframe::Daily, flat(3, 400.0, 86_400))
            .with_series("SPY", Timeframe::Weekly, flat(3, 400.0, 7 * 86_400));
        let engine = SnapshotEngine::new(source, SnapshotParams::default());
        let asset = AssetDef::new("SPX", "S&P 500", "EQ", "SPY", Currency::Usd);
        let overrides: HashMap<String, CandleOverride> = [(
            "SPX".to_string(),
            CandleOverride {
                daily: flat(6, 1.0, 86_400),
                weekly: Vec::new(),
            },
        )]
        .into_iter()
        .collect();

        let loaded = engine.load_series(&[asset], &overrides).await;
        assert_eq!(loaded.daily["SPX"].len(), 6);
        assert!(loaded.weekly["SPX"].is_empty());
    }

    #[tokio::test]
    async fn jpy_asset_uses_fx_source() {
        let source = MemoryCandleSource::new()
            .with_series("USDJPY=X", Timeframe::Daily, flat(3, 100.0, 86_400))
            .with_series("USDJPY=X", Timeframe::Weekly, flat(1, 200.0, 86_400))
            .with_series("^N225", Timeframe::Daily, flat(3, 40_000.0, 86_400))
            .with_series("^N225", Timeframe::Weekly, flat(1, 40_000.0, 86_400));
        let engine = SnapshotEngine::new(source, SnapshotParams::default());
        let asset = AssetDef::new("NIKKEI", "Nikkei", "EQ", "^N225", Currency::Jpy).with_jpy_conversion();

        let loaded = engine.load_series(&[asset], &HashMap::new()).await;
        assert_eq!(loaded.daily["NIKKEI"][0].price, Some(400.0));
        assert_eq!(loaded.weekly["NIKKEI"][0].price, Some(200.0));
    }
}
