//! Currency normalization of candle closes into USD price series.

use crate::align::{PricePoint, Series};
use flowvalue_core::{AssetDef, Candle, PriceConversion};

/// USD/JPY rate used when no observation precedes a candle.
pub const DEFAULT_FALLBACK_RATE: f64 = 150.0;

/// Ascending USD/JPY observations, looked up by "latest at or before".
#[derive(Debug, Clone, PartialEq)]
pub struct FxRates {
    points: Vec<(i64, f64)>,
    fallback: f64,
}

impl FxRates {
    /// Builds a rate table from candles. Missing, non-finite and non-positive
    /// closes are skipped.
    #[must_use]
    pub fn from_candles(candles: &[Candle], fallback: f64) -> Self {
        let mut points: Vec<(i64, f64)> = candles
            .iter()
            .filter_map(|c| c.finite_close().filter(|r| *r > 0.0).map(|r| (c.time, r)))
            .collect();
        points.sort_by_key(|(t, _)| *t);
        Self { points, fallback }
    }

    /// Table with no observations, always answering the fallback rate.
    #[must_use]
    pub const fn fallback_only(fallback: f64) -> Self {
        Self {
            points: Vec::new(),
            fallback,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent rate at or before `time`, else the fallback rate.
    #[must_use]
    pub fn rate_at(&self, time: i64) -> f64 {
        let idx = self.points.partition_point(|(t, _)| *t <= time);
        idx.checked_sub(1)
            .map_or(self.fallback, |i| self.points[i].1)
    }
}

/// Converts an asset's candles into a USD price series.
///
/// A missing close stays missing. JPY-flagged assets are divided by the
/// USD/JPY rate in effect at each candle's time.
#[must_use]
pub fn to_usd_series(candles: &[Candle], asset: &AssetDef, fx: &FxRates) -> Series {
    candles
        .iter()
        .map(|candle| {
            let price = candle.finite_close().map(|close| match asset.price_to_usd {
                Some(PriceConversion::Jpy) => close / fx.rate_at(candle.time),
                None => close,
            });
            PricePoint::new(candle.time, price)
        })
        .collect()
}

/// Number of usable prices in a converted series.
#[must_use]
pub fn finite_count(series: &Series) -> usize {
    series
        .iter()
        .filter(|p| p.price.is_some_and(f64::is_finite))
        .count()
}
