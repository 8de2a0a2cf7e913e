//! I/O-free snapshot pipeline over already converted price series.
//!
//! Daily series drive flow, weekly series drive value. Both entry points are
//! deterministic: identical inputs give bit-identical outputs.

use crate::align::{align_forward_fill, SeriesMap};
use crate::flow::compute_flow;
use crate::fx::finite_count;
use crate::relative::{relative_prices, smooth};
use crate::snapshot::{assemble_items, AssetScores, SnapshotItem};
use crate::trails::SnapshotTrails;
use crate::value::compute_value;
use flowvalue_core::{AssetDef, SnapshotParams};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Result of a plain snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub items: Vec<SnapshotItem>,
    pub params: SnapshotParams,
}

/// Snapshot plus historical trails and per-asset data counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotWithTrails {
    pub items: Vec<SnapshotItem>,
    pub trails: SnapshotTrails,
    pub meta: SnapshotMeta,
    pub params: SnapshotParams,
}

/// Usable daily and weekly prices for one asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesCounts {
    #[serde(rename = "dLen")]
    pub daily: usize,
    #[serde(rename = "wLen")]
    pub weekly: usize,
}

/// Diagnostic counts keyed by asset id.
pub type SnapshotMeta = BTreeMap<String, SeriesCounts>;

/// Scores every asset present in either series map at the last point of each grid.
#[must_use]
pub fn score_series(
    params: &SnapshotParams,
    daily: &SeriesMap,
    weekly: &SeriesMap,
) -> BTreeMap<String, AssetScores> {
    let mut scores: BTreeMap<String, AssetScores> = daily
        .keys()
        .chain(weekly.keys())
        .map(|id| (id.clone(), AssetScores::default()))
        .collect();

    let aligned = align_forward_fill(daily);
    if let Some(last) = aligned.last_index() {
        let rp = smooth(&relative_prices(&aligned.filled, aligned.len()), params.ewma_half_life_rp);
        let flows = compute_flow(&rp, last, params);

        for (id, score) in &mut scores {
            score.last_price = aligned
                .filled
                .get(id)
                .and_then(|row| row.get(last))
                .copied()
                .filter(|p| p.is_finite());
            score.rp = rp
                .get(id)
                .and_then(|row| row.get(last))
                .copied()
                .filter(|v| v.is_finite());
            score.flow = flows.get(id).copied().flatten();
        }
    } else {
        tracing::debug!("Daily grid is empty, flow undefined for every asset");
    }

    let aligned_w = align_forward_fill(weekly);
    let rp_w = relative_prices(&aligned_w.filled, aligned_w.len());
    let values = compute_value(&rp_w, aligned_w.last_index());
    for (id, value) in values {
        if let Some(score) = scores.get_mut(&id) {
            score.value = value;
        }
    }

    scores
}

/// Computes snapshot items for `universe` from converted daily and weekly series.
///
/// Assets absent from both maps appear with every score null.
#[must_use]
pub fn snapshot_from_series(
    params: &SnapshotParams,
    universe: &[AssetDef],
    daily: &SeriesMap,
    weekly: &SeriesMap,
) -> Vec<SnapshotItem> {
    let scores = score_series(params, daily, weekly);
    assemble_items(universe, &scores, params.lambda_av)
}

/// Counts usable daily and weekly prices for every universe member.
#[must_use]
pub fn series_counts(universe: &[AssetDef], daily: &SeriesMap, weekly: &SeriesMap) -> SnapshotMeta {
    let ids: BTreeSet<&str> = universe.iter().map(|a| a.id.as_str()).collect();
    ids.into_iter()
        .map(|id| {
            let counts = SeriesCounts {
                daily: daily.get(id).map_or(0, finite_count),
                weekly: weekly.get(id).map_or(0, finite_count),
            };
            (id.to_string(), counts)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{PricePoint, Series};
    use crate::snapshot::Quadrant;
    use flowvalue_core::Currency;

    const DAY: i64 = 86_400;

    fn series(prices: impl IntoIterator<Item = f64>) -> Series {
        prices
            .into_iter()
            .enumerate()
            .map(|(i, p)| PricePoint::new(i as i64 * DAY, Some(p)))
            .collect()
    }

    fn asset(id: &str) -> AssetDef {
        AssetDef::new(id, id, "EQ", id, Currency::Usd)
    }

    #[test]
    fn empty_universe_gives_empty_items() {
        let items = snapshot_from_series(&SnapshotParams::default(), &[], &SeriesMap::new(), &SeriesMap::new());
        assert!(items.is_empty());
    }

    #[test]
    fn short_history_leaves_scores_null() {
        let daily: SeriesMap = [
            ("A".to_string(), series((0..30).map(|i| 100.0 + f64::from(i)))),
            ("B".to_string(), series((0..30).map(|_| 100.0))),
        ]
        .into_iter()
        .collect();
        let universe = vec![asset("A"), asset("B")];

        let items = snapshot_from_series(&SnapshotParams::default(), &universe, &daily, &SeriesMap::new());
        for item in &items {
            assert_eq!(item.flow, None);
            assert_eq!(item.value, None);
            assert_eq!(item.composite, None);
            assert_eq!(item.quadrant, Quadrant::Na);
            assert!(item.last_price.is_some());
        }
    }

    #[test]
    fn counts_only_finite_prices() {
        let mut a = series([1.0, 2.0, 3.0]);
        a[1].price = None;
        let daily: SeriesMap = [("A".to_string(), a)].into_iter().collect();
        let weekly: SeriesMap = [("A".to_string(), series([1.0]))].into_iter().collect();

        let meta = series_counts(&[asset("A"), asset("B")], &daily, &weekly);
        assert_eq!(meta["A"], SeriesCounts { daily: 2, weekly: 1 });
        assert_eq!(meta["B"], SeriesCounts::default());
    }

    #[test]
    fn meta_json_uses_short_names() {
        let json = serde_json::to_value(SeriesCounts { daily: 3, weekly: 1 }).unwrap();
        assert_eq!(json["dLen"], 3);
        assert_eq!(json["wLen"], 1);
    }
}
