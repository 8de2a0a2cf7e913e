//! Historical (F, V) trails.
//!
//! Each sample re-runs the whole pipeline on series truncated at the sample's
//! daily timestamp, so alignment, smoothing and both scorers see only data
//! available at that time. The weekly cutoff is the last weekly point at or
//! before the sample time.

use crate::align::{align_forward_fill, SeriesMap};
use crate::pipeline::score_series;
use flowvalue_core::SnapshotParams;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Daily grid points between trail samples, roughly one trading month.
pub const DEFAULT_TRAIL_STEP: usize = 21;

/// Flow and value of one asset at one historical sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    /// Sample time in epoch seconds
    pub t: i64,
    #[serde(rename = "F")]
    pub flow: Option<f64>,
    #[serde(rename = "V")]
    pub value: Option<f64>,
}

/// Trail points per asset id, oldest first.
pub type SnapshotTrails = BTreeMap<String, Vec<TrailPoint>>;

/// Sample indices `last - k * step` for `k = months_back..=0`, oldest first.
///
/// Indices before the start of the grid are dropped. The present index is
/// always the final sample.
#[must_use]
pub fn sample_indices(last: usize, months_back: usize, step: usize) -> Vec<usize> {
    let step = step.max(1);
    (0..=months_back)
        .rev()
        .filter_map(|k| k.checked_mul(step).and_then(|back| last.checked_sub(back)))
        .collect()
}

/// Keeps only the points at or before `time`.
#[must_use]
pub fn truncate_series(series: &SeriesMap, time: i64) -> SeriesMap {
    series
        .iter()
        .map(|(id, points)| {
            let end = points.partition_point(|p| p.time <= time);
            (id.clone(), points[..end].to_vec())
        })
        .collect()
}

/// Builds trails for every asset in the daily or weekly map.
///
/// With an empty daily grid every asset gets an empty trail.
#[must_use]
pub fn trails_from_series(
    params: &SnapshotParams,
    daily: &SeriesMap,
    weekly: &SeriesMap,
    months_back: usize,
    step: usize,
) -> SnapshotTrails {
    let mut trails: SnapshotTrails = daily
        .keys()
        .chain(weekly.keys())
        .map(|id| (id.clone(), Vec::new()))
        .collect();

    let grid = align_forward_fill(daily).grid;
    let Some(last) = grid.len().checked_sub(1) else {
        return trails;
    };

    let samples = sample_indices(last, months_back, step);
    for &ti in &samples {
        let t = grid[ti];
        let scores = score_series(params, &truncate_series(daily, t), &truncate_series(weekly, t));

        for (id, points) in &mut trails {
            let score = scores.get(id).copied().unwrap_or_default();
            points.push(TrailPoint {
                t,
                flow: score.flow,
                value: score.value,
            });
        }
    }

    tracing::debug!(samples = samples.len(), assets = trails.len(), "Computed trails");
    trails
}
