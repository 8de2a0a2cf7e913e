//! Snapshot assembly: composite score, percentile ranks, quadrants and A-rank.

use crate::stats::{percentile_rank, sorted_finite};
use flowvalue_core::AssetDef;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Flow percentile at or above which an asset counts as strong.
pub const STRONG_FLOW_PCTL: u8 = 80;
/// Flow percentile below which an asset counts as weak.
pub const WEAK_FLOW_PCTL: u8 = 20;
/// Value percentile at or above which an asset counts as cheap.
pub const CHEAP_VALUE_PCTL: u8 = 60;
/// Value percentile below which an asset counts as rich.
pub const RICH_VALUE_PCTL: u8 = 40;

/// Regime quadrant derived from flow and value percentiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    /// Strong and cheap
    Q1,
    /// Strong and rich
    Q2,
    /// Weak but cheap
    Q3,
    /// Weak and rich
    Q4,
    #[serde(rename = "NA")]
    Na,
}

impl Quadrant {
    /// Classifies a percentile pair. First matching rule wins; a missing
    /// percentile on either axis gives [`Quadrant::Na`].
    #[must_use]
    pub fn classify(f_pctl: Option<u8>, v_pctl: Option<u8>) -> Self {
        let (Some(f), Some(v)) = (f_pctl, v_pctl) else {
            return Self::Na;
        };

        if f >= STRONG_FLOW_PCTL && v >= CHEAP_VALUE_PCTL {
            Self::Q1
        } else if f >= STRONG_FLOW_PCTL && v < RICH_VALUE_PCTL {
            Self::Q2
        } else if f < WEAK_FLOW_PCTL && v >= CHEAP_VALUE_PCTL {
            Self::Q3
        } else if f < WEAK_FLOW_PCTL && v < RICH_VALUE_PCTL {
            Self::Q4
        } else {
            Self::Na
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Q4 => "Q4",
            Self::Na => "NA",
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Per-asset row of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotItem {
    pub id: String,
    pub name: String,
    pub cls: String,
    pub currency: String,
    /// Latest aligned price in USD
    pub last_price: Option<f64>,
    /// Latest smoothed relative price
    pub rp: Option<f64>,
    #[serde(rename = "F")]
    pub flow: Option<f64>,
    #[serde(rename = "V")]
    pub value: Option<f64>,
    #[serde(rename = "A")]
    pub composite: Option<f64>,
    pub f_pctl: Option<u8>,
    pub v_pctl: Option<u8>,
    /// 1-based rank by composite, descending
    pub a_rank: Option<usize>,
    pub quadrant: Quadrant,
}

/// Scores computed for one asset before cross-sectional ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AssetScores {
    pub last_price: Option<f64>,
    pub rp: Option<f64>,
    pub flow: Option<f64>,
    pub value: Option<f64>,
}

/// `A = lambda * F + (1 - lambda) * V`, defined only when both inputs are.
#[must_use]
pub fn composite(flow: Option<f64>, value: Option<f64>, lambda: f64) -> Option<f64> {
    let (f, v) = (flow?, value?);
    Some(lambda * f + (1.0 - lambda) * v).filter(|a| a.is_finite())
}

/// Builds snapshot items in universe order.
///
/// Percentiles are taken over the finite values of each axis across the
/// universe. Assets missing from `scores` get an all-null row.
#[must_use]
pub fn assemble_items(
    universe: &[AssetDef],
    scores: &BTreeMap<String, AssetScores>,
    lambda: f64,
) -> Vec<SnapshotItem> {
    let score_of = |asset: &AssetDef| scores.get(&asset.id).copied().unwrap_or_default();

    let flows: Vec<f64> = universe.iter().filter_map(|a| score_of(a).flow).collect();
    let values: Vec<f64> = universe.iter().filter_map(|a| score_of(a).value).collect();
    let sorted_flows = sorted_finite(&flows);
    let sorted_values = sorted_finite(&values);

    let mut items: Vec<SnapshotItem> = universe
        .iter()
        .map(|asset| {
            let s = score_of(asset);
            let f_pctl = s.flow.and_then(|f| percentile_rank(&sorted_flows, f));
            let v_pctl = s.value.and_then(|v| percentile_rank(&sorted_values, v));

            SnapshotItem {
                id: asset.id.clone(),
                name: asset.name.clone(),
                cls: asset.cls.clone(),
                currency: asset.currency.as_str().to_string(),
                last_price: s.last_price,
                rp: s.rp,
                flow: s.flow,
                value: s.value,
                composite: composite(s.flow, s.value, lambda),
                f_pctl,
                v_pctl,
                a_rank: None,
                quadrant: Quadrant::classify(f_pctl, v_pctl),
            }
        })
        .collect();

    assign_composite_ranks(&mut items);
    items
}

/// Ranks items by composite descending. Items without a composite keep `None`
/// and do not consume a rank. Ties keep universe order.
pub fn assign_composite_ranks(items: &mut [SnapshotItem]) {
    let mut order: Vec<(usize, f64)> = items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| item.composite.map(|a| (i, a)))
        .collect();
    order.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    for (rank, (i, _)) in order.into_iter().enumerate() {
        items[i].a_rank = Some(rank + 1);
    }
}
