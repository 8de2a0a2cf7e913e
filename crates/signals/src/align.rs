//! Multi-series alignment onto a shared time grid.
//!
//! The grid is the sorted union of every input timestamp. Each asset is
//! walked once with a forward pointer, carrying its last observed price
//! forward. Points before an asset's first observation take that first value,
//! so a late listing does not leave NaN in the cross-sectional mean. An asset
//! with no observations stays NaN throughout.

use std::collections::{BTreeMap, BTreeSet};

/// One observation of a currency-normalized price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    /// Epoch seconds
    pub time: i64,
    /// `None` when the close was missing
    pub price: Option<f64>,
}

impl PricePoint {
    #[must_use]
    pub const fn new(time: i64, price: Option<f64>) -> Self {
        Self { time, price }
    }
}

/// Ascending price observations for one asset.
pub type Series = Vec<PricePoint>;

/// Series keyed by asset id.
pub type SeriesMap = BTreeMap<String, Series>;

/// Per-asset values aligned 1:1 with a grid, NaN where missing.
pub type PriceMatrix = BTreeMap<String, Vec<f64>>;

/// Output of [`align_forward_fill`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedPrices {
    /// Strictly ascending union of all input timestamps
    pub grid: Vec<i64>,
    pub filled: PriceMatrix,
}

impl AlignedPrices {
    #[must_use]
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Index of the last grid point, `None` for an empty grid.
    #[must_use]
    pub fn last_index(&self) -> Option<usize> {
        self.grid.len().checked_sub(1)
    }
}

/// Aligns every series onto the union grid with forward fill.
///
/// Input series must be ascending by time.
#[must_use]
pub fn align_forward_fill(series: &SeriesMap) -> AlignedPrices {
    let grid: Vec<i64> = series
        .values()
        .flat_map(|s| s.iter().map(|p| p.time))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let filled = series
        .iter()
        .map(|(id, points)| (id.clone(), fill_row(&grid, points)))
        .collect();

    AlignedPrices { grid, filled }
}

fn fill_row(grid: &[i64], points: &[PricePoint]) -> Vec<f64> {
    let mut row = Vec::with_capacity(grid.len());
    let mut j = 0;
    let mut last: Option<f64> = None;

    for &t in grid {
        while j < points.len() && points[j].time <= t {
            if let Some(price) = points[j].price.filter(|p| p.is_finite()) {
                last = Some(price);
            }
            j += 1;
        }
        row.push(last.unwrap_or(f64::NAN));
    }

    if let Some(first) = row.iter().copied().find(|v| v.is_finite()) {
        for value in row.iter_mut().take_while(|v| !v.is_finite()) {
            *value = first;
        }
    }

    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: &[(i64, Option<f64>)]) -> Series {
        points.iter().map(|&(t, p)| PricePoint::new(t, p)).collect()
    }

    fn map(entries: Vec<(&str, Series)>) -> SeriesMap {
        entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn grid_is_sorted_union() {
        let input = map(vec![
            ("A", series(&[(1, Some(1.0)), (3, Some(3.0)), (5, Some(5.0))])),
            ("B", series(&[(2, Some(20.0)), (3, Some(30.0)), (6, Some(60.0))])),
        ]);
        let aligned = align_forward_fill(&input);
        assert_eq!(aligned.grid, vec![1, 2, 3, 5, 6]);
        assert!(aligned.filled.values().all(|row| row.len() == aligned.grid.len()));
    }

    #[test]
    fn forward_fills_without_interpolation() {
        let input = map(vec![
            ("A", series(&[(1, Some(1.0)), (4, Some(4.0))])),
            ("B", series(&[(1, Some(9.0)), (2, Some(9.0)), (3, Some(9.0)), (4, Some(9.0))])),
        ]);
        let aligned = align_forward_fill(&input);
        assert_eq!(aligned.filled["A"], vec![1.0, 1.0, 1.0, 4.0]);
    }

    #[test]
    fn leading_gap_takes_first_observation() {
        let input = map(vec![
            ("A", series(&[(3, Some(3.0)), (4, Some(4.0))])),
            ("B", series(&[(1, Some(1.0)), (2, Some(2.0)), (3, Some(3.0)), (4, Some(4.0))])),
        ]);
        let aligned = align_forward_fill(&input);
        assert_eq!(aligned.filled["A"], vec![3.0, 3.0, 3.0, 4.0]);
    }

    #[test]
    fn missing_price_carries_previous_value() {
        let input = map(vec![("A", series(&[(1, Some(1.0)), (2, None), (3, Some(3.0))]))]);
        let aligned = align_forward_fill(&input);
        assert_eq!(aligned.filled["A"], vec![1.0, 1.0, 3.0]);
    }

    #[test]
    fn empty_asset_is_nan_not_zero() {
        let input = map(vec![
            ("A", series(&[(1, Some(1.0)), (2, Some(2.0))])),
            ("B", Series::new()),
            ("C", series(&[(1, None)])),
        ]);
        let aligned = align_forward_fill(&input);
        assert!(aligned.filled["B"].iter().all(|v| v.is_nan()));
        assert!(aligned.filled["C"].iter().all(|v| v.is_nan()));
        assert_eq!(aligned.filled["B"].len(), 2);
    }

    #[test]
    fn empty_input_gives_empty_grid() {
        let aligned = align_forward_fill(&SeriesMap::new());
        assert!(aligned.is_empty());
        assert_eq!(aligned.last_index(), None);
    }
}
