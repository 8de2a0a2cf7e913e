//! Value ("V"): deviation of the weekly relative price from its own OLS trend.
//!
//! Positive V means the asset sits below its multi-year trend line.

use crate::align::PriceMatrix;
use crate::stats::{finite_values, max_abs, mean, population_std, trend_residuals, usable_std};
use std::collections::BTreeMap;

/// Minimum finite weekly observations needed for a trend fit.
pub const MIN_VALUE_OBSERVATIONS: usize = 40;

/// Value score for one weekly relative-price row, using points `0..=target`.
#[must_use]
pub fn value_score(rp: &[f64], target: usize) -> Option<f64> {
    let end = target.checked_add(1)?.min(rp.len());
    let ys = finite_values(&rp[..end]);
    if ys.len() < MIN_VALUE_OBSERVATIONS {
        return None;
    }

    let residuals = trend_residuals(&ys)?;
    let mu = mean(&residuals)?;
    let sd = usable_std(population_std(&residuals), max_abs(&ys))?;
    let latest = *residuals.last()?;

    Some(-(latest - mu) / sd).filter(|v| v.is_finite())
}

/// Value score of every asset at weekly index `target`.
///
/// A `None` target (no weekly point at or before the sample time) gives
/// `None` for every asset.
#[must_use]
pub fn compute_value(rp: &PriceMatrix, target: Option<usize>) -> BTreeMap<String, Option<f64>> {
    rp.iter()
        .map(|(id, row)| (id.clone(), target.and_then(|t| value_score(row, t))))
        .collect()
}
