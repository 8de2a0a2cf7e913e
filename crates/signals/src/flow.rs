//! Flow ("F"): multi-horizon, volatility-normalized relative momentum.
//!
//! For each window `L` an asset's move `rp[t] - rp[t-L]` is divided by the
//! population standard deviation of its one-period changes over the same
//! window, then z-scored across the universe and clipped to
//! `±winsor_sigma`. F is the weighted sum of the three window z-scores; a
//! missing window makes F missing rather than re-weighting the others.

use crate::align::PriceMatrix;
use crate::stats::{finite_values, max_abs, mean, population_std, usable_std};
use flowvalue_core::SnapshotParams;
use std::collections::BTreeMap;

/// Volatility-normalized move of one series over `window` periods ending at `target`.
///
/// NaN when `target < window + 2`, when `target` is past the end of the
/// series, or when the window's volatility is zero or undefined.
#[must_use]
pub fn normalized_momentum(rp: &[f64], target: usize, window: usize) -> f64 {
    if window == 0 || target >= rp.len() || target < window + 2 {
        return f64::NAN;
    }

    let span = &rp[target - window..=target];
    let delta = rp[target] - rp[target - window];
    let diffs: Vec<f64> = span.windows(2).map(|pair| pair[1] - pair[0]).collect();

    match usable_std(population_std(&diffs), max_abs(span)) {
        Some(sigma) => delta / sigma,
        None => f64::NAN,
    }
}

/// Cross-sectionally standardized, winsorized momentum for one window.
///
/// Statistics use only the finite normalized values. If their spread is zero
/// or undefined every asset's z is NaN for this window.
#[must_use]
pub fn window_zscores(rp: &PriceMatrix, target: usize, window: usize, winsor_sigma: f64) -> BTreeMap<String, f64> {
    let raw: BTreeMap<String, f64> = rp
        .iter()
        .map(|(id, row)| (id.clone(), normalized_momentum(row, target, window)))
        .collect();

    let finite = finite_values(raw.values());
    let mu = mean(&finite);
    let sd = usable_std(population_std(&finite), max_abs(&finite));

    raw.into_iter()
        .map(|(id, m)| {
            let z = match (mu, sd) {
                (Some(mu), Some(sd)) => ((m - mu) / sd).clamp(-winsor_sigma, winsor_sigma),
                _ => f64::NAN,
            };
            (id, z)
        })
        .collect()
}

/// Flow score of every asset at `target`, `None` where any window is missing.
#[must_use]
pub fn compute_flow(rp: &PriceMatrix, target: usize, params: &SnapshotParams) -> BTreeMap<String, Option<f64>> {
    let windows = params.windows.as_array();
    let weights = params.weights.as_array();

    let by_window: Vec<BTreeMap<String, f64>> = windows
        .iter()
        .map(|&window| window_zscores(rp, target, window, params.winsor_sigma))
        .collect();

    rp.keys()
        .map(|id| {
            let flow: f64 = by_window
                .iter()
                .zip(weights)
                .map(|(z, w)| z.get(id).copied().unwrap_or(f64::NAN) * w)
                .sum();
            (id.clone(), Some(flow).filter(|f| f.is_finite()))
        })
        .collect()
}
