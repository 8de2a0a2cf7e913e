//! Numeric helpers shared by the scorers.
//!
//! NaN marks a missing value inside these loops. Helpers that summarize a
//! slice return `Option` so callers decide how a degenerate input propagates.

/// Floor applied to prices before taking logs.
pub const MIN_PRICE: f64 = 1e-9;

/// Natural log of a price, floored at [`MIN_PRICE`]. Missing prices stay NaN.
#[must_use]
pub fn safe_ln(price: f64) -> f64 {
    if price.is_finite() {
        price.max(MIN_PRICE).ln()
    } else {
        f64::NAN
    }
}

/// Keeps only the finite values.
#[must_use]
pub fn finite_values<'a>(values: impl IntoIterator<Item = &'a f64>) -> Vec<f64> {
    values.into_iter().copied().filter(|v| v.is_finite()).collect()
}

/// Arithmetic mean, `None` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation, `None` for an empty slice.
#[must_use]
pub fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Spread, relative to the magnitude of the data, below which a standard
/// deviation is rounding noise rather than variation.
pub const DEGENERATE_SPREAD: f64 = 1e-10;

/// Largest absolute finite value, `0.0` when there is none.
#[must_use]
pub fn max_abs(values: &[f64]) -> f64 {
    values
        .iter()
        .filter(|v| v.is_finite())
        .fold(0.0, |acc: f64, v| acc.max(v.abs()))
}

/// Returns `Some(sd)` only when it can be used as a divisor for data of
/// magnitude `scale`.
///
/// The floor is [`DEGENERATE_SPREAD`] times `max(1, |scale|)`, so a series that
/// is constant or exactly linear in exact arithmetic stays degenerate at any
/// magnitude.
#[must_use]
pub fn usable_std(sd: Option<f64>, scale: f64) -> Option<f64> {
    let floor = DEGENERATE_SPREAD * scale.abs().max(1.0);
    sd.filter(|s| s.is_finite() && *s > floor)
}

/// Exponentially weighted moving average seeded with the first value.
///
/// `alpha = 1 - 0.5^(1/half_life)`, so a shock decays by half after
/// `half_life` periods.
#[must_use]
pub fn ewma(src: &[f64], half_life: f64) -> Vec<f64> {
    let Some(&first) = src.first() else {
        return Vec::new();
    };
    let alpha = 1.0 - (0.5_f64.ln() / half_life).exp();

    let mut out = Vec::with_capacity(src.len());
    let mut m = first;
    out.push(m);
    for &x in &src[1..] {
        m = alpha * x + (1.0 - alpha) * m;
        out.push(m);
    }
    out
}

/// Percentile rank (0-100) of `value` within ascending-sorted `sorted`.
///
/// Uses the index of the first element `>= value`, so tied values share the
/// lowest rank. A value above every element ranks at the top. A single-element
/// population ranks 100.
#[must_use]
pub fn percentile_rank(sorted: &[f64], value: f64) -> Option<u8> {
    let n = sorted.len();
    if n == 0 || !value.is_finite() {
        return None;
    }
    if n == 1 {
        return Some(100);
    }
    let idx = sorted.partition_point(|&x| x < value).min(n - 1);
    let pct = (idx as f64 / (n - 1) as f64 * 100.0).round();
    Some(pct.clamp(0.0, 100.0) as u8)
}

/// Sorts finite values ascending for use with [`percentile_rank`].
#[must_use]
pub fn sorted_finite<'a>(values: impl IntoIterator<Item = &'a f64>) -> Vec<f64> {
    let mut out = finite_values(values);
    out.sort_by(f64::total_cmp);
    out
}

/// Residuals `y - (b0 + b1 * x)` of the least-squares line through `ys`
/// against `x = 0..n`. Returns `None` for an empty input.
#[must_use]
pub fn trend_residuals(ys: &[f64]) -> Option<Vec<f64>> {
    let n = ys.len();
    let my = mean(ys)?;
    let mx = (n as f64 - 1.0) / 2.0;

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in ys.iter().enumerate() {
        let dx = i as f64 - mx;
        num += dx * (y - my);
        den += dx * dx;
    }
    let slope = if den > 0.0 { num / den } else { 0.0 };
    let intercept = my - slope * mx;

    Some(
        ys.iter()
            .enumerate()
            .map(|(i, y)| y - (intercept + slope * i as f64))
            .collect(),
    )
}
