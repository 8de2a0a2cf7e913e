//! Relative price against the universe's own equal-weight benchmark.
//!
//! `rp[i] = ln(p[i]) - mean_j(ln(p_j[i]))` where the mean runs over assets
//! with a finite price at `i`. With no finite price at `i` the benchmark is
//! NaN and so is every asset's relative price there.

use crate::align::PriceMatrix;
use crate::stats::{ewma, finite_values, mean, safe_ln};

/// Log of every aligned price.
#[must_use]
pub fn log_prices(filled: &PriceMatrix) -> PriceMatrix {
    filled
        .iter()
        .map(|(id, row)| (id.clone(), row.iter().copied().map(safe_ln).collect()))
        .collect()
}

/// Cross-sectional mean of log prices at each of `len` grid points.
#[must_use]
pub fn benchmark(log_prices: &PriceMatrix, len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let column = finite_values(log_prices.values().filter_map(|row| row.get(i)));
            mean(&column).unwrap_or(f64::NAN)
        })
        .collect()
}

/// Relative log price of every asset versus the universe benchmark.
#[must_use]
pub fn relative_prices(filled: &PriceMatrix, len: usize) -> PriceMatrix {
    let logs = log_prices(filled);
    let bench = benchmark(&logs, len);

    logs.into_iter()
        .map(|(id, row)| {
            let rp = row.iter().zip(&bench).map(|(x, g)| x - g).collect();
            (id, rp)
        })
        .collect()
}

/// Applies half-life EWMA smoothing to every row.
#[must_use]
pub fn smooth(rp: &PriceMatrix, half_life: f64) -> PriceMatrix {
    rp.iter()
        .map(|(id, row)| (id.clone(), ewma(row, half_life)))
        .collect()
}
