//! Snapshot parameters.
//!
//! Defaults reproduce the calibrated configuration: 20/63/252-period windows
//! weighted 0.5/0.35/0.15, composite weight 0.6 on flow, 3-sigma clipping and
//! a 10-period half-life on the relative-price smoother.

use crate::error::ParamsError;
use serde::{Deserialize, Serialize};

/// Flow lookback windows, in grid periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Windows {
    pub short: usize,
    pub mid: usize,
    pub long: usize,
}

impl Default for Windows {
    fn default() -> Self {
        Self {
            short: 20,
            mid: 63,
            long: 252,
        }
    }
}

impl Windows {
    /// Returns the windows in (short, mid, long) order.
    #[must_use]
    pub const fn as_array(&self) -> [usize; 3] {
        [self.short, self.mid, self.long]
    }
}

/// Blend weights applied to the per-window flow z-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub short: f64,
    pub mid: f64,
    pub long: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            short: 0.5,
            mid: 0.35,
            long: 0.15,
        }
    }
}

impl Weights {
    #[must_use]
    pub const fn as_array(&self) -> [f64; 3] {
        [self.short, self.mid, self.long]
    }

    #[must_use]
    pub fn sum(&self) -> f64 {
        self.short + self.mid + self.long
    }
}

/// Full parameter set for one snapshot computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotParams {
    pub windows: Windows,
    pub weights: Weights,
    /// Weight of F in the composite `A = λF + (1-λ)V`
    #[serde(rename = "lambda_AV", alias = "lambda_av")]
    pub lambda_av: f64,
    /// Cross-sectional z-score clip
    pub winsor_sigma: f64,
    /// Half-life in periods of the relative-price smoother
    pub ewma_half_life_rp: f64,
}

impl Default for SnapshotParams {
    fn default() -> Self {
        Self {
            windows: Windows::default(),
            weights: Weights::default(),
            lambda_av: 0.6,
            winsor_sigma: 3.0,
            ewma_half_life_rp: 10.0,
        }
    }
}

impl SnapshotParams {
    /// Validates parameter shapes.
    ///
    /// Weights that do not sum to one are accepted: they scale the magnitude
    /// of F. A warning is logged so the choice is visible.
    ///
    /// # Errors
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ParamsError> {
        let Windows { short, mid, long } = self.windows;
        for (name, window) in [("short", short), ("mid", mid), ("long", long)] {
            if window == 0 {
                return Err(ParamsError::ZeroWindow { name });
            }
        }
        if !(short <= mid && mid <= long) {
            return Err(ParamsError::WindowOrder { short, mid, long });
        }

        let Weights { short, mid, long } = self.weights;
        for (name, value) in [("short", short), ("mid", mid), ("long", long)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ParamsError::InvalidWeight { name, value });
            }
        }

        if !(0.0..=1.0).contains(&self.lambda_av) {
            return Err(ParamsError::LambdaOutOfRange(self.lambda_av));
        }
        if !self.winsor_sigma.is_finite() || self.winsor_sigma <= 0.0 {
            return Err(ParamsError::InvalidWinsorSigma(self.winsor_sigma));
        }
        if !self.ewma_half_life_rp.is_finite() || self.ewma_half_life_rp <= 0.0 {
            return Err(ParamsError::InvalidHalfLife(self.ewma_half_life_rp));
        }

        let total = self.weights.sum();
        if (total - 1.0).abs() > 1e-6 {
            tracing::warn!(
                weight_sum = total,
                "flow weights do not sum to 1; composite F is scaled by {total:.4}"
            );
        }

        Ok(())
    }
}
