//! Error types for parameter validation and candle retrieval.
//!
//! Data-quality problems (short histories, flat prices, failed fetches inside
//! a snapshot) are not errors; they surface as `None` scores.

use thiserror::Error;

/// Invalid snapshot parameters or universe definition.
#[derive(Debug, Error, PartialEq)]
pub enum ParamsError {
    /// A lookback window is zero.
    #[error("window '{name}' must be positive")]
    ZeroWindow {
        /// Window name (short, mid, long).
        name: &'static str,
    },

    /// Windows are not ordered short <= mid <= long.
    #[error("windows must satisfy short <= mid <= long, got {short}/{mid}/{long}")]
    WindowOrder {
        short: usize,
        mid: usize,
        long: usize,
    },

    /// A window weight is negative or not finite.
    #[error("weight '{name}' must be finite and non-negative, got {value}")]
    InvalidWeight {
        /// Weight name (short, mid, long).
        name: &'static str,
        value: f64,
    },

    /// Composite lambda outside [0, 1].
    #[error("lambda_AV must be within [0, 1], got {0}")]
    LambdaOutOfRange(f64),

    /// Winsorization bound is not a positive finite number.
    #[error("winsor_sigma must be positive, got {0}")]
    InvalidWinsorSigma(f64),

    /// EWMA half-life is not a positive finite number.
    #[error("ewma_half_life_rp must be positive, got {0}")]
    InvalidHalfLife(f64),

    /// Two universe members share an id.
    #[error("duplicate asset id in universe: {0}")]
    DuplicateAssetId(String),
}

/// Errors raised by candle sources.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Upstream responded with a non-success status.
    #[error("upstream {status_code}: {message}")]
    Upstream {
        /// HTTP status code.
        status_code: u16,
        /// Truncated response body.
        message: String,
    },

    /// Payload could not be interpreted as candles.
    #[error("malformed candle payload for {symbol}: {reason}")]
    Malformed { symbol: String, reason: String },

    /// Symbol not known to this source.
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),
}

impl SourceError {
    /// Creates an upstream error, keeping at most 200 characters of the body.
    pub fn upstream(status_code: u16, body: &str) -> Self {
        Self::Upstream {
            status_code,
            message: body.chars().take(200).collect(),
        }
    }

    /// Creates a malformed-payload error.
    pub fn malformed(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }
}
