//! Market data types shared by candle sources and the snapshot engine.
//!
//! Prices are plain `f64`. A missing close is carried as `None` at the API
//! boundary and never coerced to zero.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candle timeframe understood by every candle source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    /// Daily bars
    #[serde(rename = "D")]
    Daily,
    /// Weekly bars
    #[serde(rename = "W")]
    Weekly,
    /// Monthly bars
    #[serde(rename = "M")]
    Monthly,
}

impl Timeframe {
    /// Returns the single-letter code used by the chart proxies.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "D",
            Self::Weekly => "W",
            Self::Monthly => "M",
        }
    }

    /// Returns the (range, interval) pair requested upstream for this timeframe.
    #[must_use]
    pub const fn range_interval(&self) -> (&'static str, &'static str) {
        match self {
            Self::Daily => ("1y", "1d"),
            Self::Weekly => ("5y", "1wk"),
            Self::Monthly => ("15y", "1mo"),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "D" | "1D" => Ok(Self::Daily),
            "W" | "1W" | "1WK" => Ok(Self::Weekly),
            "M" | "1MO" => Ok(Self::Monthly),
            _ => Err(anyhow!("Invalid timeframe: '{s}'. Valid values: D, W, M")),
        }
    }
}

/// OHLC candle with an epoch-second timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar timestamp in epoch seconds
    pub time: i64,
    #[serde(default)]
    pub open: f64,
    #[serde(default)]
    pub high: f64,
    #[serde(default)]
    pub low: f64,
    /// Closing price, `None` when the upstream omitted it
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default, alias = "value")]
    pub volume: f64,
}

impl Candle {
    /// Creates a flat candle where every price equals `close`.
    #[must_use]
    pub const fn flat(time: i64, close: f64) -> Self {
        Self {
            time,
            open: close,
            high: close,
            low: close,
            close: Some(close),
            volume: 0.0,
        }
    }

    /// Returns the close if it is present and finite.
    #[must_use]
    pub fn finite_close(&self) -> Option<f64> {
        self.close.filter(|c| c.is_finite())
    }
}

/// Quote currency of an asset's native price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Jpy,
    Eur,
}

impl Currency {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Jpy => "JPY",
            Self::Eur => "EUR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Conversion applied to a native price before cross-sectional comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PriceConversion {
    /// Divide by the USD/JPY rate
    Jpy,
}

/// Static definition of one universe member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDef {
    /// Unique key within a universe
    pub id: String,
    /// Display name
    pub name: String,
    /// Free-form asset class tag (FX, BOND, EQ, CMD, CRYPTO, REIT, INDEX)
    pub cls: String,
    /// Lookup key passed to the candle source
    pub symbol: String,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default, alias = "priceToUSD")]
    pub price_to_usd: Option<PriceConversion>,
}

impl AssetDef {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        cls: impl Into<String>,
        symbol: impl Into<String>,
        currency: Currency,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cls: cls.into(),
            symbol: symbol.into(),
            currency,
            price_to_usd: None,
        }
    }

    /// Marks this asset as JPY-denominated, converted to USD before scoring.
    #[must_use]
    pub fn with_jpy_conversion(mut self) -> Self {
        self.currency = Currency::Jpy;
        self.price_to_usd = Some(PriceConversion::Jpy);
        self
    }
}

/// Precomputed candles injected for one asset, bypassing the candle source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandleOverride {
    pub daily: Vec<Candle>,
    pub weekly: Vec<Candle>,
}

impl CandleOverride {
    /// Returns the candles for a timeframe. Monthly overrides are not supported.
    #[must_use]
    pub fn for_timeframe(&self, timeframe: Timeframe) -> Option<&[Candle]> {
        match timeframe {
            Timeframe::Daily => Some(&self.daily),
            Timeframe::Weekly => Some(&self.weekly),
            Timeframe::Monthly => None,
        }
    }
}
