//! Synthetic sector indices assembled from a close-price history file.
//!
//! Each sector becomes an extra universe member whose daily and weekly candles
//! are injected as overrides, bypassing the candle source. Session dates are
//! stamped at 15:00 JST, the Tokyo close.

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone};
use flowvalue_core::{AssetDef, Candle, CandleOverride, Currency};
use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

const JST_OFFSET_SECS: i32 = 9 * 3600;
const SESSION_CLOSE_HOUR: u32 = 15;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectorHistory {
    #[serde(default)]
    pub sectors: Vec<Sector>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sector {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "nameJa")]
    pub name_ja: Option<String>,
    #[serde(default, alias = "nameEn")]
    pub name_en: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "jquantsCode")]
    pub qcode: Option<String>,
    #[serde(default)]
    pub series: Vec<SectorPoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectorPoint {
    #[serde(default)]
    pub date: String,
    #[serde(default = "nan", deserialize_with = "loose_f64")]
    pub close: f64,
}

const fn nan() -> f64 {
    f64::NAN
}

/// Accepts numbers and numeric strings; anything else becomes NaN.
fn loose_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    })
}

impl Sector {
    /// Display name: Japanese name, then English name, then the id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        [&self.name_ja, &self.name_en, &self.name]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
            .unwrap_or(self.id.as_str())
    }
}

impl SectorHistory {
    /// Parses a history document, dropping points without a date or a finite close.
    ///
    /// # Errors
    /// Returns an error if the document is not valid JSON of the expected shape.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut history: Self = serde_json::from_str(json).context("Invalid sector history payload")?;
        for sector in &mut history.sectors {
            sector.series.retain(|p| !p.date.is_empty() && p.close.is_finite());
        }
        Ok(history)
    }

    /// Loads a history document from disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read sector history: {}", path.display()))?;
        Self::from_json_str(&json)
    }
}

/// Extra universe members plus their injected candles.
#[derive(Debug, Clone, Default)]
pub struct SectorOverrides {
    pub assets: Vec<AssetDef>,
    pub overrides: HashMap<String, CandleOverride>,
}

/// Builds one JPY-denominated `INDEX` asset per sector with usable history.
#[must_use]
pub fn build_overrides(history: &SectorHistory) -> SectorOverrides {
    let mut out = SectorOverrides::default();

    for sector in &history.sectors {
        if sector.id.is_empty() {
            continue;
        }
        let daily = daily_candles(&sector.series);
        if daily.is_empty() {
            tracing::debug!(sector = %sector.id, "Skipping sector without usable points");
            continue;
        }
        let weekly = daily_to_weekly(&daily);

        out.overrides
            .insert(sector.id.clone(), CandleOverride { daily, weekly });
        out.assets.push(
            AssetDef::new(
                sector.id.clone(),
                sector.display_name(),
                "INDEX",
                format!("SECTOR:{}", sector.id),
                Currency::Jpy,
            )
            .with_jpy_conversion(),
        );
    }

    tracing::info!("Built overrides for {} sectors", out.assets.len());
    out
}

/// Parses `YYYY-MM-DD` (also `/` or `.` separated) as the Tokyo close, in epoch seconds.
#[must_use]
pub fn parse_session_date(date: &str) -> Option<i64> {
    let normalized = date.trim().replace(['.', '/'], "-");
    let day = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").ok()?;
    let local = day.and_hms_opt(SESSION_CLOSE_HOUR, 0, 0)?;
    let jst = FixedOffset::east_opt(JST_OFFSET_SECS)?;
    jst.from_local_datetime(&local).single().map(|dt| dt.timestamp())
}

/// Converts close points into flat daily candles, ascending by date.
#[must_use]
pub fn daily_candles(series: &[SectorPoint]) -> Vec<Candle> {
    let mut points: Vec<&SectorPoint> = series.iter().collect();
    points.sort_by(|a, b| a.date.cmp(&b.date));

    let mut candles: Vec<Candle> = points
        .into_iter()
        .filter(|p| p.close.is_finite())
        .filter_map(|p| parse_session_date(&p.date).map(|t| Candle::flat(t, p.close)))
        .collect();
    candles.sort_by_key(|c| c.time);
    candles
}

/// Aggregates daily candles by ISO week.
///
/// Open comes from the first day, close and time from the last day, high and
/// low are the extremes.
#[must_use]
pub fn daily_to_weekly(daily: &[Candle]) -> Vec<Candle> {
    let mut weeks: BTreeMap<(i32, u32), Candle> = BTreeMap::new();

    for candle in daily {
        let Some(date) = DateTime::from_timestamp(candle.time, 0) else {
            continue;
        };
        let week = date.iso_week();
        weeks
            .entry((week.year(), week.week()))
            .and_modify(|agg| {
                agg.high = agg.high.max(candle.high);
                agg.low = agg.low.min(candle.low);
                agg.close = candle.close;
                agg.time = candle.time;
            })
            .or_insert_with(|| candle.clone());
    }

    let mut out: Vec<Candle> = weeks.into_values().collect();
    out.sort_by_key(|c| c.time);
    out
}
