use crate::market::AssetDef;
use crate::params::SnapshotParams;
use crate::universe::default_universe;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub snapshot: SnapshotParams,
    pub universe: Vec<AssetDef>,
    pub source: SourceConfig,
    pub trails: TrailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL of the chart endpoint (without the symbol path)
    pub base_url: String,
    pub requests_per_second: u32,
    pub user_agent: String,
    /// Symbol of the USD/JPY rate used to convert JPY listings
    pub fx_symbol: String,
    /// USD/JPY rate used when no observation precedes a candle
    pub fx_fallback_rate: f64,
    pub cache_ttl_daily_secs: u64,
    pub cache_ttl_long_secs: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    pub months_back: usize,
    /// Daily grid points between consecutive trail samples
    pub step: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            snapshot: SnapshotParams::default(),
            universe: default_universe(),
            source: SourceConfig::default(),
            trails: TrailConfig::default(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            requests_per_second: 5,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
            fx_symbol: "USDJPY=X".to_string(),
            fx_fallback_rate: 150.0,
            cache_ttl_daily_secs: 15 * 60,
            cache_ttl_long_secs: 2 * 60 * 60,
        }
    }
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            months_back: 6,
            step: 21,
        }
    }
}
