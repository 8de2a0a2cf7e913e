//! Candle sources for the Flow/Value snapshot engine.
//!
//! This crate provides:
//! - An HTTP chart client with rate limiting
//! - A TTL cache wrapper for any candle source
//! - CSV storage and a directory-backed candle source
//! - An in-memory candle source
//! - Sector-history overrides (synthetic sector indices)

pub mod cache;
pub mod chart_client;
pub mod csv_storage;
pub mod memory;
pub mod sector_history;

pub use cache::CachedCandleSource;
pub use chart_client::{parse_chart_response, ChartClient};
pub use csv_storage::{CsvCandleSource, CsvStorage};
pub use memory::MemoryCandleSource;
pub use sector_history::{build_overrides, daily_to_weekly, SectorHistory, SectorOverrides};
