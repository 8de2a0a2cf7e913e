//! Core types for the Flow/Value snapshot engine.
//!
//! This crate provides:
//! - Market data types (`Candle`, `Timeframe`, `AssetDef`)
//! - Snapshot parameters and their validation
//! - Application configuration and its figment loader
//! - The `CandleSource` trait implemented by every data source

pub mod config;
pub mod config_loader;
pub mod error;
pub mod market;
pub mod params;
pub mod traits;
pub mod universe;

pub use config::{AppConfig, SourceConfig, TrailConfig};
pub use config_loader::ConfigLoader;
pub use error::{ParamsError, SourceError};
pub use market::{AssetDef, Candle, CandleOverride, Currency, PriceConversion, Timeframe};
pub use params::{SnapshotParams, Weights, Windows};
pub use traits::CandleSource;
pub use universe::{default_universe, validate_universe};
