//! Cross-sectional Flow/Value snapshot engine.
//!
//! Pipeline: candles → USD series → forward-filled grid → relative price
//! versus the universe mean → flow (daily) and value (weekly) → percentile
//! ranks, quadrants and composite rank. Trails repeat the scoring at past
//! sample points on truncated inputs.

pub mod align;
pub mod engine;
pub mod flow;
pub mod fx;
pub mod pipeline;
pub mod relative;
pub mod snapshot;
pub mod stats;
pub mod trails;
pub mod value;

// Re-export the engine entry points
pub use engine::{FxSettings, LoadedSeries, SnapshotEngine};
pub use pipeline::{
    score_series, series_counts, snapshot_from_series, SeriesCounts, Snapshot, SnapshotMeta, SnapshotWithTrails,
};
pub use trails::{sample_indices, trails_from_series, SnapshotTrails, TrailPoint, DEFAULT_TRAIL_STEP};

// Re-export building blocks
pub use align::{align_forward_fill, AlignedPrices, PriceMatrix, PricePoint, Series, SeriesMap};
pub use flow::{compute_flow, normalized_momentum, window_zscores};
pub use fx::{to_usd_series, FxRates};
pub use relative::{relative_prices, smooth};
pub use snapshot::{assemble_items, composite, AssetScores, Quadrant, SnapshotItem};
pub use value::{compute_value, value_score, MIN_VALUE_OBSERVATIONS};
