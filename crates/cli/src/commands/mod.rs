//! CLI commands for the Flow/Value snapshot engine.

pub mod fetch_data;
pub mod snapshot;
pub mod universe;

pub use fetch_data::{run_fetch_data, FetchDataArgs};
pub use snapshot::{run_snapshot, SnapshotArgs};
pub use universe::{run_universe, UniverseArgs};

use anyhow::Result;
use flowvalue_core::{AppConfig, ConfigLoader};

/// Loads configuration from an explicit file, or from the default locations.
pub(crate) fn load_config(path: Option<&str>) -> Result<AppConfig> {
    match path {
        Some(path) => ConfigLoader::load_from(path),
        None => ConfigLoader::load(),
    }
}

/// Joins table rows into newline-terminated text.
pub(crate) fn join_lines(lines: &[String]) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
