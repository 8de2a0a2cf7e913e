use anyhow::{Context, Result};
use async_trait::async_trait;
use csv::{Reader, Writer};
use flowvalue_core::{Candle, CandleSource, SourceError, Timeframe};
use std::fs::File;
use std::path::{Path, PathBuf};

pub struct CsvStorage;

impl CsvStorage {
    /// Writes candles to a CSV file.
    ///
    /// Format: time,open,high,low,close,volume (an empty close is a missing close)
    ///
    /// # Errors
    /// Returns error if file cannot be created or writing fails
    pub fn write_candles(path: &Path, candles: &[Candle]) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        let mut writer = Writer::from_writer(file);

        // Sort candles by time (ascending) so readers can rely on order
        let mut sorted = candles.to_vec();
        sorted.sort_by_key(|c| c.time);

        for candle in &sorted {
            writer.serialize(candle)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Reads candles written by [`CsvStorage::write_candles`].
    ///
    /// # Errors
    /// Returns error if the file cannot be opened or a row does not parse
    pub fn read_candles(path: &Path) -> Result<Vec<Candle>> {
        let mut reader = Reader::from_path(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

        let mut candles = Vec::new();
        for record in reader.deserialize() {
            let candle: Candle = record.with_context(|| format!("Bad candle row in {}", path.display()))?;
            candles.push(candle);
        }

        candles.sort_by_key(|c| c.time);
        Ok(candles)
    }

    /// File name used for a symbol/timeframe pair, e.g. `_GSPC_D.csv` for `^GSPC`.
    #[must_use]
    pub fn file_name(symbol: &str, timeframe: Timeframe) -> String {
        let safe: String = symbol
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
            .collect();
        format!("{safe}_{timeframe}.csv")
    }
}

/// Candle source reading `{dir}/{symbol}_{tf}.csv` files.
#[derive(Debug, Clone)]
pub struct CsvCandleSource {
    dir: PathBuf,
}

impl CsvCandleSource {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn path_for(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.dir.join(CsvStorage::file_name(symbol, timeframe))
    }
}

#[async_trait]
impl CandleSource for CsvCandleSource {
    async fn fetch_candles(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Candle>> {
        let path = self.path_for(symbol, timeframe);
        if !path.exists() {
            return Err(SourceError::UnknownSymbol(format!("{symbol} ({})", path.display())).into());
        }
        tokio::task::spawn_blocking(move || CsvStorage::read_candles(&path)).await?
    }

    fn name(&self) -> &str {
        "csv"
    }
}
