use flowvalue_core::{AssetDef, Candle, ConfigLoader, Currency, Timeframe};
use flowvalue_data::{CsvCandleSource, CsvStorage};
use flowvalue_signals::{Quadrant, SnapshotEngine};
use std::collections::HashMap;
use tempfile::TempDir;

const DAY: i64 = 86_400;

fn wavy(n: i64, step: i64, drift: f64, phase: f64) -> Vec<Candle> {
    (0..n)
        .map(|i| {
            let x = i as f64;
            let price = 50.0 * (drift * x + 0.005 * (x * 0.41 + phase).sin()).exp();
            Candle::flat(i * step, price)
        })
        .collect()
}

#[tokio::test]
async fn test_snapshot_from_csv_directory() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let dir = temp_dir.path();
    let universe = vec![
        AssetDef::new("UP", "Uptrend", "EQ", "UP", Currency::Usd),
        AssetDef::new("DOWN", "Downtrend", "EQ", "DOWN", Currency::Usd),
        AssetDef::new("SIDE", "Sideways", "CMD", "SIDE", Currency::Usd),
    ];
    for (asset, drift, phase) in [(&universe[0], 0.002, 0.0), (&universe[1], -0.002, 1.0), (&universe[2], 0.0, 2.0)] {
        let daily = wavy(320, DAY, drift, phase);
        let weekly = wavy(120, 7 * DAY, drift * 5.0, phase);
        CsvStorage::write_candles(&dir.join(CsvStorage::file_name(&asset.symbol, Timeframe::Daily)), &daily)
            .expect("Failed to write daily candles");
        CsvStorage::write_candles(&dir.join(CsvStorage::file_name(&asset.symbol, Timeframe::Weekly)), &weekly)
            .expect("Failed to write weekly candles");
    }

    let config = ConfigLoader::load_from_str("[trails]\nmonths_back = 3\nstep = 21\n").expect("Failed to load config");
    let engine = SnapshotEngine::from_config(CsvCandleSource::new(dir), &config);
    let result = engine
        .compute_snapshot_with_trails(&universe, config.trails.months_back, &HashMap::new())
        .await
        .expect("Snapshot failed");

    assert_eq!(result.items.len(), 3);
    let up = result.items.iter().find(|i| i.id == "UP").unwrap();
    let down = result.items.iter().find(|i| i.id == "DOWN").unwrap();
    assert!(up.flow.unwrap() > down.flow.unwrap());
    assert_eq!(up.f_pctl, Some(100));
    assert_eq!(down.f_pctl, Some(0));
    assert!(result.items.iter().all(|i| i.quadrant == Quadrant::classify(i.f_pctl, i.v_pctl)));
    assert_eq!(result.trails["UP"].len(), 4);
    assert_eq!(result.meta["SIDE"].daily, 320);

    let json = serde_json::to_value(&result).expect("Failed to serialize");
    assert!(json["items"][0].get("F").is_some());
    assert!(json["meta"]["UP"].get("dLen").is_some());
    assert_eq!(json["params"]["lambda_AV"], 0.6);
}
