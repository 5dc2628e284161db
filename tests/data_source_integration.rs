use std::fs;
use tempfile::TempDir;
use tradelogit::application::ml::PipelinePredictor;
use tradelogit::application::TrainingService;
use tradelogit::config::{BatchPolicy, DataSourceEnvConfig, DataSourceKind, TrainingEnvConfig};
use tradelogit::domain::ml::DerivationConfig;
use tradelogit::domain::types::{Bar, TradeRecord};
use tradelogit::infrastructure::persistence::Database;
use tradelogit::infrastructure::{DataSourceFactory, SqliteTradeDataSource};

fn trade(id: i64, result: Option<bool>) -> TradeRecord {
    TradeRecord {
        id,
        sma200_dist: 1.0,
        sma50_dist: 0.5,
        sma21_dist: 0.25,
        sma200_slope: 0.01,
        sma50_slope: 0.02,
        sma21_slope: 0.03,
        position: if id % 2 == 0 { "buy" } else { "sell" }.to_string(),
        bar_ratio: if id % 4 == 0 { 2.0 } else { 0.5 },
        num_of_reverse_bars: 1.0,
        bol_up_dist: 0.3,
        bol_down_dist: 0.7,
        result,
    }
}

fn bars(last: i64) -> Vec<Bar> {
    (1..=last)
        .map(|id| Bar::new(id, 1.0, 1.0 + 0.05 * ((id % 5) + 1) as f64))
        .collect()
}

#[tokio::test]
async fn test_sqlite_source_trains_and_predicts() {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite://{}", dir.path().join("db").join("mt4.db").display());

    {
        let db = Database::new(&url).await.unwrap();
        let seeder = SqliteTradeDataSource::new(db.pool.clone());
        seeder.save_bars(&bars(60)).await.unwrap();
        for id in 6..=59 {
            seeder.save_trade(&trade(id, Some(id % 4 == 0))).await.unwrap();
        }
        seeder.enqueue_trade(&trade(60, None)).await.unwrap();
    }

    let config = DataSourceEnvConfig {
        kind: DataSourceKind::Sqlite,
        database_url: url,
        ..DataSourceEnvConfig::default()
    };
    let source = DataSourceFactory::create(&config).await.unwrap();
    let service = TrainingService::new(
        source,
        DerivationConfig::default(),
        TrainingEnvConfig::default(),
    );

    let outcome = service.train().await.unwrap();
    assert_eq!(outcome.dataset.features.len(), 54);

    let predictor = PipelinePredictor::from_artifact(outcome.artifact).unwrap();
    let result = service.predict_queued(&predictor).await.unwrap().unwrap();
    assert_eq!(result.record.id, 60);
    assert!(result.predicted_label);
}

#[tokio::test]
async fn test_csv_source_with_skip_policy() {
    let dir = TempDir::new().unwrap();
    let trades_path = dir.path().join("trades.csv");
    let bars_path = dir.path().join("bars.csv");

    let mut trades_csv = String::from(
        "id,sma200Dist,sma50Dist,sma21Dist,sma200Slope,sma50Slope,sma21Slope,position,barRatio,NumOfReverseBars,bolUPDist,bolDownDist,result\n",
    );
    for id in 6..=40 {
        let t = trade(id, None);
        trades_csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
            t.id,
            t.sma200_dist,
            t.sma50_dist,
            t.sma21_dist,
            t.sma200_slope,
            t.sma50_slope,
            t.sma21_slope,
            t.position,
            t.bar_ratio,
            t.num_of_reverse_bars,
            t.bol_up_dist,
            t.bol_down_dist,
            i32::from(id % 4 == 0)
        ));
    }
    // unlabeled row cannot be used for training
    trades_csv.push_str("41,1,0,0,0,0,0,buy,1,0,0,0,\n");
    fs::write(&trades_path, trades_csv).unwrap();

    let mut bars_csv = String::from("id,open,close\n");
    for bar in bars(41) {
        bars_csv.push_str(&format!("{},{},{}\n", bar.id, bar.open, bar.close));
    }
    fs::write(&bars_path, bars_csv).unwrap();

    let config = DataSourceEnvConfig {
        kind: DataSourceKind::Csv,
        trades_csv: trades_path,
        bars_csv: bars_path,
        ..DataSourceEnvConfig::default()
    };
    let source = DataSourceFactory::create(&config).await.unwrap();
    let service = TrainingService::new(
        source,
        DerivationConfig::default(),
        TrainingEnvConfig {
            batch_policy: BatchPolicy::Skip,
            ..TrainingEnvConfig::default()
        },
    );

    let dataset = service.load_dataset().await.unwrap();
    assert_eq!(dataset.features.len(), 35);
    assert_eq!(dataset.skipped.len(), 1);
    assert_eq!(dataset.skipped[0].trade_id, 41);
    assert!(dataset.skipped[0].reason.contains("no outcome label"));
}
