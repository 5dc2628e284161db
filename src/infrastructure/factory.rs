use crate::config::{DataSourceEnvConfig, DataSourceKind};
use crate::domain::repositories::TradeDataSource;
use crate::infrastructure::csv_store::CsvTradeDataSource;
use crate::infrastructure::persistence::database::Database;
use crate::infrastructure::persistence::repositories::SqliteTradeDataSource;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

pub struct DataSourceFactory;

impl DataSourceFactory {
    pub async fn create(config: &DataSourceEnvConfig) -> Result<Arc<dyn TradeDataSource>> {
        match config.kind {
            DataSourceKind::Sqlite => {
                let db = Database::new(&config.database_url)
                    .await
                    .context("Failed to open trade database")?;
                info!("Using SQLite data source");
                Ok(Arc::new(SqliteTradeDataSource::new(db.pool)))
            }
            DataSourceKind::Csv => {
                info!(
                    "Using CSV data source ({:?}, {:?})",
                    config.trades_csv, config.bars_csv
                );
                Ok(Arc::new(CsvTradeDataSource::new(
                    config.trades_csv.clone(),
                    config.bars_csv.clone(),
                    config.queue_csv.clone(),
                )))
            }
        }
    }
}
