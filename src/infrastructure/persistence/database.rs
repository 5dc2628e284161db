use anyhow::{Context, Result};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::info;

/// Trade history database wrapper
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn new(db_url: &str) -> Result<Self> {
        // Ensure the directory exists if it's a file path
        if let Some(path_part) = db_url.strip_prefix("sqlite://") {
            let path = Path::new(path_part);
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create database directory")?;
            }
        }

        let options = SqliteConnectOptions::from_str(db_url)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("Failed to connect to SQLite database")?;

        info!("Connected to database: {}", db_url);

        let db = Self { pool };
        db.init().await?;

        Ok(db)
    }

    /// Initialize database schema
    async fn init(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await?;

        // 1. Closed trades with their outcome
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trade_result (
                id INTEGER PRIMARY KEY,
                sma200Dist REAL NOT NULL,
                sma50Dist REAL NOT NULL,
                sma21Dist REAL NOT NULL,
                sma200Slope REAL NOT NULL,
                sma50Slope REAL NOT NULL,
                sma21Slope REAL NOT NULL,
                position TEXT NOT NULL,
                barRatio REAL NOT NULL,
                NumOfReverseBars REAL NOT NULL,
                bolUPDist REAL NOT NULL,
                bolDownDist REAL NOT NULL,
                result INTEGER NOT NULL
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create trade_result table")?;

        // 2. Price bars
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bar_stat (
                id INTEGER NOT NULL,
                open REAL NOT NULL,
                close REAL NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_bar_stat_id ON bar_stat (id);
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create bar_stat table")?;

        // 3. Trades waiting for a prediction
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ml_queue (
                id INTEGER PRIMARY KEY,
                sma200Dist REAL NOT NULL,
                sma50Dist REAL NOT NULL,
                sma21Dist REAL NOT NULL,
                sma200Slope REAL NOT NULL,
                sma50Slope REAL NOT NULL,
                sma21Slope REAL NOT NULL,
                position TEXT NOT NULL,
                barRatio REAL NOT NULL,
                NumOfReverseBars REAL NOT NULL,
                bolUPDist REAL NOT NULL,
                bolDownDist REAL NOT NULL,
                result INTEGER
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create ml_queue table")?;

        info!("Database schema initialized");
        Ok(())
    }
}
