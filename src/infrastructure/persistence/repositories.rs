use crate::domain::repositories::TradeDataSource;
use crate::domain::types::{Bar, TradeRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

const TRADE_COLUMNS: &str = "id, sma200Dist, sma50Dist, sma21Dist, sma200Slope, sma50Slope, \
     sma21Slope, position, barRatio, NumOfReverseBars, bolUPDist, bolDownDist, result";

pub struct SqliteTradeDataSource {
    pool: SqlitePool,
}

impl SqliteTradeDataSource {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn save_trade(&self, trade: &TradeRecord) -> Result<()> {
        self.insert_trade("trade_result", trade)
            .await
            .with_context(|| format!("Failed to save trade {}", trade.id))
    }

    pub async fn enqueue_trade(&self, trade: &TradeRecord) -> Result<()> {
        self.insert_trade("ml_queue", trade)
            .await
            .with_context(|| format!("Failed to enqueue trade {}", trade.id))
    }

    pub async fn save_bars(&self, bars: &[Bar]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for bar in bars {
            sqlx::query("INSERT INTO bar_stat (id, open, close) VALUES (?, ?, ?)")
                .bind(bar.id)
                .bind(bar.open)
                .bind(bar.close)
                .execute(&mut *tx)
                .await
                .context("Failed to save bar")?;
        }
        tx.commit().await?;

        info!("Persisted {} bars", bars.len());
        Ok(())
    }

    async fn insert_trade(&self, table: &str, trade: &TradeRecord) -> Result<()> {
        let sql = format!(
            "INSERT OR REPLACE INTO {} ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            table, TRADE_COLUMNS
        );
        sqlx::query(&sql)
            .bind(trade.id)
            .bind(trade.sma200_dist)
            .bind(trade.sma50_dist)
            .bind(trade.sma21_dist)
            .bind(trade.sma200_slope)
            .bind(trade.sma50_slope)
            .bind(trade.sma21_slope)
            .bind(&trade.position)
            .bind(trade.bar_ratio)
            .bind(trade.num_of_reverse_bars)
            .bind(trade.bol_up_dist)
            .bind(trade.bol_down_dist)
            .bind(trade.result.map(i64::from))
            .execute(&self.pool)
            .await?;

        debug!("Persisted trade {} into {}", trade.id, table);
        Ok(())
    }

    fn map_row_to_trade(row: &sqlx::sqlite::SqliteRow) -> Result<TradeRecord> {
        // Any non-zero outcome counts as a win
        let result: Option<i64> = row.try_get("result")?;

        Ok(TradeRecord {
            id: row.try_get("id")?,
            sma200_dist: row.try_get("sma200Dist")?,
            sma50_dist: row.try_get("sma50Dist")?,
            sma21_dist: row.try_get("sma21Dist")?,
            sma200_slope: row.try_get("sma200Slope")?,
            sma50_slope: row.try_get("sma50Slope")?,
            sma21_slope: row.try_get("sma21Slope")?,
            position: row.try_get("position")?,
            bar_ratio: row.try_get("barRatio")?,
            num_of_reverse_bars: row.try_get("NumOfReverseBars")?,
            bol_up_dist: row.try_get("bolUPDist")?,
            bol_down_dist: row.try_get("bolDownDist")?,
            result: result.map(|v| v != 0),
        })
    }
}

#[async_trait]
impl TradeDataSource for SqliteTradeDataSource {
    async fn fetch_trades(&self) -> Result<Vec<TradeRecord>> {
        let sql = format!("SELECT {} FROM trade_result ORDER BY id ASC", TRADE_COLUMNS);
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .context("Failed to query trade_result")?;

        rows.iter().map(Self::map_row_to_trade).collect()
    }

    async fn fetch_bars(&self) -> Result<Vec<Bar>> {
        let rows = sqlx::query("SELECT id, open, close FROM bar_stat ORDER BY id ASC, rowid ASC")
            .fetch_all(&self.pool)
            .await
            .context("Failed to query bar_stat")?;

        let mut bars = Vec::with_capacity(rows.len());
        for row in rows {
            bars.push(Bar::new(
                row.try_get("id")?,
                row.try_get("open")?,
                row.try_get("close")?,
            ));
        }
        Ok(bars)
    }

    async fn fetch_queued_trade(&self) -> Result<Option<TradeRecord>> {
        let sql = format!("SELECT {} FROM ml_queue ORDER BY id ASC LIMIT 1", TRADE_COLUMNS);
        let row = sqlx::query(&sql)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query ml_queue")?;

        row.as_ref().map(Self::map_row_to_trade).transpose()
    }
}
