//! CSV-backed trade history and feature export.
//!
//! Trade files use the same column names as the `trade_result` table;
//! `result` is an integer (non-zero is a win) and may be empty for queued
//! trades.

use crate::domain::repositories::TradeDataSource;
use crate::domain::types::{Bar, FeatureVector, TradeRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize)]
struct TradeRow {
    id: i64,
    #[serde(rename = "sma200Dist")]
    sma200_dist: f64,
    #[serde(rename = "sma50Dist")]
    sma50_dist: f64,
    #[serde(rename = "sma21Dist")]
    sma21_dist: f64,
    #[serde(rename = "sma200Slope")]
    sma200_slope: f64,
    #[serde(rename = "sma50Slope")]
    sma50_slope: f64,
    #[serde(rename = "sma21Slope")]
    sma21_slope: f64,
    position: String,
    #[serde(rename = "barRatio")]
    bar_ratio: f64,
    #[serde(rename = "NumOfReverseBars")]
    num_of_reverse_bars: f64,
    #[serde(rename = "bolUPDist", alias = "bolUpDist")]
    bol_up_dist: f64,
    #[serde(rename = "bolDownDist")]
    bol_down_dist: f64,
    #[serde(default)]
    result: Option<i64>,
}

impl From<TradeRow> for TradeRecord {
    fn from(row: TradeRow) -> Self {
        Self {
            id: row.id,
            sma200_dist: row.sma200_dist,
            sma50_dist: row.sma50_dist,
            sma21_dist: row.sma21_dist,
            sma200_slope: row.sma200_slope,
            sma50_slope: row.sma50_slope,
            sma21_slope: row.sma21_slope,
            position: row.position,
            bar_ratio: row.bar_ratio,
            num_of_reverse_bars: row.num_of_reverse_bars,
            bol_up_dist: row.bol_up_dist,
            bol_down_dist: row.bol_down_dist,
            result: row.result.map(|v| v != 0),
        }
    }
}

fn read_rows<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let mut rows = Vec::new();
    for (line, result) in rdr.deserialize().enumerate() {
        let row: T = result.with_context(|| format!("Invalid row {} in {:?}", line + 1, path))?;
        rows.push(row);
    }
    Ok(rows)
}

fn read_trades(path: &Path) -> Result<Vec<TradeRecord>> {
    let mut trades: Vec<TradeRecord> = read_rows::<TradeRow>(path)?
        .into_iter()
        .map(TradeRecord::from)
        .collect();
    trades.sort_by_key(|t| t.id);
    Ok(trades)
}

/// Runs a file read on the blocking pool so the async runtime stays free.
async fn read_blocking<T, F>(read: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(read)
        .await
        .context("CSV reader task failed")?
}

pub struct CsvTradeDataSource {
    trades_path: PathBuf,
    bars_path: PathBuf,
    queue_path: Option<PathBuf>,
}

impl CsvTradeDataSource {
    pub fn new(
        trades_path: impl Into<PathBuf>,
        bars_path: impl Into<PathBuf>,
        queue_path: Option<PathBuf>,
    ) -> Self {
        Self {
            trades_path: trades_path.into(),
            bars_path: bars_path.into(),
            queue_path,
        }
    }
}

#[async_trait]
impl TradeDataSource for CsvTradeDataSource {
    async fn fetch_trades(&self) -> Result<Vec<TradeRecord>> {
        let path = self.trades_path.clone();
        let trades = read_blocking(move || read_trades(&path)).await?;
        info!("Read {} trades from {:?}", trades.len(), self.trades_path);
        Ok(trades)
    }

    async fn fetch_bars(&self) -> Result<Vec<Bar>> {
        let path = self.bars_path.clone();
        let mut bars: Vec<Bar> = read_blocking(move || read_rows(&path)).await?;
        bars.sort_by_key(|b| b.id);
        info!("Read {} bars from {:?}", bars.len(), self.bars_path);
        Ok(bars)
    }

    async fn fetch_queued_trade(&self) -> Result<Option<TradeRecord>> {
        match &self.queue_path {
            Some(path) => {
                let path = path.clone();
                let trades = read_blocking(move || read_trades(&path)).await?;
                Ok(trades.into_iter().next())
            }
            None => Ok(None),
        }
    }
}

/// Writes derived vectors with their serialized column names, one row each.
pub fn write_features_csv(path: &Path, features: &[FeatureVector]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }

    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("Failed to create {:?}", path))?;
    for fv in features {
        wtr.serialize(fv).context("Failed to serialize feature vector")?;
    }
    wtr.flush().context("Failed to flush CSV writer")?;

    info!("Exported {} feature vectors to {:?}", features.len(), path);
    Ok(())
}
