//! Data access abstractions
//!
//! The training pipeline never talks to a storage technology directly. It
//! receives a [`TradeDataSource`] and asks it for the trade history, the bar
//! history and the next trade waiting for a prediction.
//!
//! Implementations live in `infrastructure`:
//! - `SqliteTradeDataSource` reads the `trade_result`, `bar_stat` and
//!   `ml_queue` tables
//! - `CsvTradeDataSource` reads exported CSV files
//! - `InMemoryTradeDataSource` serves fixed collections (tests, demos)

use crate::domain::types::{Bar, TradeRecord};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait TradeDataSource: Send + Sync {
    /// All historical trades, ordered by id
    async fn fetch_trades(&self) -> Result<Vec<TradeRecord>>;

    /// All price bars, ordered by id
    async fn fetch_bars(&self) -> Result<Vec<Bar>>;

    /// First trade waiting in the prediction queue, if any
    async fn fetch_queued_trade(&self) -> Result<Option<TradeRecord>>;
}
