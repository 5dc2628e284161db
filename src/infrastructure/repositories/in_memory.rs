//! In-Memory Data Source
//!
//! Serves fixed trade, bar and queue collections through the
//! [`TradeDataSource`] port. Used by tests and demos; the collections can be
//! replaced at runtime.

use crate::domain::repositories::TradeDataSource;
use crate::domain::types::{Bar, TradeRecord};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryTradeDataSource {
    trades: Arc<RwLock<Vec<TradeRecord>>>,
    bars: Arc<RwLock<Vec<Bar>>>,
    queue: Arc<RwLock<Vec<TradeRecord>>>,
}

impl InMemoryTradeDataSource {
    pub fn new(trades: Vec<TradeRecord>, bars: Vec<Bar>) -> Self {
        Self {
            trades: Arc::new(RwLock::new(trades)),
            bars: Arc::new(RwLock::new(bars)),
            queue: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn with_queue(self, queue: Vec<TradeRecord>) -> Self {
        Self {
            queue: Arc::new(RwLock::new(queue)),
            ..self
        }
    }

    pub async fn enqueue(&self, trade: TradeRecord) {
        self.queue.write().await.push(trade);
    }

    pub async fn add_bars(&self, bars: impl IntoIterator<Item = Bar>) {
        self.bars.write().await.extend(bars);
    }
}

#[async_trait]
impl TradeDataSource for InMemoryTradeDataSource {
    async fn fetch_trades(&self) -> Result<Vec<TradeRecord>> {
        let mut trades = self.trades.read().await.clone();
        trades.sort_by_key(|t| t.id);
        Ok(trades)
    }

    async fn fetch_bars(&self) -> Result<Vec<Bar>> {
        let mut bars = self.bars.read().await.clone();
        bars.sort_by_key(|b| b.id);
        Ok(bars)
    }

    async fn fetch_queued_trade(&self) -> Result<Option<TradeRecord>> {
        Ok(self.queue.read().await.first().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(id: i64) -> TradeRecord {
        TradeRecord {
            id,
            sma200_dist: 0.0,
            sma50_dist: 0.0,
            sma21_dist: 0.0,
            sma200_slope: 0.0,
            sma50_slope: 0.0,
            sma21_slope: 0.0,
            position: "long".to_string(),
            bar_ratio: 1.0,
            num_of_reverse_bars: 0.0,
            bol_up_dist: 0.0,
            bol_down_dist: 0.0,
            result: Some(false),
        }
    }

    #[tokio::test]
    async fn test_in_memory_source_orders_and_queues() {
        let source = InMemoryTradeDataSource::new(
            vec![trade(5), trade(2)],
            vec![Bar::new(3, 1.0, 1.0), Bar::new(1, 1.0, 2.0)],
        );
        assert!(source.fetch_queued_trade().await.unwrap().is_none());

        source.enqueue(trade(9)).await;
        source.enqueue(trade(10)).await;
        source.add_bars([Bar::new(2, 0.5, 0.7)]).await;

        let ids: Vec<i64> = source.fetch_trades().await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 5]);
        let bar_ids: Vec<i64> = source.fetch_bars().await.unwrap().iter().map(|b| b.id).collect();
        assert_eq!(bar_ids, vec![1, 2, 3]);
        assert_eq!(source.fetch_queued_trade().await.unwrap().unwrap().id, 9);
    }
}
