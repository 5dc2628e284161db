//! Feature derivation from trade records and price bars.
//!
//! Every trade looks at its entry bar and the five bars before it
//! (`trade.id - 5 ..= trade.id`). The entry bar body is compared with the
//! average body over that window to give `bodyRatio`; the remaining
//! indicator signals are copied through unchanged.
//!
//! The same [`FeatureDeriver`] is used when building the training set and
//! when scoring a single queued trade, so both paths share formulas and
//! constants.

use crate::domain::errors::DerivationError;
use crate::domain::types::{Bar, FeatureVector, Position, TradeRecord};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Number of bars preceding the entry bar that belong to its window.
pub const WINDOW_LOOKBACK: i64 = 5;

/// Fixed normalization constant for the window body average.
pub const FIXED_BODY_DIVISOR: f64 = 5.0;

/// `sma200Dist` at or above this value sets `smaPos`.
pub const SMA_POSITION_THRESHOLD: f64 = 1.0;

/// What the window body sum is divided by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyAverageDivisor {
    /// Always divide by [`FIXED_BODY_DIVISOR`], whatever the window size.
    #[default]
    Fixed,
    /// Divide by the number of bars actually found in the window.
    WindowCount,
}

impl FromStr for BodyAverageDivisor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fixed" => Ok(BodyAverageDivisor::Fixed),
            "window" | "window_count" => Ok(BodyAverageDivisor::WindowCount),
            _ => anyhow::bail!(
                "Invalid BODY_AVERAGE_DIVISOR: {}. Must be 'fixed' or 'window_count'",
                s
            ),
        }
    }
}

/// Behavior when the window average body height is zero or not finite.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateWindowPolicy {
    #[default]
    Error,
    Sentinel(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DerivationConfig {
    pub divisor: BodyAverageDivisor,
    pub degenerate_window: DegenerateWindowPolicy,
}

/// Bars sorted by identifier for window lookups.
///
/// Sorting is stable, so bars sharing an identifier keep their source order.
#[derive(Debug, Clone, Default)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.id);
        Self { bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Bars with `entry_id - WINDOW_LOOKBACK <= id <= entry_id`, in id order.
    pub fn window(&self, entry_id: i64) -> &[Bar] {
        let first = entry_id.saturating_sub(WINDOW_LOOKBACK);
        let start = self.bars.partition_point(|b| b.id < first);
        let end = self.bars.partition_point(|b| b.id <= entry_id);
        &self.bars[start..end]
    }
}

impl From<Vec<Bar>> for BarSeries {
    fn from(bars: Vec<Bar>) -> Self {
        Self::new(bars)
    }
}

/// Derives [`FeatureVector`]s from trade records against a fixed bar history.
#[derive(Debug, Clone)]
pub struct FeatureDeriver {
    bars: BarSeries,
    config: DerivationConfig,
}

impl FeatureDeriver {
    pub fn new(bars: impl Into<BarSeries>, config: DerivationConfig) -> Self {
        Self {
            bars: bars.into(),
            config,
        }
    }

    /// Derives one feature vector.
    ///
    /// An absent label is read as `false`; use [`FeatureDeriver::derive_labeled`]
    /// when the label is required.
    pub fn derive(&self, trade: &TradeRecord) -> Result<FeatureVector, DerivationError> {
        validate_fields(trade)?;

        let position =
            Position::from_str(&trade.position).map_err(|_| DerivationError::InvalidPosition {
                trade_id: trade.id,
                value: trade.position.clone(),
            })?;

        let window = self.bars.window(trade.id);
        let entry = window
            .iter()
            .find(|b| b.id == trade.id)
            .ok_or(DerivationError::MissingEntryBar { trade_id: trade.id })?;

        let body_ratio = self.body_ratio(trade.id, entry, window)?;

        let sma_pos = if trade.sma200_dist >= SMA_POSITION_THRESHOLD {
            1.0
        } else {
            0.0
        };

        Ok(FeatureVector {
            position,
            sma_pos,
            body_ratio,
            sma200_dist: trade.sma200_dist,
            sma50_dist: trade.sma50_dist,
            sma21_dist: trade.sma21_dist,
            bar_ratio: trade.bar_ratio,
            num_of_reverse_bars: trade.num_of_reverse_bars,
            sma200_slope: trade.sma200_slope,
            sma50_slope: trade.sma50_slope,
            sma21_slope: trade.sma21_slope,
            bol_up_dist: trade.bol_up_dist,
            bol_down_dist: trade.bol_down_dist,
            label: trade.result.unwrap_or(false),
        })
    }

    /// Like [`FeatureDeriver::derive`] but rejects trades without an outcome.
    pub fn derive_labeled(&self, trade: &TradeRecord) -> Result<FeatureVector, DerivationError> {
        if trade.result.is_none() {
            return Err(DerivationError::MissingLabel { trade_id: trade.id });
        }
        self.derive(trade)
    }

    /// Derives every trade in order, stopping at the first failure.
    pub fn derive_all(
        &self,
        trades: &[TradeRecord],
    ) -> Result<Vec<FeatureVector>, DerivationError> {
        trades.iter().map(|t| self.derive_labeled(t)).collect()
    }

    fn body_ratio(
        &self,
        trade_id: i64,
        entry: &Bar,
        window: &[Bar],
    ) -> Result<f64, DerivationError> {
        let body_sum: f64 = window.iter().map(Bar::body_height).sum();
        let divisor = match self.config.divisor {
            BodyAverageDivisor::Fixed => FIXED_BODY_DIVISOR,
            BodyAverageDivisor::WindowCount => window.len() as f64,
        };
        let avg_body_height = body_sum / divisor;

        if avg_body_height == 0.0 || !avg_body_height.is_finite() {
            return match self.config.degenerate_window {
                DegenerateWindowPolicy::Error => {
                    Err(DerivationError::DegenerateWindow { trade_id })
                }
                DegenerateWindowPolicy::Sentinel(value) => Ok(value),
            };
        }

        Ok(entry.body_height() / avg_body_height)
    }
}

fn validate_fields(trade: &TradeRecord) -> Result<(), DerivationError> {
    let fields: [(&'static str, f64); 10] = [
        ("sma200Dist", trade.sma200_dist),
        ("sma50Dist", trade.sma50_dist),
        ("sma21Dist", trade.sma21_dist),
        ("barRatio", trade.bar_ratio),
        ("NumOfReverseBars", trade.num_of_reverse_bars),
        ("sma200Slope", trade.sma200_slope),
        ("sma50Slope", trade.sma50_slope),
        ("sma21Slope", trade.sma21_slope),
        ("bolUpDist", trade.bol_up_dist),
        ("bolDownDist", trade.bol_down_dist),
    ];

    match fields.into_iter().find(|(_, v)| !v.is_finite()) {
        Some((field, _)) => Err(DerivationError::NonFiniteField {
            trade_id: trade.id,
            field,
        }),
        None => Ok(()),
    }
}
