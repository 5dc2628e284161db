use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One sampled price interval, keyed by a monotonic identifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub id: i64,
    pub open: f64,
    pub close: f64,
}

impl Bar {
    pub fn new(id: i64, open: f64, close: f64) -> Self {
        Self { id, open, close }
    }

    /// Absolute size of the candle body.
    pub fn body_height(&self) -> f64 {
        (self.close - self.open).abs()
    }
}

/// Side of a historical trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Long,
    Short,
}

impl Position {
    pub const COUNT: usize = 2;

    /// Every known position, in encoding order.
    pub const ALL: [Position; Self::COUNT] = [Position::Long, Position::Short];

    /// Slot of this position in a one-hot encoding over [`Position::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Position::Long => 0,
            Position::Short => 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Long => write!(f, "long"),
            Position::Short => write!(f, "short"),
        }
    }
}

impl FromStr for Position {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" | "buy" => Ok(Position::Long),
            "short" | "sell" => Ok(Position::Short),
            _ => anyhow::bail!("Invalid position: {}. Must be 'long'/'buy' or 'short'/'sell'", s),
        }
    }
}

/// A historical trade annotated with precomputed indicator signals.
///
/// Distances and slopes are signed so that positive values follow the trade direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: i64,
    pub sma200_dist: f64,
    pub sma50_dist: f64,
    pub sma21_dist: f64,
    pub sma200_slope: f64,
    pub sma50_slope: f64,
    pub sma21_slope: f64,
    pub position: String,
    pub bar_ratio: f64,
    pub num_of_reverse_bars: f64,
    pub bol_up_dist: f64,
    pub bol_down_dist: f64,
    /// Outcome label. `None` for queued trades awaiting a prediction.
    pub result: Option<bool>,
}

/// Model-ready representation of a [`TradeRecord`].
///
/// Serialized names are the column names downstream consumers expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub position: Position,
    #[serde(rename = "smaPos")]
    pub sma_pos: f64,
    #[serde(rename = "bodyRatio")]
    pub body_ratio: f64,
    #[serde(rename = "sma200Dist")]
    pub sma200_dist: f64,
    #[serde(rename = "sma50Dist")]
    pub sma50_dist: f64,
    #[serde(rename = "sma21Dist")]
    pub sma21_dist: f64,
    #[serde(rename = "barRatio")]
    pub bar_ratio: f64,
    #[serde(rename = "NumOfReverseBars")]
    pub num_of_reverse_bars: f64,
    #[serde(rename = "sma200Slope")]
    pub sma200_slope: f64,
    #[serde(rename = "sma50Slope")]
    pub sma50_slope: f64,
    #[serde(rename = "sma21Slope")]
    pub sma21_slope: f64,
    #[serde(rename = "bolUpDist")]
    pub bol_up_dist: f64,
    #[serde(rename = "bolDownDist")]
    pub bol_down_dist: f64,
    #[serde(rename = "Label")]
    pub label: bool,
}

/// Raw classifier output for one feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted_label: bool,
    pub probability: f64,
    pub score: f64,
}

/// A record paired with the classifier's verdict on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult<T> {
    pub record: T,
    pub predicted_label: bool,
    pub probability: f64,
    pub score: f64,
}

impl<T> PredictionResult<T> {
    pub fn new(record: T, prediction: Prediction) -> Self {
        Self {
            record,
            predicted_label: prediction.predicted_label,
            probability: prediction.probability,
            score: prediction.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_parsing() {
        assert_eq!(Position::from_str("LONG").unwrap(), Position::Long);
        assert_eq!(Position::from_str(" buy ").unwrap(), Position::Long);
        assert_eq!(Position::from_str("sell").unwrap(), Position::Short);
        assert!(Position::from_str("flat").is_err());
    }

    #[test]
    fn test_body_height_is_absolute() {
        assert!((Bar::new(1, 1.5, 1.4).body_height() - 0.1).abs() < 1e-12);
        assert!((Bar::new(2, 1.4, 1.5).body_height() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_feature_vector_column_names() {
        let fv = FeatureVector {
            position: Position::Short,
            sma_pos: 1.0,
            body_ratio: 0.5,
            sma200_dist: 1.2,
            sma50_dist: 0.3,
            sma21_dist: 0.1,
            bar_ratio: 2.0,
            num_of_reverse_bars: 3.0,
            sma200_slope: 0.01,
            sma50_slope: 0.02,
            sma21_slope: 0.03,
            bol_up_dist: 4.0,
            bol_down_dist: 5.0,
            label: true,
        };

        let json = serde_json::to_value(&fv).unwrap();
        for name in [
            "position",
            "smaPos",
            "bodyRatio",
            "sma200Dist",
            "NumOfReverseBars",
            "bolDownDist",
            "Label",
        ] {
            assert!(json.get(name).is_some(), "missing column {}", name);
        }
        assert_eq!(json["position"], "short");
    }
}
