use crate::domain::errors::ModelError;
use crate::domain::types::{FeatureVector, Position};

/// Numeric columns that are min-max normalized before concatenation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum NumericColumn {
    BodyRatio,
    SmaPos,
    BarRatio,
    Sma200Slope,
    Sma50Slope,
    Sma21Slope,
    BolUpDist,
    BolDownDist,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 8] = [
        NumericColumn::BodyRatio,
        NumericColumn::SmaPos,
        NumericColumn::BarRatio,
        NumericColumn::Sma200Slope,
        NumericColumn::Sma50Slope,
        NumericColumn::Sma21Slope,
        NumericColumn::BolUpDist,
        NumericColumn::BolDownDist,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NumericColumn::BodyRatio => "bodyRatio",
            NumericColumn::SmaPos => "smaPos",
            NumericColumn::BarRatio => "barRatio",
            NumericColumn::Sma200Slope => "sma200Slope",
            NumericColumn::Sma50Slope => "sma50Slope",
            NumericColumn::Sma21Slope => "sma21Slope",
            NumericColumn::BolUpDist => "bolUpDist",
            NumericColumn::BolDownDist => "bolDownDist",
        }
    }

    pub fn extract(&self, fv: &FeatureVector) -> f64 {
        match self {
            NumericColumn::BodyRatio => fv.body_ratio,
            NumericColumn::SmaPos => fv.sma_pos,
            NumericColumn::BarRatio => fv.bar_ratio,
            NumericColumn::Sma200Slope => fv.sma200_slope,
            NumericColumn::Sma50Slope => fv.sma50_slope,
            NumericColumn::Sma21Slope => fv.sma21_slope,
            NumericColumn::BolUpDist => fv.bol_up_dist,
            NumericColumn::BolDownDist => fv.bol_down_dist,
        }
    }
}

/// Ordered list of model input slots.
/// The encoded position sits right after `bodyRatio`.
/// Any change here is a breaking change for saved models.
pub const FEATURE_NAMES: &[&str] = &[
    "bodyRatio",
    "Pos.long",
    "Pos.short",
    "smaPos",
    "barRatio",
    "sma200Slope",
    "sma50Slope",
    "sma21Slope",
    "bolUpDist",
    "bolDownDist",
];

/// One-hot encoding of the position column.
pub fn encode_position(position: Position) -> [f64; Position::COUNT] {
    let mut slots = [0.0; Position::COUNT];
    slots[position.index()] = 1.0;
    slots
}

/// Concatenates already-normalized numeric columns (in [`NumericColumn::ALL`]
/// order) and the encoded position into the model input order.
pub fn concatenate(numeric: &[f64], position: Position) -> Result<Vec<f64>, ModelError> {
    let Some((body_ratio, rest)) = numeric
        .split_first()
        .filter(|_| numeric.len() == NumericColumn::ALL.len())
    else {
        return Err(ModelError::DimensionMismatch {
            expected: NumericColumn::ALL.len(),
            got: numeric.len(),
        });
    };

    let mut out = Vec::with_capacity(FEATURE_NAMES.len());
    out.push(*body_ratio);
    out.extend_from_slice(&encode_position(position));
    out.extend_from_slice(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FeatureVector {
        FeatureVector {
            position: Position::Short,
            sma_pos: 1.0,
            body_ratio: 0.8,
            sma200_dist: 1.4,
            sma50_dist: 0.2,
            sma21_dist: 0.1,
            bar_ratio: 2.5,
            num_of_reverse_bars: 3.0,
            sma200_slope: 0.01,
            sma50_slope: 0.02,
            sma21_slope: 0.03,
            bol_up_dist: 4.0,
            bol_down_dist: 5.0,
            label: false,
        }
    }

    fn raw_inputs(fv: &FeatureVector) -> Vec<f64> {
        let numeric: Vec<f64> = NumericColumn::ALL.iter().map(|c| c.extract(fv)).collect();
        concatenate(&numeric, fv.position).unwrap()
    }

    #[test]
    fn test_feature_vector_length() {
        let vec = raw_inputs(&sample());
        assert_eq!(vec.len(), FEATURE_NAMES.len());
        assert_eq!(NumericColumn::ALL.len() + Position::COUNT, FEATURE_NAMES.len());
    }

    #[test]
    fn test_concatenate_rejects_wrong_column_count() {
        assert_eq!(
            concatenate(&[], Position::Long),
            Err(ModelError::DimensionMismatch {
                expected: NumericColumn::ALL.len(),
                got: 0
            })
        );
        assert!(concatenate(&[0.5; 9], Position::Short).is_err());
    }

    #[test]
    fn test_feature_consistency() {
        let vec = raw_inputs(&sample());
        // bodyRatio is index 0
        assert_eq!(vec[0], 0.8);
        // Short position occupies the second encoded slot
        assert_eq!(&vec[1..3], &[0.0, 1.0]);
        assert_eq!(vec[3], 1.0);
        // bolDownDist is last
        assert_eq!(vec[9], 5.0);
    }

    #[test]
    fn test_names_follow_columns() {
        assert_eq!(FEATURE_NAMES[0], NumericColumn::ALL[0].name());
        for (i, column) in NumericColumn::ALL.iter().enumerate().skip(1) {
            assert_eq!(FEATURE_NAMES[i + Position::COUNT], column.name());
        }
    }
}
