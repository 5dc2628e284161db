//! Estimator chain that turns derived feature vectors into model inputs
//! and fits the classifier.
//!
//! Steps, in order:
//! 1. min-max normalize each numeric column independently
//! 2. one-hot encode the position and concatenate everything into the
//!    layout of `feature_registry::FEATURE_NAMES`
//! 3. min-max normalize every slot of the concatenated vector again
//! 4. fit SDCA logistic regression on the result
//!
//! Scalers are fitted on the training set only and stored with the model, so
//! evaluation and prediction reuse the training ranges.

use super::sdca::{LogisticModel, SdcaLogisticRegression, SdcaParameters, SdcaTrainingSummary};
use crate::domain::errors::ModelError;
use crate::domain::ml::feature_registry::{self, FEATURE_NAMES, NumericColumn};
use crate::domain::types::{FeatureVector, Prediction};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Maps `[min, max]` onto `[0, 1]`. A constant column maps to 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub min: f64,
    pub max: f64,
}

impl MinMaxScaler {
    pub fn fit(values: impl IntoIterator<Item = f64>) -> Self {
        let (min, max) = values
            .into_iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if min > max {
            // No values seen.
            return Self { min: 0.0, max: 0.0 };
        }
        Self { min, max }
    }

    pub fn transform(&self, value: f64) -> f64 {
        let range = self.max - self.min;
        if range > 0.0 {
            (value - self.min) / range
        } else {
            0.0
        }
    }
}

/// Everything needed to score a feature vector the same way training did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPipeline {
    pub column_scalers: Vec<(NumericColumn, MinMaxScaler)>,
    pub vector_scalers: Vec<MinMaxScaler>,
    pub model: LogisticModel,
    pub threshold: f64,
}

impl FittedPipeline {
    /// Normalized, concatenated model input for one feature vector.
    pub fn transform(&self, fv: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        let numeric: Vec<f64> = self
            .column_scalers
            .iter()
            .map(|(column, scaler)| scaler.transform(column.extract(fv)))
            .collect();

        let concatenated = feature_registry::concatenate(&numeric, fv.position)?;
        if concatenated.len() != self.vector_scalers.len() {
            return Err(ModelError::DimensionMismatch {
                expected: concatenated.len(),
                got: self.vector_scalers.len(),
            });
        }
        Ok(concatenated
            .into_iter()
            .zip(&self.vector_scalers)
            .map(|(v, scaler)| scaler.transform(v))
            .collect())
    }

    pub fn predict(&self, fv: &FeatureVector) -> Result<Prediction, ModelError> {
        let input = self.transform(fv)?;
        let score = self.model.score(&input)?;
        let probability = LogisticModel::probability(score);
        Ok(Prediction {
            predicted_label: probability >= self.threshold,
            probability,
            score,
        })
    }

    pub fn predict_batch(&self, features: &[FeatureVector]) -> Result<Vec<Prediction>, ModelError> {
        features.iter().map(|fv| self.predict(fv)).collect()
    }
}

#[derive(Debug, Clone)]
pub struct PipelineEstimator {
    params: SdcaParameters,
    threshold: f64,
}

impl Default for PipelineEstimator {
    fn default() -> Self {
        Self::new(SdcaParameters::default(), 0.5)
    }
}

impl PipelineEstimator {
    pub fn new(params: SdcaParameters, threshold: f64) -> Self {
        Self { params, threshold }
    }

    pub fn fit(
        &self,
        train: &[FeatureVector],
    ) -> Result<(FittedPipeline, SdcaTrainingSummary), ModelError> {
        if train.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ModelError::InvalidParameter {
                name: "threshold",
                reason: format!("must be within [0, 1], got {}", self.threshold),
            });
        }

        let column_scalers: Vec<(NumericColumn, MinMaxScaler)> = NumericColumn::ALL
            .iter()
            .map(|&column| {
                let scaler = MinMaxScaler::fit(train.iter().map(|fv| column.extract(fv)));
                (column, scaler)
            })
            .collect();

        let concatenated: Vec<Vec<f64>> = train
            .iter()
            .map(|fv| {
                let numeric: Vec<f64> = column_scalers
                    .iter()
                    .map(|(column, scaler)| scaler.transform(column.extract(fv)))
                    .collect();
                feature_registry::concatenate(&numeric, fv.position)
            })
            .collect::<Result<_, _>>()?;

        let width = FEATURE_NAMES.len();
        let vector_scalers: Vec<MinMaxScaler> = (0..width)
            .map(|slot| MinMaxScaler::fit(concatenated.iter().map(|row| row[slot])))
            .collect();

        let flat: Vec<f64> = concatenated
            .iter()
            .flat_map(|row| {
                row.iter()
                    .zip(&vector_scalers)
                    .map(|(v, scaler)| scaler.transform(*v))
            })
            .collect();
        let x = Array2::from_shape_vec((train.len(), width), flat).map_err(|_| {
            ModelError::DimensionMismatch {
                expected: width,
                got: concatenated.first().map_or(0, |r| r.len()),
            }
        })?;
        let y: Vec<bool> = train.iter().map(|fv| fv.label).collect();

        info!(
            "Fitting logistic regression on {} samples x {} features",
            train.len(),
            width
        );
        let (model, summary) = SdcaLogisticRegression::new(self.params).fit(&x, &y)?;

        Ok((
            FittedPipeline {
                column_scalers,
                vector_scalers,
                model,
                threshold: self.threshold,
            },
            summary,
        ))
    }
}
