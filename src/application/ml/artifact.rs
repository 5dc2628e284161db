use super::metrics::BinaryClassificationMetrics;
use super::pipeline::FittedPipeline;
use super::sdca::{SdcaParameters, SdcaTrainingSummary};
use crate::domain::errors::ModelError;
use crate::domain::ml::DerivationConfig;
use crate::domain::ml::feature_registry::{FEATURE_NAMES, NumericColumn};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Serialized form of a trained model.
///
/// Carries the derivation settings used to build the training set so the
/// prediction path derives features identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub trained_at: DateTime<Utc>,
    pub feature_names: Vec<String>,
    pub derivation: DerivationConfig,
    pub sdca: SdcaParameters,
    pub pipeline: FittedPipeline,
    pub training_summary: SdcaTrainingSummary,
    pub training_samples: usize,
    pub test_samples: usize,
    pub test_metrics: Option<BinaryClassificationMetrics>,
}

impl ModelArtifact {
    pub fn current_feature_names() -> Vec<String> {
        FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
    }

    /// Rejects artifacts built against a different input layout.
    pub fn check_schema(&self) -> Result<(), ModelError> {
        let current = Self::current_feature_names();
        if self.feature_names != current
            || self.pipeline.model.dimension() != current.len()
            || self.pipeline.vector_scalers.len() != current.len()
        {
            return Err(ModelError::FeatureSchemaMismatch {
                expected: self.feature_names.join(", "),
                actual: current.join(", "),
            });
        }

        // Column scalers are applied positionally.
        let fitted: Vec<&str> = self
            .pipeline
            .column_scalers
            .iter()
            .map(|(column, _)| column.name())
            .collect();
        let columns: Vec<&str> = NumericColumn::ALL.iter().map(|c| c.name()).collect();
        if fitted != columns {
            return Err(ModelError::FeatureSchemaMismatch {
                expected: fitted.join(", "),
                actual: columns.join(", "),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ml::PipelineEstimator;
    use crate::domain::types::{FeatureVector, Position};

    fn artifact() -> ModelArtifact {
        let train: Vec<FeatureVector> = (0..12)
            .map(|i| {
                let win = i % 2 == 0;
                FeatureVector {
                    position: if win { Position::Long } else { Position::Short },
                    sma_pos: if win { 1.0 } else { 0.0 },
                    body_ratio: 0.5 + i as f64 * 0.1,
                    sma200_dist: 1.0,
                    sma50_dist: 0.5,
                    sma21_dist: 0.2,
                    bar_ratio: if win { 2.0 } else { 0.5 },
                    num_of_reverse_bars: 1.0,
                    sma200_slope: 0.01 * i as f64,
                    sma50_slope: 0.0,
                    sma21_slope: 0.0,
                    bol_up_dist: 0.3,
                    bol_down_dist: 0.7,
                    label: win,
                }
            })
            .collect();
        let (pipeline, training_summary) = PipelineEstimator::default().fit(&train).unwrap();

        ModelArtifact {
            format_version: ARTIFACT_FORMAT_VERSION,
            trained_at: Utc::now(),
            feature_names: ModelArtifact::current_feature_names(),
            derivation: DerivationConfig::default(),
            sdca: SdcaParameters::default(),
            pipeline,
            training_summary,
            training_samples: train.len(),
            test_samples: 0,
            test_metrics: None,
        }
    }

    #[test]
    fn test_fresh_artifact_passes_schema_check() {
        assert_eq!(artifact().check_schema(), Ok(()));
    }

    #[test]
    fn test_missing_column_scalers_are_rejected() {
        let mut artifact = artifact();
        artifact.pipeline.column_scalers.clear();

        assert!(matches!(
            artifact.check_schema(),
            Err(ModelError::FeatureSchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_reordered_column_scalers_are_rejected() {
        let mut artifact = artifact();
        artifact.pipeline.column_scalers.reverse();

        let Err(ModelError::FeatureSchemaMismatch { expected, actual }) = artifact.check_schema()
        else {
            panic!("reordered scalers were accepted");
        };
        assert!(expected.starts_with("bolDownDist"));
        assert!(actual.starts_with("bodyRatio"));
    }

    #[test]
    fn test_feature_name_drift_is_rejected() {
        let mut artifact = artifact();
        artifact.feature_names.swap(0, 1);
        assert!(artifact.check_schema().is_err());
    }
}
