use super::artifact::ModelArtifact;
use super::predictor::OutcomePredictor;
use crate::domain::errors::ModelError;
use crate::domain::ml::DerivationConfig;
use crate::domain::types::{FeatureVector, Prediction};
use tracing::info;

/// Predictor backed by a trained [`ModelArtifact`].
pub struct PipelinePredictor {
    artifact: ModelArtifact,
    version: String,
}

impl PipelinePredictor {
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        artifact.check_schema()?;
        let version = format!(
            "v{}-{}",
            artifact.format_version,
            artifact.trained_at.format("%Y%m%dT%H%M%S")
        );
        info!(
            "Loaded model {} ({} training samples)",
            version, artifact.training_samples
        );
        Ok(Self { artifact, version })
    }
}

impl OutcomePredictor for PipelinePredictor {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction, ModelError> {
        self.artifact.pipeline.predict(features)
    }

    fn derivation_config(&self) -> DerivationConfig {
        self.artifact.derivation
    }

    fn name(&self) -> &str {
        "SDCA Logistic Regression"
    }

    fn version(&self) -> &str {
        &self.version
    }
}
