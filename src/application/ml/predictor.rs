use crate::domain::errors::ModelError;
use crate::domain::ml::DerivationConfig;
use crate::domain::types::{FeatureVector, Prediction};

/// Interface for trade outcome classifiers
pub trait OutcomePredictor: Send + Sync {
    /// Predicted label, probability (0.0 to 1.0) and raw score.
    /// Probability >= threshold means the trade is expected to be profitable.
    fn predict(&self, features: &FeatureVector) -> Result<Prediction, ModelError>;

    /// Derivation settings the model was trained with
    fn derivation_config(&self) -> DerivationConfig;

    /// Get model name/type
    fn name(&self) -> &str;

    /// Get model version/id
    fn version(&self) -> &str;
}
