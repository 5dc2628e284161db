pub mod artifact;
pub mod metrics;
pub mod pipeline;
pub mod pipeline_predictor;
pub mod predictor;
pub mod reporting;
pub mod sdca;
pub mod split;

pub use artifact::ModelArtifact;
pub use metrics::BinaryClassificationMetrics;
pub use pipeline::{FittedPipeline, PipelineEstimator};
pub use pipeline_predictor::PipelinePredictor;
pub use predictor::OutcomePredictor;
pub use sdca::{SdcaLogisticRegression, SdcaParameters};
