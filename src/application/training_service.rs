//! Orchestrates dataset loading, model training and single-trade prediction.

use crate::application::ml::artifact::ARTIFACT_FORMAT_VERSION;
use crate::application::ml::split::train_test_split;
use crate::application::ml::{
    BinaryClassificationMetrics, ModelArtifact, OutcomePredictor, PipelineEstimator,
};
use crate::config::{BatchPolicy, TrainingEnvConfig};
use crate::domain::errors::DerivationError;
use crate::domain::ml::{DerivationConfig, FeatureDeriver};
use crate::domain::repositories::TradeDataSource;
use crate::domain::types::{FeatureVector, PredictionResult, TradeRecord};
use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Derived training data plus the trades dropped under [`BatchPolicy::Skip`].
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub features: Vec<FeatureVector>,
    pub skipped: Vec<SkippedTrade>,
}

#[derive(Debug, Clone)]
pub struct SkippedTrade {
    pub trade_id: i64,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifact: ModelArtifact,
    pub dataset: Dataset,
}

pub struct TrainingService {
    source: Arc<dyn TradeDataSource>,
    derivation: DerivationConfig,
    training: TrainingEnvConfig,
}

impl TrainingService {
    pub fn new(
        source: Arc<dyn TradeDataSource>,
        derivation: DerivationConfig,
        training: TrainingEnvConfig,
    ) -> Self {
        Self {
            source,
            derivation,
            training,
        }
    }

    /// Fetches trades and bars, then derives one labeled vector per trade.
    pub async fn load_dataset(&self) -> Result<Dataset> {
        let bars = self
            .source
            .fetch_bars()
            .await
            .context("Failed to fetch bars")?;
        let trades = self
            .source
            .fetch_trades()
            .await
            .context("Failed to fetch trades")?;
        info!("Loaded {} trades and {} bars", trades.len(), bars.len());

        let deriver = FeatureDeriver::new(bars, self.derivation);
        let dataset = derive_batch(&deriver, &trades, self.training.batch_policy)?;

        if !dataset.skipped.is_empty() {
            let ids: Vec<i64> = dataset.skipped.iter().map(|s| s.trade_id).collect();
            warn!("Skipped {} trades: {:?}", ids.len(), ids);
        }
        Ok(dataset)
    }

    /// Loads the dataset, fits the pipeline on the training part and scores
    /// it on the held-out part.
    pub async fn train(&self) -> Result<TrainingOutcome> {
        let dataset = self.load_dataset().await?;

        let split = train_test_split(
            &dataset.features,
            self.training.test_fraction,
            self.training.split_seed,
        )?;
        info!(
            "Split dataset: {} train / {} test (seed {})",
            split.train.len(),
            split.test.len(),
            self.training.split_seed
        );

        let estimator =
            PipelineEstimator::new(self.training.sdca, self.training.prediction_threshold);
        let (pipeline, summary) = estimator
            .fit(&split.train)
            .context("Failed to fit pipeline")?;

        let test_metrics = if split.test.is_empty() {
            warn!("Test set is empty, skipping evaluation");
            None
        } else {
            let predictions = pipeline.predict_batch(&split.test)?;
            let labels: Vec<bool> = split.test.iter().map(|fv| fv.label).collect();
            let probabilities: Vec<f64> = predictions.iter().map(|p| p.probability).collect();
            let metrics = BinaryClassificationMetrics::evaluate(
                &labels,
                &probabilities,
                self.training.prediction_threshold,
            );
            debug!("Test metrics: {:?}", metrics);
            Some(metrics)
        };

        let artifact = ModelArtifact {
            format_version: ARTIFACT_FORMAT_VERSION,
            trained_at: Utc::now(),
            feature_names: ModelArtifact::current_feature_names(),
            derivation: self.derivation,
            sdca: self.training.sdca,
            pipeline,
            training_summary: summary,
            training_samples: split.train.len(),
            test_samples: split.test.len(),
            test_metrics,
        };

        Ok(TrainingOutcome { artifact, dataset })
    }

    /// Scores the first queued trade, if there is one.
    ///
    /// Features are derived with the predictor's own derivation settings and
    /// the trade's label, if any, is ignored.
    pub async fn predict_queued(
        &self,
        predictor: &dyn OutcomePredictor,
    ) -> Result<Option<PredictionResult<TradeRecord>>> {
        let Some(trade) = self
            .source
            .fetch_queued_trade()
            .await
            .context("Failed to fetch queued trade")?
        else {
            info!("Prediction queue is empty");
            return Ok(None);
        };

        let bars = self
            .source
            .fetch_bars()
            .await
            .context("Failed to fetch bars")?;
        let deriver = FeatureDeriver::new(bars, predictor.derivation_config());
        let features = deriver
            .derive(&trade)
            .with_context(|| format!("Failed to derive features for queued trade {}", trade.id))?;

        let prediction = predictor.predict(&features)?;
        info!(
            "{} {} scored trade {}: probability {:.4}",
            predictor.name(),
            predictor.version(),
            trade.id,
            prediction.probability
        );
        Ok(Some(PredictionResult::new(trade, prediction)))
    }
}

/// Derives labeled vectors for `trades`, in order, applying `policy` to
/// records that fail.
pub fn derive_batch(
    deriver: &FeatureDeriver,
    trades: &[TradeRecord],
    policy: BatchPolicy,
) -> Result<Dataset, DerivationError> {
    match policy {
        BatchPolicy::Abort => Ok(Dataset {
            features: deriver.derive_all(trades)?,
            skipped: Vec::new(),
        }),
        BatchPolicy::Skip => {
            let mut dataset = Dataset::default();
            for trade in trades {
                match deriver.derive_labeled(trade) {
                    Ok(fv) => dataset.features.push(fv),
                    Err(e) => {
                        warn!("Skipping trade {}: {}", e.trade_id(), e);
                        dataset.skipped.push(SkippedTrade {
                            trade_id: e.trade_id(),
                            reason: e.to_string(),
                        });
                    }
                }
            }
            Ok(dataset)
        }
    }
}
