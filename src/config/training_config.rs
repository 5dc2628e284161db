//! Training configuration parsing from environment variables.
//!
//! Covers the split, the SDCA solver and how a batch reacts to records
//! whose features cannot be derived.

use crate::application::ml::SdcaParameters;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// What a training batch does with a record that fails derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    /// Fail the whole batch
    #[default]
    Abort,
    /// Log the record and continue without it
    Skip,
}

impl FromStr for BatchPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(BatchPolicy::Abort),
            "skip" => Ok(BatchPolicy::Skip),
            _ => anyhow::bail!("Invalid BATCH_POLICY: {}. Must be 'abort' or 'skip'", s),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrainingEnvConfig {
    pub test_fraction: f64,
    pub split_seed: u64,
    pub prediction_threshold: f64,
    pub batch_policy: BatchPolicy,
    pub model_path: PathBuf,
    pub sdca: SdcaParameters,
}

impl Default for TrainingEnvConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            split_seed: 42,
            prediction_threshold: 0.5,
            batch_policy: BatchPolicy::Abort,
            model_path: PathBuf::from("data/ml/model.json"),
            sdca: SdcaParameters::default(),
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Failed to parse {}={}", name, raw)),
        Err(_) => Ok(default),
    }
}

impl TrainingEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let test_fraction = parse_var("TEST_FRACTION", defaults.test_fraction)?;
        if !(0.0..1.0).contains(&test_fraction) {
            anyhow::bail!("TEST_FRACTION must be within [0, 1), got {}", test_fraction);
        }

        let sdca = SdcaParameters {
            l2_regularization: parse_var("SDCA_L2", defaults.sdca.l2_regularization)?,
            max_epochs: parse_var("SDCA_MAX_EPOCHS", defaults.sdca.max_epochs)?,
            convergence_tolerance: parse_var("SDCA_TOLERANCE", defaults.sdca.convergence_tolerance)?,
            seed: parse_var("SDCA_SEED", defaults.sdca.seed)?,
        };

        Ok(Self {
            test_fraction,
            split_seed: parse_var("SPLIT_SEED", defaults.split_seed)?,
            prediction_threshold: parse_var(
                "PREDICTION_THRESHOLD",
                defaults.prediction_threshold,
            )?,
            batch_policy: parse_var("BATCH_POLICY", defaults.batch_policy)?,
            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            sdca,
        })
    }
}
