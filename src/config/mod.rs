//! Configuration module for tradelogit.
//!
//! Settings come from environment variables (optionally loaded from `.env`
//! by the binaries through `dotenvy`), grouped by concern: data source,
//! feature derivation and training.

mod data_source_config;
mod derivation_config;
mod training_config;

pub use data_source_config::{DataSourceEnvConfig, DataSourceKind};
pub use derivation_config::DerivationEnvConfig;
pub use training_config::{BatchPolicy, TrainingEnvConfig};

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub data_source: DataSourceEnvConfig,
    pub derivation: DerivationEnvConfig,
    pub training: TrainingEnvConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let data_source =
            DataSourceEnvConfig::from_env().context("Failed to load data source config")?;
        let derivation =
            DerivationEnvConfig::from_env().context("Failed to load derivation config")?;
        let training = TrainingEnvConfig::from_env().context("Failed to load training config")?;

        Ok(Self {
            data_source,
            derivation,
            training,
        })
    }
}
