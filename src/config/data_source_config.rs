//! Data source configuration parsing from environment variables.

use anyhow::Result;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Where trade and bar history is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceKind {
    Sqlite,
    Csv,
}

impl FromStr for DataSourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(DataSourceKind::Sqlite),
            "csv" => Ok(DataSourceKind::Csv),
            _ => anyhow::bail!("Invalid DATA_SOURCE: {}. Must be 'sqlite' or 'csv'", s),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DataSourceEnvConfig {
    pub kind: DataSourceKind,
    pub database_url: String,
    pub trades_csv: PathBuf,
    pub bars_csv: PathBuf,
    pub queue_csv: Option<PathBuf>,
}

impl Default for DataSourceEnvConfig {
    fn default() -> Self {
        Self {
            kind: DataSourceKind::Sqlite,
            database_url: "sqlite://data/mt4.db".to_string(),
            trades_csv: PathBuf::from("data/trades.csv"),
            bars_csv: PathBuf::from("data/bars.csv"),
            queue_csv: None,
        }
    }
}

impl DataSourceEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let kind = match env::var("DATA_SOURCE") {
            Ok(v) => DataSourceKind::from_str(&v)?,
            Err(_) => defaults.kind,
        };

        Ok(Self {
            kind,
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            trades_csv: env::var("TRADES_CSV")
                .map(PathBuf::from)
                .unwrap_or(defaults.trades_csv),
            bars_csv: env::var("BARS_CSV")
                .map(PathBuf::from)
                .unwrap_or(defaults.bars_csv),
            queue_csv: env::var("QUEUE_CSV").ok().map(PathBuf::from),
        })
    }
}
