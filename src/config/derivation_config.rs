//! Feature derivation configuration parsing from environment variables.

use crate::domain::ml::{BodyAverageDivisor, DegenerateWindowPolicy, DerivationConfig};
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default)]
pub struct DerivationEnvConfig {
    pub derivation: DerivationConfig,
}

impl DerivationEnvConfig {
    /// `BODY_AVERAGE_DIVISOR` selects `fixed` or `window_count`.
    /// `DEGENERATE_WINDOW_SENTINEL`, when set, replaces the error on a
    /// zero-body window with that value.
    pub fn from_env() -> Result<Self> {
        let divisor = match env::var("BODY_AVERAGE_DIVISOR") {
            Ok(v) => BodyAverageDivisor::from_str(&v)?,
            Err(_) => BodyAverageDivisor::default(),
        };

        let degenerate_window = match env::var("DEGENERATE_WINDOW_SENTINEL") {
            Ok(v) => {
                let value = v
                    .trim()
                    .parse::<f64>()
                    .with_context(|| format!("Failed to parse DEGENERATE_WINDOW_SENTINEL={}", v))?;
                if !value.is_finite() {
                    anyhow::bail!("DEGENERATE_WINDOW_SENTINEL must be finite, got {}", v);
                }
                DegenerateWindowPolicy::Sentinel(value)
            }
            Err(_) => DegenerateWindowPolicy::Error,
        };

        Ok(Self {
            derivation: DerivationConfig {
                divisor,
                degenerate_window,
            },
        })
    }
}
