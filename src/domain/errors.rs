use thiserror::Error;

/// Errors raised while turning a trade record into a feature vector
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DerivationError {
    #[error("Entry bar missing for trade {trade_id}")]
    MissingEntryBar { trade_id: i64 },

    #[error("Degenerate window for trade {trade_id}: average body height is zero")]
    DegenerateWindow { trade_id: i64 },

    #[error("Invalid position '{value}' on trade {trade_id}")]
    InvalidPosition { trade_id: i64, value: String },

    #[error("Non-finite value in field {field} on trade {trade_id}")]
    NonFiniteField { trade_id: i64, field: &'static str },

    #[error("Trade {trade_id} has no outcome label")]
    MissingLabel { trade_id: i64 },
}

impl DerivationError {
    /// Identifier of the trade that failed.
    pub fn trade_id(&self) -> i64 {
        match self {
            DerivationError::MissingEntryBar { trade_id }
            | DerivationError::DegenerateWindow { trade_id }
            | DerivationError::InvalidPosition { trade_id, .. }
            | DerivationError::NonFiniteField { trade_id, .. }
            | DerivationError::MissingLabel { trade_id } => *trade_id,
        }
    }
}

/// Errors related to fitting and applying the classifier
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Feature schema mismatch: model expects [{expected}], build provides [{actual}]")]
    FeatureSchemaMismatch { expected: String, actual: String },
}
