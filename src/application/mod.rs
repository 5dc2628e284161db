// Model pipeline, evaluation and persistence format
pub mod ml;

// Orchestration over a data source
pub mod training_service;

pub use training_service::{Dataset, SkippedTrade, TrainingOutcome, TrainingService};
