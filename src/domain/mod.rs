// Core record types
pub mod types;

// Feature derivation and model input layout
pub mod ml;

// Data access interfaces
pub mod repositories;

// Domain-specific error types
pub mod errors;
