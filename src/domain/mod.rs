// Indicator frames and recommendations
pub mod analysis;

// Price history
pub mod market;

// Feature schema and model artifacts
pub mod ml;

// Port interfaces
pub mod ports;

// Repository traits
pub mod repositories;

// Domain-specific error types
pub mod errors;
