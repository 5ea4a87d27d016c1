// Indicator computation
pub mod indicators;

// Rule-based decision path
pub mod scoring;

// Classifier decision path
pub mod ml;

// Orchestration
pub mod pipeline;
