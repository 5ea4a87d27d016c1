pub mod ensemble;
pub mod labeling;
pub mod lifecycle;
pub mod metrics;
pub mod predictor;
pub mod trainer;
