pub mod engine;
pub mod smoothing;

pub use engine::IndicatorEngine;
