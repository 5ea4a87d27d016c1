use crate::domain::errors::EvaluationError;
use serde::{Deserialize, Serialize};

/// Ordered list of feature names.
/// This order MUST match between training and inference.
/// Any change here is a breaking change for persisted models: bump
/// `FEATURE_SCHEMA_VERSION` alongside it.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "SMA_50",
    "SMA_200",
    "EMA_50",
    "EMA_200",
    "RSI",
    "MACD",
    "Signal_Line",
];

pub const FEATURE_COUNT: usize = 7;

pub const FEATURE_SCHEMA_VERSION: u32 = 2;

/// One row of classifier input, in `FEATURE_NAMES` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }
}

/// Schema tag persisted next to every trained model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub version: u32,
    pub names: Vec<String>,
}

impl FeatureSchema {
    pub fn current() -> Self {
        Self {
            version: FEATURE_SCHEMA_VERSION,
            names: FEATURE_NAMES.iter().map(|n| n.to_string()).collect(),
        }
    }

    pub fn fingerprint(&self) -> String {
        format!("v{}:{}", self.version, self.names.join(","))
    }

    /// Fails unless `found` is exactly this schema: same version, same
    /// members, same order.
    pub fn verify(&self, found: &FeatureSchema) -> Result<(), EvaluationError> {
        if self == found {
            return Ok(());
        }
        Err(EvaluationError::SchemaMismatch {
            expected: self.fingerprint(),
            found: found.fingerprint(),
        })
    }
}
