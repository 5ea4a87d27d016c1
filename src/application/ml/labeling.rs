use crate::application::indicators::engine::WARMUP_ROWS;
use crate::domain::analysis::indicator_frame::IndicatorFrame;
use crate::domain::errors::EvaluationError;
use crate::domain::ml::feature_registry::FeatureVector;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Forward-return labeling policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelingSettings {
    /// Rows to look ahead
    pub horizon: usize,
    /// Minimum relative rise for a positive label (0.05 = 5%)
    pub threshold: f64,
}

impl Default for LabelingSettings {
    fn default() -> Self {
        Self {
            horizon: 10,
            threshold: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledRow {
    pub timestamp: i64,
    pub features: FeatureVector,
    pub target: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledDataset {
    pub symbol: String,
    pub rows: Vec<LabeledRow>,
}

impl LabeledDataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// (negatives, positives)
    pub fn class_counts(&self) -> (usize, usize) {
        let positives = self.rows.iter().filter(|r| r.target == 1).count();
        (self.rows.len() - positives, positives)
    }

    pub fn features(&self) -> Vec<Vec<f64>> {
        self.rows.iter().map(|r| r.features.to_vec()).collect()
    }

    pub fn targets(&self) -> Vec<u32> {
        self.rows.iter().map(|r| r.target).collect()
    }
}

/// Builds the supervised training set: Target(t) = 1 iff the close
/// `horizon` rows later exceeds close(t) × (1 + threshold).
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelGenerator {
    settings: LabelingSettings,
}

impl LabelGenerator {
    pub fn new(settings: LabelingSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> LabelingSettings {
        self.settings
    }

    pub fn generate(&self, frame: &IndicatorFrame) -> Result<LabeledDataset, EvaluationError> {
        let horizon = self.settings.horizon;
        let multiplier = 1.0 + self.settings.threshold;

        let rows: Vec<LabeledRow> = frame
            .rows
            .iter()
            .zip(frame.rows.iter().skip(horizon))
            .filter_map(|(row, future)| {
                let features = row.feature_vector()?;
                let target = u32::from(future.close > row.close * multiplier);
                Some(LabeledRow {
                    timestamp: row.timestamp,
                    features,
                    target,
                })
            })
            .collect();

        if rows.is_empty() {
            return Err(EvaluationError::InsufficientData {
                stage: "labeling",
                required: WARMUP_ROWS + horizon,
                available: frame.len(),
            });
        }

        let dataset = LabeledDataset {
            symbol: frame.symbol.clone(),
            rows,
        };
        let (negatives, positives) = dataset.class_counts();
        info!(
            "{}: labeled {} rows ({} positive, {} negative)",
            dataset.symbol,
            dataset.len(),
            positives,
            negatives
        );
        Ok(dataset)
    }
}
