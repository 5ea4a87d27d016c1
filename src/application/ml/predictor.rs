use crate::application::indicators::engine::WARMUP_ROWS;
use crate::domain::analysis::indicator_frame::IndicatorFrame;
use crate::domain::analysis::recommendation::{MlDecision, MlRecommendation};
use crate::domain::errors::EvaluationError;
use crate::domain::ml::artifact::ModelArtifact;
use crate::domain::ml::feature_registry::FeatureSchema;
use tracing::info;

/// Interface for Machine Learning models
pub trait MlPredictor {
    /// Classify the most recent complete feature row of `frame`
    fn predict(&self, frame: &IndicatorFrame) -> Result<MlRecommendation, EvaluationError>;

    /// Get model name/type
    fn name(&self) -> &str;

    /// Get model version/id
    fn version(&self) -> String;
}

/// Predictor backed by a persisted bagged forest.
pub struct ForestPredictor {
    artifact: ModelArtifact,
}

impl ForestPredictor {
    /// Binds an artifact to the current feature schema. Fails with
    /// `SchemaMismatch` if the artifact was trained on any other schema.
    pub fn new(artifact: ModelArtifact) -> Result<Self, EvaluationError> {
        FeatureSchema::current().verify(&artifact.schema)?;
        Ok(Self { artifact })
    }
}

impl MlPredictor for ForestPredictor {
    fn predict(&self, frame: &IndicatorFrame) -> Result<MlRecommendation, EvaluationError> {
        let (row, features) = frame
            .latest_complete()
            .and_then(|row| row.feature_vector().map(|f| (row, f)))
            .ok_or(EvaluationError::InsufficientData {
                stage: "prediction",
                required: WARMUP_ROWS,
                available: frame.len(),
            })?;

        let p_buy = self
            .artifact
            .classifier
            .predict_proba(&[features.to_vec()])?
            .first()
            .copied()
            .unwrap_or(0.0);

        // Ties resolve to NO BUY, matching the ensemble's majority vote.
        let decision = MlDecision::from_class(u32::from(p_buy > 0.5));
        let confidence = match decision {
            MlDecision::Buy => p_buy,
            MlDecision::NoBuy => 1.0 - p_buy,
        };

        info!(
            "{}: {} with confidence {:.2}% ({} model {})",
            frame.symbol,
            decision,
            confidence * 100.0,
            self.name(),
            self.version()
        );

        Ok(MlRecommendation {
            decision,
            confidence,
            as_of: row.timestamp,
        })
    }

    fn name(&self) -> &str {
        "Bagged Decision Trees"
    }

    fn version(&self) -> String {
        format!(
            "{}@{}",
            self.artifact.schema.fingerprint(),
            self.artifact.trained_at.to_rfc3339()
        )
    }
}
