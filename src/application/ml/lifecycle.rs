use super::labeling::LabelGenerator;
use super::trainer::ClassifierTrainer;
use crate::domain::analysis::indicator_frame::IndicatorFrame;
use crate::domain::errors::{EvaluationError, StorageError};
use crate::domain::ml::artifact::ModelArtifact;
use crate::domain::ml::feature_registry::FeatureSchema;
use crate::domain::repositories::ModelRepository;
use chrono::Utc;
use tracing::{info, warn};

/// Reported in place of a fingerprint when the stored schema tag cannot be read
pub const UNREADABLE_SCHEMA: &str = "unreadable";

/// Where the model used for a prediction came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Stored artifact with a matching schema tag
    Reused,
    /// Freshly trained, nothing usable was stored
    Trained,
    /// Freshly trained after discarding an artifact with another schema
    Retrained { stale_schema: String },
}

/// Result of looking up a stored model
#[derive(Debug)]
pub enum StoredModel {
    Usable(ModelArtifact),
    Discarded { stale_schema: String },
    Missing,
}

/// Owns the stored-model policy: schema-checked reuse, invalidation and
/// retraining.
pub struct ModelLifecycle<'a> {
    repository: &'a dyn ModelRepository,
    labeler: LabelGenerator,
    trainer: &'a ClassifierTrainer,
}

impl<'a> ModelLifecycle<'a> {
    pub fn new(
        repository: &'a dyn ModelRepository,
        labeler: LabelGenerator,
        trainer: &'a ClassifierTrainer,
    ) -> Self {
        Self {
            repository,
            labeler,
            trainer,
        }
    }

    /// Loads the stored artifact for `symbol` if its schema tag matches the
    /// current schema. The tag is read before the classifier, so artifacts
    /// from older layouts are recognised as stale. Stale or unreadable
    /// artifacts are deleted, never reused.
    pub fn load_current(&self, symbol: &str) -> Result<StoredModel, EvaluationError> {
        let schema = match self.repository.load_schema(symbol) {
            Ok(Some(schema)) => schema,
            Ok(None) => return Ok(StoredModel::Missing),
            Err(StorageError::Corrupt { source, .. }) => {
                return self.discard(symbol, UNREADABLE_SCHEMA, &source);
            }
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = FeatureSchema::current().verify(&schema) {
            return self.discard(symbol, &schema.fingerprint(), &e);
        }

        match self.repository.load(symbol) {
            Ok(Some(artifact)) => {
                info!(
                    "{}: reusing model trained at {}",
                    symbol,
                    artifact.trained_at.to_rfc3339()
                );
                Ok(StoredModel::Usable(artifact))
            }
            Ok(None) => Ok(StoredModel::Missing),
            Err(StorageError::Corrupt { source, .. }) => {
                self.discard(symbol, &schema.fingerprint(), &source)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn discard(
        &self,
        symbol: &str,
        stale_schema: &str,
        reason: &dyn std::fmt::Display,
    ) -> Result<StoredModel, EvaluationError> {
        warn!("{}: discarding stored model. {}", symbol, reason);
        self.repository.delete(symbol)?;
        Ok(StoredModel::Discarded {
            stale_schema: stale_schema.to_string(),
        })
    }

    /// Removes whatever is stored for `symbol` so the next artifact is built
    /// from scratch.
    pub fn invalidate(&self, symbol: &str) -> Result<(), EvaluationError> {
        self.repository.delete(symbol)?;
        Ok(())
    }

    /// Labels `frame`, trains a fresh classifier and stores it.
    pub fn train_and_store(
        &self,
        symbol: &str,
        frame: &IndicatorFrame,
    ) -> Result<ModelArtifact, EvaluationError> {
        let dataset = self.labeler.generate(frame)?;
        let outcome = self.trainer.train(&dataset)?;

        let artifact = ModelArtifact {
            symbol: symbol.to_string(),
            schema: FeatureSchema::current(),
            trained_at: Utc::now(),
            forest: self.trainer.settings().forest.clone(),
            labeling: self.labeler.settings(),
            report: outcome.report,
            classifier: outcome.classifier,
        };

        self.repository.save(&artifact)?;
        info!(
            "{}: stored model ({} train / {} test samples)",
            symbol, artifact.report.train_samples, artifact.report.test_samples
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ml::labeling::LabelingSettings;
    use crate::application::ml::trainer::TrainerSettings;
    use crate::infrastructure::persistence::InMemoryModelRepository;

    fn check(repo: &InMemoryModelRepository, symbol: &str) -> StoredModel {
        let trainer = ClassifierTrainer::new(TrainerSettings::default());
        let lifecycle = ModelLifecycle::new(
            repo,
            LabelGenerator::new(LabelingSettings::default()),
            &trainer,
        );
        lifecycle.load_current(symbol).unwrap()
    }

    #[test]
    fn test_nothing_stored_is_missing() {
        let repo = InMemoryModelRepository::new();
        assert!(matches!(check(&repo, "TCS"), StoredModel::Missing));
    }

    #[test]
    fn test_older_layout_is_discarded_by_schema_tag() {
        let repo = InMemoryModelRepository::new();
        repo.insert_raw(
            "TCS",
            r#"{"symbol":"TCS","schema":{"version":1,"names":["SMA_50","RSI"]},"classifier":{"trees":[]}}"#
                .to_string(),
        );

        match check(&repo, "TCS") {
            StoredModel::Discarded { stale_schema } => assert_eq!(stale_schema, "v1:SMA_50,RSI"),
            other => panic!("expected discard, got {:?}", other),
        }
        assert!(!repo.contains("TCS"));
    }

    #[test]
    fn test_unreadable_artifact_is_discarded() {
        let repo = InMemoryModelRepository::new();
        repo.insert_raw("TCS", "{not json".to_string());

        match check(&repo, "TCS") {
            StoredModel::Discarded { stale_schema } => {
                assert_eq!(stale_schema, UNREADABLE_SCHEMA)
            }
            other => panic!("expected discard, got {:?}", other),
        }
        assert!(!repo.contains("TCS"));
    }

    #[test]
    fn test_current_schema_with_broken_body_is_discarded() {
        let repo = InMemoryModelRepository::new();
        let current = FeatureSchema::current();
        let json = format!(
            r#"{{"symbol":"TCS","schema":{},"classifier":{{}}}}"#,
            serde_json::to_string(&current).unwrap()
        );
        repo.insert_raw("TCS", json);

        match check(&repo, "TCS") {
            StoredModel::Discarded { stale_schema } => {
                assert_eq!(stale_schema, current.fingerprint())
            }
            other => panic!("expected discard, got {:?}", other),
        }
        assert!(!repo.contains("TCS"));
    }
}
