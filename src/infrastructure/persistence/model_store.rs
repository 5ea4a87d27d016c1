//! JSON persistence for trained models.
//!
//! One file per symbol: `<model_dir>/<SYMBOL>_model.json`.

use crate::domain::errors::StorageError;
use crate::domain::ml::artifact::{ArtifactHeader, ModelArtifact};
use crate::domain::ml::feature_registry::FeatureSchema;
use crate::domain::repositories::ModelRepository;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct JsonModelRepository {
    model_dir: PathBuf,
}

impl JsonModelRepository {
    pub fn new(model_dir: impl Into<PathBuf>) -> Result<Self> {
        let model_dir = model_dir.into();
        if !model_dir.exists() {
            fs::create_dir_all(&model_dir).with_context(|| {
                format!("Failed to create model directory {:?}", model_dir)
            })?;
        }
        Ok(Self { model_dir })
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.model_dir.join(format!("{}_model.json", symbol))
    }

    fn read_stored(&self, symbol: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(symbol);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No stored model at {:?}", path);
                Ok(None)
            }
            Err(source) => Err(StorageError::Io {
                key: symbol.to_string(),
                source,
            }),
        }
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }
}

fn decode<T: DeserializeOwned>(symbol: &str, content: &str) -> Result<T, StorageError> {
    serde_json::from_str(content).map_err(|source| StorageError::Corrupt {
        key: symbol.to_string(),
        source,
    })
}

impl ModelRepository for JsonModelRepository {
    fn save(&self, artifact: &ModelArtifact) -> Result<(), StorageError> {
        let key = artifact.symbol.clone();
        let path = self.path_for(&artifact.symbol);
        let content = serde_json::to_string(artifact).map_err(|source| StorageError::Corrupt {
            key: key.clone(),
            source,
        })?;

        // Atomic write: write to temp file then rename
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content).map_err(|source| StorageError::Io {
            key: key.clone(),
            source,
        })?;
        fs::rename(&temp_path, &path).map_err(|source| StorageError::Io { key, source })?;

        info!("Saved model to {:?}", path);
        Ok(())
    }

    fn load(&self, symbol: &str) -> Result<Option<ModelArtifact>, StorageError> {
        let Some(content) = self.read_stored(symbol)? else {
            return Ok(None);
        };
        let artifact: ModelArtifact = decode(symbol, &content)?;

        info!("Loaded model from {:?}", self.path_for(symbol));
        Ok(Some(artifact))
    }

    fn load_schema(&self, symbol: &str) -> Result<Option<FeatureSchema>, StorageError> {
        let Some(content) = self.read_stored(symbol)? else {
            return Ok(None);
        };
        let header: ArtifactHeader = decode(symbol, &content)?;
        Ok(Some(header.schema))
    }

    fn delete(&self, symbol: &str) -> Result<(), StorageError> {
        let path = self.path_for(symbol);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Deleted stored model {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: symbol.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ml::ensemble::{BaggedForest, ForestParameters};
    use crate::application::ml::labeling::LabelingSettings;
    use crate::application::ml::trainer::TrainingReport;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static TEST_COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn create_test_repository() -> (JsonModelRepository, PathBuf) {
        let unique_id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_dir = std::env::temp_dir().join(format!(
            "stockscore_test_{}_{}_{}_models",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0),
            unique_id
        ));
        let repo = JsonModelRepository::new(&temp_dir).expect("Failed to create test repository");
        (repo, temp_dir)
    }

    fn cleanup_test_dir(temp_dir: PathBuf) {
        fs::remove_dir_all(temp_dir).ok();
    }

    fn artifact(symbol: &str) -> ModelArtifact {
        ModelArtifact {
            symbol: symbol.to_string(),
            schema: FeatureSchema::current(),
            trained_at: chrono::Utc::now(),
            forest: ForestParameters::default(),
            labeling: LabelingSettings::default(),
            report: TrainingReport {
                train_samples: 10,
                test_samples: 3,
                evaluation: None,
                degenerate: Some(0),
            },
            classifier: BaggedForest::constant(0),
        }
    }

    #[test]
    fn test_load_nonexistent_returns_none() {
        let (repo, temp_dir) = create_test_repository();
        assert!(repo.load("RELIANCE").unwrap().is_none());
        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_save_load_delete() {
        let (repo, temp_dir) = create_test_repository();

        repo.save(&artifact("TCS")).unwrap();
        assert!(repo.path_for("TCS").exists());
        assert!(!repo.path_for("TCS").with_extension("tmp").exists());

        let loaded = repo.load("TCS").unwrap().expect("artifact should exist");
        assert_eq!(loaded.symbol, "TCS");
        assert_eq!(loaded.schema, FeatureSchema::current());
        assert_eq!(loaded.report.train_samples, 10);

        repo.delete("TCS").unwrap();
        assert!(repo.load("TCS").unwrap().is_none());
        // Deleting twice is fine
        repo.delete("TCS").unwrap();

        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_symbols_are_isolated() {
        let (repo, temp_dir) = create_test_repository();

        repo.save(&artifact("INFY")).unwrap();
        assert!(repo.load("WIPRO").unwrap().is_none());
        repo.delete("WIPRO").unwrap();
        assert!(repo.load("INFY").unwrap().is_some());

        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let (repo, temp_dir) = create_test_repository();

        fs::write(repo.path_for("BAD"), "{not json").unwrap();
        assert!(matches!(
            repo.load("BAD"),
            Err(StorageError::Corrupt { .. })
        ));

        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_schema_readable_from_older_layout() {
        let (repo, temp_dir) = create_test_repository();

        fs::write(
            repo.path_for("OLD"),
            r#"{"symbol":"OLD","schema":{"version":1,"names":["SMA_50","RSI"]},"classifier":{"trees":[]}}"#,
        )
        .unwrap();

        assert!(matches!(repo.load("OLD"), Err(StorageError::Corrupt { .. })));
        let schema = repo.load_schema("OLD").unwrap().unwrap();
        assert_eq!(schema.version, 1);
        assert_eq!(schema.names, vec!["SMA_50", "RSI"]);
        assert!(repo.load_schema("NONE").unwrap().is_none());

        cleanup_test_dir(temp_dir);
    }
}
