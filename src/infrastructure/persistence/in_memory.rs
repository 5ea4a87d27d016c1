//! In-memory model repository.
//!
//! Artifacts are kept as serialized JSON, so a load yields an independent
//! copy exactly like the file-backed repository does. Data is lost when the
//! process exits; intended for tests and dry runs. Clones share storage.

use crate::domain::errors::StorageError;
use crate::domain::ml::artifact::{ArtifactHeader, ModelArtifact};
use crate::domain::ml::feature_registry::FeatureSchema;
use crate::domain::repositories::ModelRepository;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Clone, Default)]
pub struct InMemoryModelRepository {
    artifacts: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryModelRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.artifacts
            .read()
            .map(|a| a.contains_key(symbol))
            .unwrap_or(false)
    }

    fn decode<T: DeserializeOwned>(&self, symbol: &str) -> Result<Option<T>, StorageError> {
        let artifacts = self.artifacts.read().map_err(|_| poisoned(symbol))?;
        artifacts
            .get(symbol)
            .map(|json| {
                serde_json::from_str(json).map_err(|source| StorageError::Corrupt {
                    key: symbol.to_string(),
                    source,
                })
            })
            .transpose()
    }

    /// Stores raw JSON under `symbol`, bypassing serialization.
    pub fn insert_raw(&self, symbol: &str, json: String) {
        if let Ok(mut artifacts) = self.artifacts.write() {
            artifacts.insert(symbol.to_string(), json);
        }
    }
}

fn poisoned(key: &str) -> StorageError {
    StorageError::Io {
        key: key.to_string(),
        source: std::io::Error::other("model store lock poisoned"),
    }
}

impl ModelRepository for InMemoryModelRepository {
    fn save(&self, artifact: &ModelArtifact) -> Result<(), StorageError> {
        let json = serde_json::to_string(artifact).map_err(|source| StorageError::Corrupt {
            key: artifact.symbol.clone(),
            source,
        })?;
        self.artifacts
            .write()
            .map_err(|_| poisoned(&artifact.symbol))?
            .insert(artifact.symbol.clone(), json);
        Ok(())
    }

    fn load(&self, symbol: &str) -> Result<Option<ModelArtifact>, StorageError> {
        self.decode(symbol)
    }

    fn load_schema(&self, symbol: &str) -> Result<Option<FeatureSchema>, StorageError> {
        Ok(self.decode::<ArtifactHeader>(symbol)?.map(|h| h.schema))
    }

    fn delete(&self, symbol: &str) -> Result<(), StorageError> {
        self.artifacts
            .write()
            .map_err(|_| poisoned(symbol))?
            .remove(symbol);
        Ok(())
    }
}
