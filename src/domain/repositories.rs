//! Repository Pattern Abstractions
//!
//! Trained models are persisted per stock symbol so later runs can reuse
//! them. Implementations do not check schemas; the caller compares the
//! stored schema tag before reuse and deletes stale artifacts.
//!
//! Two runs on the same symbol must not overlap: `save` and `delete` are
//! unsynchronized read-modify-write operations on one key.

use crate::domain::errors::StorageError;
use crate::domain::ml::artifact::ModelArtifact;
use crate::domain::ml::feature_registry::FeatureSchema;

pub trait ModelRepository: Send + Sync {
    fn save(&self, artifact: &ModelArtifact) -> Result<(), StorageError>;

    /// `Ok(None)` when nothing is stored under `symbol`.
    fn load(&self, symbol: &str) -> Result<Option<ModelArtifact>, StorageError>;

    /// Reads only the schema tag of the stored artifact.
    fn load_schema(&self, symbol: &str) -> Result<Option<FeatureSchema>, StorageError>;

    /// Deleting a missing artifact is not an error.
    fn delete(&self, symbol: &str) -> Result<(), StorageError>;
}
