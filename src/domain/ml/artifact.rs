use crate::application::ml::ensemble::{BaggedForest, ForestParameters};
use crate::application::ml::labeling::LabelingSettings;
use crate::application::ml::trainer::TrainingReport;
use crate::domain::ml::feature_registry::FeatureSchema;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A trained classifier together with the schema it was trained on.
///
/// The schema tag is compared against `FeatureSchema::current()` before
/// any reuse; the classifier itself is never consulted on a mismatch.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub symbol: String,
    pub schema: FeatureSchema,
    pub trained_at: DateTime<Utc>,
    pub forest: ForestParameters,
    pub labeling: LabelingSettings,
    pub report: TrainingReport,
    pub classifier: BaggedForest,
}

/// Leading part of a stored artifact. Decodes from any artifact layout
/// that still carries a schema tag, so stale files can be recognised
/// without decoding their classifier.
#[derive(Debug, Deserialize)]
pub struct ArtifactHeader {
    pub schema: FeatureSchema,
}
