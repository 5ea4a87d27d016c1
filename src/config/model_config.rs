//! Classifier, labeling and model storage configuration.

use crate::application::ml::ensemble::ForestParameters;
use crate::application::ml::labeling::LabelingSettings;
use crate::domain::market::period::Period;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct ModelEnvConfig {
    pub model_dir: PathBuf,
    pub training_period: Period,
    pub reuse_models: bool,
    pub forest: ForestParameters,
    pub test_fraction: f64,
    pub labeling: LabelingSettings,
    pub tail_rows: usize,
}

impl Default for ModelEnvConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            training_period: Period::Years(5),
            reuse_models: false,
            forest: ForestParameters::default(),
            test_fraction: 0.2,
            labeling: LabelingSettings::default(),
            tail_rows: 5,
        }
    }
}

/// Parses `key` when set, falling back to `default` when absent.
fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Invalid {}: {}", key, raw)),
        None => Ok(default),
    }
}

impl ModelEnvConfig {
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let test_fraction = parse_or(&var, "TEST_FRACTION", defaults.test_fraction)?;
        if !(0.0..1.0).contains(&test_fraction) {
            anyhow::bail!("TEST_FRACTION must be in [0, 1), got {}", test_fraction);
        }
        let n_trees = parse_or(&var, "N_TREES", defaults.forest.n_trees)?;
        if n_trees == 0 {
            anyhow::bail!("N_TREES must be at least 1");
        }
        let horizon = parse_or(&var, "LABEL_HORIZON", defaults.labeling.horizon)?;
        if horizon == 0 {
            anyhow::bail!("LABEL_HORIZON must be at least 1");
        }

        Ok(Self {
            model_dir: var("MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_dir),
            training_period: parse_or(&var, "TRAINING_PERIOD", defaults.training_period)?,
            reuse_models: parse_or(&var, "REUSE_MODELS", defaults.reuse_models)?,
            forest: ForestParameters {
                n_trees,
                max_depth: parse_or(&var, "MAX_DEPTH", defaults.forest.max_depth)?,
                min_samples_split: parse_or(
                    &var,
                    "MIN_SAMPLES_SPLIT",
                    defaults.forest.min_samples_split,
                )?,
                seed: parse_or(&var, "TRAIN_SEED", defaults.forest.seed)?,
            },
            test_fraction,
            labeling: LabelingSettings {
                horizon,
                threshold: parse_or(&var, "LABEL_THRESHOLD", defaults.labeling.threshold)?,
            },
            tail_rows: parse_or(&var, "TAIL_ROWS", defaults.tail_rows)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_model_config_defaults() {
        let config = ModelEnvConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.training_period, Period::Years(5));
        assert!(!config.reuse_models);
        assert_eq!(config.forest.n_trees, 100);
        assert_eq!(config.forest.seed, 42);
        assert_eq!(config.labeling.horizon, 10);
    }

    #[test]
    fn test_model_config_overrides() {
        let config = ModelEnvConfig::from_lookup(lookup(&[
            ("TRAINING_PERIOD", "2y"),
            ("REUSE_MODELS", "true"),
            ("N_TREES", "25"),
            ("LABEL_THRESHOLD", "0.03"),
        ]))
        .unwrap();
        assert_eq!(config.training_period, Period::Years(2));
        assert!(config.reuse_models);
        assert_eq!(config.forest.n_trees, 25);
        assert_eq!(config.labeling.threshold, 0.03);
    }

    #[test]
    fn test_model_config_rejects_bad_values() {
        assert!(ModelEnvConfig::from_lookup(lookup(&[("N_TREES", "0")])).is_err());
        assert!(ModelEnvConfig::from_lookup(lookup(&[("N_TREES", "many")])).is_err());
        assert!(ModelEnvConfig::from_lookup(lookup(&[("TEST_FRACTION", "1.5")])).is_err());
        assert!(ModelEnvConfig::from_lookup(lookup(&[("TRAINING_PERIOD", "0y")])).is_err());
    }
}
