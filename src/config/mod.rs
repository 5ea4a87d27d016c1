//! Configuration module for stockscore.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: price history source and model lifecycle.

mod market_data_config;
mod model_config;

pub use market_data_config::{DataSource, MarketDataEnvConfig};
pub use model_config::ModelEnvConfig;

use crate::application::ml::trainer::TrainerSettings;
use crate::application::pipeline::PipelineSettings;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub market_data: MarketDataEnvConfig,
    pub model: ModelEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            market_data: MarketDataEnvConfig::from_lookup(&var)
                .context("Failed to load market data config")?,
            model: ModelEnvConfig::from_lookup(&var).context("Failed to load model config")?,
        })
    }

    pub fn model_dir(&self) -> &PathBuf {
        &self.model.model_dir
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            training_period: self.model.training_period,
            reuse_models: self.model.reuse_models,
            labeling: self.model.labeling,
            trainer: TrainerSettings {
                forest: self.model.forest.clone(),
                test_fraction: self.model.test_fraction,
            },
            tail_rows: self.model.tail_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::period::Period;

    #[test]
    fn test_config_from_lookup_defaults() {
        let config = Config::from_lookup(|_| None).expect("Should parse with defaults");
        assert_eq!(config.market_data.data_source, DataSource::Yahoo);

        let settings = config.pipeline_settings();
        assert_eq!(settings.training_period, Period::Years(5));
        assert_eq!(settings.trainer.test_fraction, 0.2);
        assert_eq!(settings.tail_rows, 5);
    }

    #[test]
    fn test_config_error_names_the_section() {
        let err = Config::from_lookup(|k| (k == "MAX_DEPTH").then(|| "deep".to_string()))
            .unwrap_err();
        assert!(format!("{:#}", err).contains("model config"));
    }
}
