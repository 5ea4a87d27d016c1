//! Price history source configuration parsing from environment variables.

use anyhow::Result;
use std::path::PathBuf;
use std::str::FromStr;

/// Where daily price history comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Yahoo,
    Csv,
}

impl FromStr for DataSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" => Ok(DataSource::Yahoo),
            "csv" => Ok(DataSource::Csv),
            _ => anyhow::bail!("Invalid DATA_SOURCE: {}. Must be 'yahoo' or 'csv'", s),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarketDataEnvConfig {
    pub data_source: DataSource,
    pub exchange_suffix: String,
    pub yahoo_base_url: String,
    pub price_data_dir: PathBuf,
}

impl Default for MarketDataEnvConfig {
    fn default() -> Self {
        Self {
            data_source: DataSource::Yahoo,
            exchange_suffix: ".NS".to_string(),
            yahoo_base_url: "https://query1.finance.yahoo.com".to_string(),
            price_data_dir: PathBuf::from("data/prices"),
        }
    }
}

impl MarketDataEnvConfig {
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let data_source = match var("DATA_SOURCE") {
            Some(s) => DataSource::from_str(&s)?,
            None => defaults.data_source,
        };

        Ok(Self {
            data_source,
            exchange_suffix: var("EXCHANGE_SUFFIX").unwrap_or(defaults.exchange_suffix),
            yahoo_base_url: var("YAHOO_BASE_URL").unwrap_or(defaults.yahoo_base_url),
            price_data_dir: var("PRICE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.price_data_dir),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_data_defaults() {
        let config = MarketDataEnvConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.data_source, DataSource::Yahoo);
        assert_eq!(config.exchange_suffix, ".NS");
    }

    #[test]
    fn test_data_source_parsing() {
        assert_eq!(DataSource::from_str("CSV").unwrap(), DataSource::Csv);
        assert!(DataSource::from_str("bloomberg").is_err());

        let result = MarketDataEnvConfig::from_lookup(|k| {
            (k == "DATA_SOURCE").then(|| "sqlite".to_string())
        });
        assert!(result.is_err());
    }
}
