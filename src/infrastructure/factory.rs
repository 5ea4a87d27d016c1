use crate::config::{Config, DataSource};
use crate::domain::ports::PriceHistoryProvider;
use crate::domain::repositories::ModelRepository;
use crate::infrastructure::csv_provider::CsvPriceProvider;
use crate::infrastructure::persistence::JsonModelRepository;
use crate::infrastructure::yahoo::YahooChartProvider;
use anyhow::Result;
use tracing::info;

pub struct ServiceFactory;

impl ServiceFactory {
    pub fn create_provider(config: &Config) -> Box<dyn PriceHistoryProvider> {
        let market = &config.market_data;
        let provider: Box<dyn PriceHistoryProvider> = match market.data_source {
            DataSource::Yahoo => Box::new(YahooChartProvider::new(
                market.yahoo_base_url.clone(),
                market.exchange_suffix.clone(),
            )),
            DataSource::Csv => Box::new(CsvPriceProvider::new(market.price_data_dir.clone())),
        };
        info!("Price history source: {}", provider.name());
        provider
    }

    pub fn create_model_repository(config: &Config) -> Result<Box<dyn ModelRepository>> {
        Ok(Box::new(JsonModelRepository::new(config.model_dir().clone())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_follows_data_source() {
        let config = Config::from_lookup(|k| (k == "DATA_SOURCE").then(|| "csv".to_string()))
            .unwrap();
        assert_eq!(ServiceFactory::create_provider(&config).name(), "CSV");

        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(ServiceFactory::create_provider(&config).name(), "Yahoo Finance");
    }
}
