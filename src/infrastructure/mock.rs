use crate::domain::errors::MarketDataError;
use crate::domain::market::period::Period;
use crate::domain::market::price_series::PriceSeries;
use crate::domain::ports::PriceHistoryProvider;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// Serves preloaded series keyed by symbol. Unknown symbols yield an empty
/// series, the same way a remote source reports a bad ticker.
#[derive(Clone, Default)]
pub struct InMemoryPriceProvider {
    series: Arc<RwLock<HashMap<String, PriceSeries>>>,
    fetches: Arc<AtomicUsize>,
}

impl InMemoryPriceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(series: PriceSeries) -> Self {
        let mut map = HashMap::new();
        map.insert(series.symbol().to_uppercase(), series);
        Self {
            series: Arc::new(RwLock::new(map)),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub async fn insert(&self, series: PriceSeries) {
        self.series
            .write()
            .await
            .insert(series.symbol().to_uppercase(), series);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceHistoryProvider for InMemoryPriceProvider {
    async fn fetch(&self, symbol: &str, period: &Period) -> Result<PriceSeries, MarketDataError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let key = symbol.trim().to_uppercase();
        debug!("InMemoryPriceProvider: fetch {} ({})", key, period);
        Ok(self
            .series
            .read()
            .await
            .get(&key)
            .cloned()
            .unwrap_or_else(|| PriceSeries::empty(key)))
    }

    fn name(&self) -> &str {
        "In-memory"
    }
}
