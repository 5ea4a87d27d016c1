use crate::domain::errors::MarketDataError;
use crate::domain::market::period::Period;
use crate::domain::market::price_series::PriceSeries;
use async_trait::async_trait;

/// Supplier of raw daily price history.
///
/// `symbol` is the caller's unqualified ticker; implementations add any
/// exchange qualification themselves. "No data" is an empty series, not an
/// error, so callers can tell it apart from malformed responses.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    async fn fetch(&self, symbol: &str, period: &Period) -> Result<PriceSeries, MarketDataError>;

    fn name(&self) -> &str;
}
