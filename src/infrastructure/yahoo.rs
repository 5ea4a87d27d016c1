//! Daily price history from the Yahoo Finance chart endpoint.

use super::http_client_factory::HttpClientFactory;
use crate::domain::errors::MarketDataError;
use crate::domain::market::period::Period;
use crate::domain::market::price_series::{PriceBar, PriceSeries};
use crate::domain::ports::PriceHistoryProvider;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

pub struct YahooChartProvider {
    client: Client,
    base_url: String,
    exchange_suffix: String,
}

impl YahooChartProvider {
    pub fn new(base_url: impl Into<String>, exchange_suffix: impl Into<String>) -> Self {
        Self {
            client: HttpClientFactory::create_client(),
            base_url: base_url.into(),
            exchange_suffix: exchange_suffix.into(),
        }
    }

    pub fn qualified_symbol(&self, symbol: &str) -> String {
        qualify_symbol(symbol, &self.exchange_suffix)
    }
}

/// Appends the exchange suffix unless the symbol is already qualified.
pub fn qualify_symbol(symbol: &str, suffix: &str) -> String {
    let symbol = symbol.trim().to_uppercase();
    if suffix.is_empty() || symbol.contains('.') {
        symbol
    } else {
        format!("{}{}", symbol, suffix)
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooChartProvider {
    async fn fetch(&self, symbol: &str, period: &Period) -> Result<PriceSeries, MarketDataError> {
        let qualified = self.qualified_symbol(symbol);
        let url = format!(
            "{}/v8/finance/chart/{}",
            self.base_url.trim_end_matches('/'),
            qualified
        );
        let range = period.to_string();

        debug!("Fetching {} ({}) from {}", qualified, range, url);
        let response = match self
            .client
            .get(&url)
            .query(&[("range", range.as_str()), ("interval", "1d")])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("Request for {} failed: {}", qualified, e);
                return Ok(PriceSeries::empty(symbol));
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("Request for {} returned HTTP {}", qualified, status);
            return Ok(PriceSeries::empty(symbol));
        }

        let payload: ChartResponse =
            response
                .json()
                .await
                .map_err(|e| MarketDataError::InvalidData {
                    symbol: qualified.clone(),
                    reason: format!("unreadable chart payload: {}", e),
                })?;

        let series = series_from_chart(symbol, payload)?;
        info!("Fetched {} daily bars for {}", series.len(), qualified);
        Ok(series)
    }

    fn name(&self) -> &str {
        "Yahoo Finance"
    }
}

fn at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

fn series_from_chart(symbol: &str, payload: ChartResponse) -> Result<PriceSeries, MarketDataError> {
    if let Some(err) = payload.chart.error {
        warn!(
            "Chart error for {}: {} {}",
            symbol,
            err.code.unwrap_or_default(),
            err.description.unwrap_or_default()
        );
        return Ok(PriceSeries::empty(symbol));
    }

    let Some(result) = payload.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(PriceSeries::empty(symbol));
    };
    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars: Vec<PriceBar> = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &timestamp)| {
            // Rows without a close are unusable downstream
            let close = at(&quote.close, i).and_then(Decimal::from_f64)?;
            let or_close = |v: Option<f64>| v.and_then(Decimal::from_f64).unwrap_or(close);
            Some(PriceBar {
                timestamp,
                open: or_close(at(&quote.open, i)),
                high: or_close(at(&quote.high, i)),
                low: or_close(at(&quote.low, i)),
                close,
                volume: at(&quote.volume, i)
                    .and_then(Decimal::from_f64)
                    .unwrap_or(Decimal::ZERO),
            })
        })
        .collect();

    bars.sort_by_key(|b| b.timestamp);
    bars.dedup_by_key(|b| b.timestamp);
    PriceSeries::new(symbol, bars)
}
