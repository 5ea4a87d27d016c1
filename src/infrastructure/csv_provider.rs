//! Offline price history from `<data_dir>/<SYMBOL>.csv`.
//!
//! Expected header: `date,open,high,low,close,volume`, with dates as
//! `YYYY-MM-DD`. The requested period is measured back from the last row.

use crate::domain::errors::MarketDataError;
use crate::domain::market::period::Period;
use crate::domain::market::price_series::{PriceBar, PriceSeries};
use crate::domain::ports::PriceHistoryProvider;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
}

pub struct CsvPriceProvider {
    data_dir: PathBuf,
}

impl CsvPriceProvider {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}.csv", symbol.trim().to_uppercase()))
    }
}

#[async_trait]
impl PriceHistoryProvider for CsvPriceProvider {
    async fn fetch(&self, symbol: &str, period: &Period) -> Result<PriceSeries, MarketDataError> {
        let path = self.path_for(symbol);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("No price file at {:?}", path);
                return Ok(PriceSeries::empty(symbol));
            }
            Err(e) => {
                return Err(MarketDataError::RequestFailed {
                    symbol: symbol.to_string(),
                    reason: format!("cannot read {:?}: {}", path, e),
                });
            }
        };

        let series = parse_csv(symbol, &content)?;
        let series = match series.bars().last() {
            Some(last) => {
                let start = DateTime::from_timestamp(last.timestamp, 0)
                    .and_then(|end| period.start_from(end))
                    .map(|start| start.timestamp());
                match start {
                    Some(start) => series.retain_since(start),
                    None => series,
                }
            }
            None => series,
        };

        info!("Loaded {} bars for {} from {:?}", series.len(), symbol, path);
        Ok(series)
    }

    fn name(&self) -> &str {
        "CSV"
    }
}

fn parse_csv(symbol: &str, content: &str) -> Result<PriceSeries, MarketDataError> {
    let invalid = |reason: String| MarketDataError::InvalidData {
        symbol: symbol.to_string(),
        reason,
    };

    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let mut bars = Vec::new();
    for (line, record) in reader.deserialize::<CsvRow>().enumerate() {
        let row = record.map_err(|e| invalid(format!("row {}: {}", line + 1, e)))?;
        let date = NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d")
            .map_err(|e| invalid(format!("row {}: bad date '{}': {}", line + 1, row.date, e)))?;
        let Some(close) = row.close.and_then(Decimal::from_f64) else {
            continue;
        };
        let or_close = |v: Option<f64>| v.and_then(Decimal::from_f64).unwrap_or(close);
        let timestamp = date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .ok_or_else(|| invalid(format!("row {}: unrepresentable date", line + 1)))?;
        bars.push(PriceBar {
            timestamp,
            open: or_close(row.open),
            high: or_close(row.high),
            low: or_close(row.low),
            close,
            volume: row
                .volume
                .and_then(Decimal::from_f64)
                .unwrap_or(Decimal::ZERO),
        });
    }

    bars.sort_by_key(|b| b.timestamp);
    bars.dedup_by_key(|b| b.timestamp);
    PriceSeries::new(symbol, bars)
}
