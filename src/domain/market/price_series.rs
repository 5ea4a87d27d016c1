use crate::domain::errors::MarketDataError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// One daily OHLCV bar. `timestamp` is unix seconds (UTC).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl PriceBar {
    pub fn close_f64(&self) -> f64 {
        self.close.to_f64().unwrap_or(0.0)
    }
}

/// Chronologically ordered price history for a single symbol.
///
/// Timestamps are strictly ascending, so there are never duplicates.
/// An empty series is valid and means the supplier had no data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, MarketDataError> {
        let symbol = symbol.into();

        if let Some(pair) = bars
            .windows(2)
            .find(|pair| pair[1].timestamp <= pair[0].timestamp)
        {
            return Err(MarketDataError::InvalidData {
                symbol,
                reason: format!(
                    "timestamps not strictly ascending ({} then {})",
                    pair[0].timestamp, pair[1].timestamp
                ),
            });
        }

        Ok(Self { symbol, bars })
    }

    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn timestamps(&self) -> Vec<i64> {
        self.bars.iter().map(|b| b.timestamp).collect()
    }

    /// Drops every bar older than `start` (unix seconds).
    pub fn retain_since(mut self, start: i64) -> Self {
        self.bars.retain(|b| b.timestamp >= start);
        self
    }
}
