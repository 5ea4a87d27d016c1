use crate::domain::ml::feature_registry::FeatureVector;
use serde::{Deserialize, Serialize};

/// A price bar extended with its derived indicators.
/// `None` means the indicator is still inside its warm-up period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub timestamp: i64,
    pub close: f64,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
    pub ema_50: Option<f64>,
    pub ema_200: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub signal_line: Option<f64>,
}

impl IndicatorRow {
    /// Feature vector in schema order, or `None` while any indicator is undefined.
    pub fn feature_vector(&self) -> Option<FeatureVector> {
        Some(FeatureVector([
            self.sma_50?,
            self.sma_200?,
            self.ema_50?,
            self.ema_200?,
            self.rsi?,
            self.macd?,
            self.signal_line?,
        ]))
    }

    pub fn is_complete(&self) -> bool {
        self.feature_vector().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFrame {
    pub symbol: String,
    pub rows: Vec<IndicatorRow>,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn latest(&self) -> Option<&IndicatorRow> {
        self.rows.last()
    }

    /// Most recent row with all seven indicators defined.
    pub fn latest_complete(&self) -> Option<&IndicatorRow> {
        self.rows.iter().rev().find(|r| r.is_complete())
    }

    pub fn complete_rows(&self) -> impl Iterator<Item = &IndicatorRow> {
        self.rows.iter().filter(|r| r.is_complete())
    }

    pub fn tail(&self, n: usize) -> &[IndicatorRow] {
        let start = self.rows.len().saturating_sub(n);
        &self.rows[start..]
    }
}
