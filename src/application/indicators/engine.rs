use super::smoothing::{ExponentialSmoother, RollingRsi, WindowedMean};
use crate::domain::analysis::indicator_frame::{IndicatorFrame, IndicatorRow};
use crate::domain::errors::IndicatorError;
use crate::domain::market::price_series::PriceSeries;
use tracing::{debug, warn};

pub const SHORT_TREND_WINDOW: usize = 50;
pub const LONG_TREND_WINDOW: usize = 200;
pub const RSI_WINDOW: usize = 14;
pub const MACD_FAST_SPAN: usize = 12;
pub const MACD_SLOW_SPAN: usize = 26;
pub const MACD_SIGNAL_SPAN: usize = 9;

/// Rows needed before every indicator of a row is defined.
pub const WARMUP_ROWS: usize = LONG_TREND_WINDOW;

/// Computes trend and momentum indicators over the close column.
///
/// Pure: the same series always yields the same frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct IndicatorEngine;

impl IndicatorEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn compute(&self, series: &PriceSeries) -> Result<IndicatorFrame, IndicatorError> {
        if series.len() < WARMUP_ROWS {
            warn!(
                "{}: only {} rows, 200-period indicators stay undefined",
                series.symbol(),
                series.len()
            );
        }

        let mut sma_50 = WindowedMean::new("SMA_50", SHORT_TREND_WINDOW)?;
        let mut sma_200 = WindowedMean::new("SMA_200", LONG_TREND_WINDOW)?;
        let mut ema_50 = ExponentialSmoother::new("EMA_50", SHORT_TREND_WINDOW)?;
        let mut ema_200 = ExponentialSmoother::new("EMA_200", LONG_TREND_WINDOW)?;
        let mut rsi = RollingRsi::new(RSI_WINDOW)?;
        let mut macd_fast = ExponentialSmoother::new("MACD", MACD_FAST_SPAN)?;
        let mut macd_slow = ExponentialSmoother::new("MACD", MACD_SLOW_SPAN)?;
        let mut signal = ExponentialSmoother::new("Signal_Line", MACD_SIGNAL_SPAN)?;

        // MACD is defined once the slow EMA is; the signal line needs a further
        // span of MACD values.
        let macd_ready_at = MACD_SLOW_SPAN - 1;
        let signal_ready_at = macd_ready_at + MACD_SIGNAL_SPAN - 1;

        let mut rows = Vec::with_capacity(series.len());
        for (i, bar) in series.bars().iter().enumerate() {
            let close = bar.close_f64();

            let macd_raw = macd_fast.update(close) - macd_slow.update(close);
            let signal_raw = signal.update(macd_raw);

            rows.push(IndicatorRow {
                timestamp: bar.timestamp,
                close,
                sma_50: sma_50.next(close),
                sma_200: sma_200.next(close),
                ema_50: ema_50.next(close),
                ema_200: ema_200.next(close),
                rsi: rsi.next(close),
                macd: (i >= macd_ready_at).then_some(macd_raw),
                signal_line: (i >= signal_ready_at).then_some(signal_raw),
            });
        }

        let frame = IndicatorFrame {
            symbol: series.symbol().to_string(),
            rows,
        };
        debug!(
            "{}: computed indicators for {} rows ({} complete)",
            frame.symbol,
            frame.len(),
            frame.complete_rows().count()
        );
        Ok(frame)
    }
}
