use crate::application::indicators::engine::WARMUP_ROWS;
use crate::domain::analysis::indicator_frame::{IndicatorFrame, IndicatorRow};
use crate::domain::analysis::recommendation::{ScoreBreakdown, Verdict};
use crate::domain::errors::EvaluationError;
use crate::domain::ml::feature_registry::FEATURE_COUNT;
use tracing::debug;

const TREND_BULLISH: f64 = 1.0;
const TREND_BEARISH: f64 = -0.25;
const RSI_OVERBOUGHT_LEVEL: f64 = 70.0;
const RSI_OVERSOLD_LEVEL: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = -0.5;
const RSI_OVERSOLD: f64 = 1.5;
const MACD_BULLISH: f64 = 1.5;
const MACD_BEARISH: f64 = -0.5;

/// Fixed point-weighted heuristic over the latest indicator row.
///
/// Comparisons are strict, so ties fall to the bearish branch.
/// A total of zero or more is a `Buy`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedScorer;

impl RuleBasedScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, frame: &IndicatorFrame) -> Result<ScoreBreakdown, EvaluationError> {
        let latest = frame
            .latest()
            .ok_or(EvaluationError::InsufficientData {
                stage: "rule scoring",
                required: 1,
                available: 0,
            })?;

        let breakdown = self.score_row(latest).ok_or(EvaluationError::InsufficientData {
            stage: "rule scoring",
            required: WARMUP_ROWS,
            available: frame.len(),
        })?;

        debug!(
            "{}: score {:+.2} (sma {:+.2}, ema {:+.2}, rsi {:+.2}, macd {:+.2})",
            frame.symbol,
            breakdown.total,
            breakdown.sma_trend,
            breakdown.ema_trend,
            breakdown.rsi,
            breakdown.macd
        );
        Ok(breakdown)
    }

    /// Scores one row; `None` if any of the indicators is undefined.
    pub fn score_row(&self, row: &IndicatorRow) -> Option<ScoreBreakdown> {
        let features = row.feature_vector()?;
        let [sma_50, sma_200, ema_50, ema_200, rsi, macd, signal_line]: [f64; FEATURE_COUNT] =
            features.0;

        let sma_trend = if sma_50 > sma_200 {
            TREND_BULLISH
        } else {
            TREND_BEARISH
        };
        let ema_trend = if ema_50 > ema_200 {
            TREND_BULLISH
        } else {
            TREND_BEARISH
        };
        let rsi_score = if rsi > RSI_OVERBOUGHT_LEVEL {
            RSI_OVERBOUGHT
        } else if rsi < RSI_OVERSOLD_LEVEL {
            RSI_OVERSOLD
        } else {
            0.0
        };
        let macd_score = if macd > signal_line {
            MACD_BULLISH
        } else {
            MACD_BEARISH
        };

        let total = sma_trend + ema_trend + rsi_score + macd_score;
        let verdict = if total >= 0.0 {
            Verdict::Buy
        } else {
            Verdict::NotAGoodInvestment
        };

        Some(ScoreBreakdown {
            sma_trend,
            ema_trend,
            rsi: rsi_score,
            macd: macd_score,
            total,
            verdict,
            as_of: row.timestamp,
        })
    }
}
