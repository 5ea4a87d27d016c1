use crate::domain::errors::IndicatorError;
use ta::Next;
use ta::indicators::SimpleMovingAverage;

/// Trailing arithmetic mean that stays undefined until `window` samples
/// have been seen.
pub struct WindowedMean {
    sma: SimpleMovingAverage,
    window: usize,
    seen: usize,
}

impl WindowedMean {
    pub fn new(indicator: &'static str, window: usize) -> Result<Self, IndicatorError> {
        let sma = SimpleMovingAverage::new(window)
            .map_err(|_| IndicatorError::InvalidWindow { indicator, window })?;
        Ok(Self {
            sma,
            window,
            seen: 0,
        })
    }

    pub fn next(&mut self, value: f64) -> Option<f64> {
        let mean = self.sma.next(value);
        self.seen += 1;
        (self.seen >= self.window).then_some(mean)
    }
}

/// Recursive exponential smoothing, α = 2/(span+1), seeded with the first
/// sample and without bias adjustment. The running value is reported once
/// `span` samples have been seen.
pub struct ExponentialSmoother {
    alpha: f64,
    span: usize,
    current: Option<f64>,
    seen: usize,
}

impl ExponentialSmoother {
    pub fn new(indicator: &'static str, span: usize) -> Result<Self, IndicatorError> {
        if span == 0 {
            return Err(IndicatorError::InvalidWindow {
                indicator,
                window: span,
            });
        }
        Ok(Self {
            alpha: 2.0 / (span as f64 + 1.0),
            span,
            current: None,
            seen: 0,
        })
    }

    /// Advances the recursion without applying the warm-up gate.
    pub fn update(&mut self, value: f64) -> f64 {
        // Incremental form keeps a constant input exactly constant.
        let next = match self.current {
            None => value,
            Some(prev) => prev + self.alpha * (value - prev),
        };
        self.current = Some(next);
        self.seen += 1;
        next
    }

    pub fn next(&mut self, value: f64) -> Option<f64> {
        let smoothed = self.update(value);
        (self.seen >= self.span).then_some(smoothed)
    }
}

/// Relative strength index over simple rolling means of gains and losses.
///
/// The first close has no predecessor and counts as a zero delta, so the
/// first defined value lands on row `window - 1`. With no losses in the
/// window the index is 100, or 50 when the window saw no movement at all.
pub struct RollingRsi {
    gains: WindowedMean,
    losses: WindowedMean,
    prev_close: Option<f64>,
}

impl RollingRsi {
    pub fn new(window: usize) -> Result<Self, IndicatorError> {
        Ok(Self {
            gains: WindowedMean::new("RSI", window)?,
            losses: WindowedMean::new("RSI", window)?,
            prev_close: None,
        })
    }

    pub fn next(&mut self, close: f64) -> Option<f64> {
        let delta = match self.prev_close.replace(close) {
            Some(prev) => close - prev,
            None => 0.0,
        };

        let avg_gain = self.gains.next(delta.max(0.0));
        let avg_loss = self.losses.next((-delta).max(0.0));

        match (avg_gain, avg_loss) {
            (Some(gain), Some(loss)) => Some(rsi_from_averages(gain, loss)),
            _ => None,
        }
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss <= 0.0 {
        if avg_gain <= 0.0 { 50.0 } else { 100.0 }
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}
