use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of the rule-based heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Buy,
    NotAGoodInvestment,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Buy => write!(f, "Buy"),
            Verdict::NotAGoodInvestment => write!(f, "Not a Good Investment"),
        }
    }
}

/// Per-check contributions of the rule-based scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub sma_trend: f64,
    pub ema_trend: f64,
    pub rsi: f64,
    pub macd: f64,
    pub total: f64,
    pub verdict: Verdict,
    pub as_of: i64,
}

/// Outcome of the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MlDecision {
    Buy,
    NoBuy,
}

impl MlDecision {
    pub fn from_class(class: u32) -> Self {
        if class == 1 {
            MlDecision::Buy
        } else {
            MlDecision::NoBuy
        }
    }
}

impl fmt::Display for MlDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlDecision::Buy => write!(f, "BUY"),
            MlDecision::NoBuy => write!(f, "NO BUY"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlRecommendation {
    pub decision: MlDecision,
    /// Probability of `decision`, in [0, 1]
    pub confidence: f64,
    /// Timestamp of the feature row the prediction was made on
    pub as_of: i64,
}
