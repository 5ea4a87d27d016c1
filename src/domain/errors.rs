use thiserror::Error;

/// Errors raised while obtaining or validating raw price history
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("Request for {symbol} failed: {reason}")]
    RequestFailed { symbol: String, reason: String },

    #[error("Invalid market data for {symbol}: {reason}")]
    InvalidData { symbol: String, reason: String },

    #[error("Invalid period '{input}': expected forms like 1y, 6mo, 30d, ytd, max or a bare number of years")]
    InvalidPeriod { input: String },
}

/// Errors related to indicator configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndicatorError {
    #[error("Invalid window for {indicator}: {window} (must be > 0)")]
    InvalidWindow { indicator: &'static str, window: usize },
}

/// Errors related to the persisted model artifacts
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Model store I/O failure for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Model artifact for {key} is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised by classifier training
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Feature row {row} has {found} values, schema expects {expected}")]
    RaggedFeatures {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("Classifier failure: {reason}")]
    Classifier { reason: String },
}

/// Terminal failures of one evaluation run
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("No data found for {symbol} over {period}. Check the stock symbol and period.")]
    NoData { symbol: String, period: String },

    #[error("Insufficient data for {stage}: need {required} rows, have {available}. Try a longer period.")]
    InsufficientData {
        stage: &'static str,
        required: usize,
        available: usize,
    },

    #[error("Feature schema mismatch: model trained on [{found}], current schema is [{expected}]")]
    SchemaMismatch { expected: String, found: String },

    #[error(transparent)]
    Indicator(#[from] IndicatorError),

    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Training(#[from] TrainingError),
}
