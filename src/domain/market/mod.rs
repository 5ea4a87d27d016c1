// Raw market history
pub mod period;
pub mod price_series;
