use crate::domain::errors::MarketDataError;
use chrono::{DateTime, Datelike, Duration, Months, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Relative look-back window for price history requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    Days(u32),
    Weeks(u32),
    Months(u32),
    Years(u32),
    YearToDate,
    Max,
}

impl Period {
    /// Earliest timestamp covered by this period when counting back from `end`.
    /// Returns `None` for `Max` (no lower bound).
    pub fn start_from(&self, end: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match *self {
            Period::Days(n) => end.checked_sub_signed(Duration::days(i64::from(n))),
            Period::Weeks(n) => end.checked_sub_signed(Duration::weeks(i64::from(n))),
            Period::Months(n) => end.checked_sub_months(Months::new(n)),
            Period::Years(n) => end.checked_sub_months(Months::new(n.saturating_mul(12))),
            Period::YearToDate => Utc.with_ymd_and_hms(end.year(), 1, 1, 0, 0, 0).single(),
            Period::Max => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Days(n) => write!(f, "{}d", n),
            Period::Weeks(n) => write!(f, "{}wk", n),
            Period::Months(n) => write!(f, "{}mo", n),
            Period::Years(n) => write!(f, "{}y", n),
            Period::YearToDate => write!(f, "ytd"),
            Period::Max => write!(f, "max"),
        }
    }
}

impl FromStr for Period {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let invalid = || MarketDataError::InvalidPeriod {
            input: s.to_string(),
        };

        match normalized.as_str() {
            "ytd" => return Ok(Period::YearToDate),
            "max" => return Ok(Period::Max),
            _ => {}
        }

        let split = normalized
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(normalized.len());
        let (digits, unit) = normalized.split_at(split);
        let n: u32 = digits.parse().map_err(|_| invalid())?;
        if n == 0 {
            return Err(invalid());
        }

        // A bare number is a count of years
        match unit {
            "" | "y" => Ok(Period::Years(n)),
            "d" => Ok(Period::Days(n)),
            "wk" => Ok(Period::Weeks(n)),
            "mo" => Ok(Period::Months(n)),
            _ => Err(invalid()),
        }
    }
}
