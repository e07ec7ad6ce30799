//! Calculation period model.
//!
//! Incentives are computed per calendar month. A [`Period`] is serialised as
//! `"YYYY-MM"` so it reads the same in JSON inputs, YAML and log output.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A calendar month for which incentives are calculated.
///
/// # Example
///
/// ```
/// use incentive_engine::models::Period;
///
/// let period: Period = "2025-11".parse().unwrap();
/// assert_eq!(period.previous().to_string(), "2025-10");
/// assert_eq!(period.last_day().to_string(), "2025-11-30");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    first_day: NaiveDate,
}

/// Years a period may fall in. Month arithmetic stays far inside chrono's
/// date range for every period built through [`Period::new`].
const PERIOD_YEARS: RangeInclusive<i32> = 1..=9999;

impl Period {
    /// Creates a period from a year and a 1-based month.
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        let invalid = |message: &str| EngineError::InvalidPeriod {
            value: format!("{}-{:02}", year, month),
            message: message.to_string(),
        };

        if !PERIOD_YEARS.contains(&year) {
            return Err(invalid("year must be between 1 and 9999"));
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| Self { first_day })
            .ok_or_else(|| invalid("month must be between 1 and 12"))
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    /// The 1-based calendar month.
    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// The first day of the period.
    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// The last day of the period (inclusive).
    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day - Days::new(1)
    }

    /// The immediately preceding period.
    pub fn previous(&self) -> Self {
        Self {
            first_day: self.first_day - Months::new(1),
        }
    }

    /// The immediately following period.
    pub fn next(&self) -> Self {
        Self {
            first_day: self.first_day + Months::new(1),
        }
    }

    /// Returns true if the date falls inside this period.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day && date <= self.last_day()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for Period {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| EngineError::InvalidPeriod {
            value: s.to_string(),
            message: message.to_string(),
        };

        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| invalid("expected YYYY-MM"))?;
        let year: i32 = year.parse().map_err(|_| invalid("year is not a number"))?;
        let month: u32 = month
            .parse()
            .map_err(|_| invalid("month is not a number"))?;

        Self::new(year, month).map_err(|err| match err {
            EngineError::InvalidPeriod { message, .. } => invalid(&message),
            other => other,
        })
    }
}

impl TryFrom<String> for Period {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}
