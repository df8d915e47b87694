//! Calendar month key used by budgets and reports
//!
//! Months display and parse as `YYYY-MM`.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar month (e.g., "2025-01")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Create a month; returns None when `month` is outside 1..=12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The month containing `date`
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The current month in local time
    pub fn current() -> Self {
        Self::from_date(chrono::Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of the month
    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the month (inclusive)
    pub fn end_date(&self) -> NaiveDate {
        self.next().start_date() - Duration::days(1)
    }

    /// Number of days in the month
    pub fn days(&self) -> u32 {
        self.end_date().day()
    }

    /// Check if a date falls within this month
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The `count` months ending with (and including) this one, oldest first
    pub fn trailing(&self, count: usize) -> Vec<Self> {
        let mut months = Vec::with_capacity(count);
        let mut cursor = *self;
        for _ in 0..count {
            months.push(cursor);
            cursor = cursor.prev();
        }
        months.reverse();
        months
    }

    /// Human-readable label, e.g. "January 2025"
    pub fn label(&self) -> String {
        self.start_date().format("%B %Y").to_string()
    }

    /// Parse a month string ("2025-01")
    pub fn parse(s: &str) -> Result<Self, MonthParseError> {
        let s = s.trim();
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| MonthParseError::InvalidFormat(s.to_string()))?;

        if year.len() != 4 {
            return Err(MonthParseError::InvalidFormat(s.to_string()));
        }

        let year: i32 = year
            .parse()
            .map_err(|_| MonthParseError::InvalidFormat(s.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| MonthParseError::InvalidFormat(s.to_string()))?;

        Self::new(year, month).ok_or(MonthParseError::InvalidMonth(month))
    }
}

impl Default for Month {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for Month {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Month {
    type Error = MonthParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Month> for String {
    fn from(month: Month) -> Self {
        month.to_string()
    }
}

/// Error type for month parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonthParseError {
    InvalidFormat(String),
    InvalidMonth(u32),
}

impl fmt::Display for MonthParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthParseError::InvalidFormat(s) => {
                write!(f, "Invalid month format: {} (expected YYYY-MM)", s)
            }
            MonthParseError::InvalidMonth(m) => write!(f, "Invalid month: {}", m),
        }
    }
}

impl std::error::Error for MonthParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(year: i32, m: u32) -> Month {
        Month::new(year, m).unwrap()
    }

    #[test]
    fn test_month_bounds() {
        let jan = month(2025, 1);
        assert_eq!(jan.start_date(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(jan.end_date(), NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
        assert_eq!(month(2024, 2).days(), 29);
        assert_eq!(month(2025, 2).days(), 28);
    }

    #[test]
    fn test_navigation() {
        assert_eq!(month(2025, 1).next(), month(2025, 2));
        assert_eq!(month(2024, 12).next(), month(2025, 1));
        assert_eq!(month(2025, 1).prev(), month(2024, 12));
    }

    #[test]
    fn test_trailing() {
        let months = month(2025, 2).trailing(3);
        assert_eq!(months, vec![month(2024, 12), month(2025, 1), month(2025, 2)]);
    }

    #[test]
    fn test_contains() {
        let jan = month(2025, 1);
        assert!(jan.contains(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()));
        assert!(!jan.contains(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()));
        assert!(!jan.contains(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()));
    }

    #[test]
    fn test_parse() {
        assert_eq!(Month::parse("2025-01").unwrap(), month(2025, 1));
        assert_eq!(Month::parse(" 2025-12 ").unwrap(), month(2025, 12));
        assert_eq!(Month::parse("2025-13"), Err(MonthParseError::InvalidMonth(13)));
        assert!(Month::parse("25-01").is_err());
        assert!(Month::parse("2025").is_err());
    }

    #[test]
    fn test_display_and_serde() {
        let m = month(2025, 3);
        assert_eq!(m.to_string(), "2025-03");
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "\"2025-03\"");
        let back: Month = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
        assert!(serde_json::from_str::<Month>("\"2025-00\"").is_err());
    }
}
