//! Month and date helpers.
//!
//! The monthly fatalities series is keyed by `YYYY-MM`, the weekly event
//! series and incidents by `YYYY-MM-DD`.

use crate::error::CoreError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, CoreError> {
        if (1..=12).contains(&month) {
            Ok(Self { year, month })
        } else {
            Err(CoreError::InvalidPeriod(format!("{year}-{month}")))
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        // month is validated at construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// The following month.
    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// Move forward by `n` months.
    pub fn add_months(&self, n: u32) -> Self {
        let index = self.index() + n as i64;
        Self::from_index(index)
    }

    /// Number of months from `self` to `other` (negative when `other` is earlier).
    pub fn months_until(&self, other: &YearMonth) -> i64 {
        other.index() - self.index()
    }

    /// Every month from `self` to `end`, inclusive.
    pub fn range_inclusive(&self, end: &YearMonth) -> Vec<YearMonth> {
        let mut out = Vec::new();
        let mut cur = *self;
        while cur <= *end {
            out.push(cur);
            cur = cur.succ();
        }
        out
    }

    /// "March 2024"
    pub fn label(&self) -> String {
        format!("{} {}", MONTH_NAMES[(self.month - 1) as usize], self.year)
    }

    /// "Mar 2024"
    pub fn short_label(&self) -> String {
        format!("{} {}", &MONTH_NAMES[(self.month - 1) as usize][..3], self.year)
    }

    fn index(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    fn from_index(index: i64) -> Self {
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }
}

impl FromStr for YearMonth {
    type Err = CoreError;

    /// Accepts `YYYY-MM` and `YYYY-MM-DD` (the day is ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let bad = || CoreError::InvalidPeriod(s.to_string());
        let mut parts = s.split('-');
        let year: i32 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
        let month: u32 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
        YearMonth::new(year, month).map_err(|_| bad())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Parse a `YYYY-MM-DD` date. A trailing time part (`2024-01-05 00:00:00`)
/// is ignored.
pub fn parse_date(s: &str) -> Result<NaiveDate, CoreError> {
    let trimmed = s.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|_| CoreError::InvalidPeriod(s.to_string()))
}

/// Format a date as `dd/mm/yyyy` for map tooltips.
pub fn format_day(date: &NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Format a date as "Mar 12, 2024" for the weekly tooltip.
pub fn format_week(date: &NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_month_and_full_date() {
        assert_eq!("2024-03".parse::<YearMonth>(), Ok(YearMonth { year: 2024, month: 3 }));
        assert_eq!("2024-03-17".parse::<YearMonth>(), Ok(YearMonth { year: 2024, month: 3 }));
    }

    #[test]
    fn rejects_month_out_of_range() {
        assert!("2024-13".parse::<YearMonth>().is_err());
        assert!("March".parse::<YearMonth>().is_err());
    }

    #[test]
    fn succ_wraps_year() {
        let dec = YearMonth::new(2023, 12).unwrap();
        assert_eq!(dec.succ(), YearMonth::new(2024, 1).unwrap());
        assert_eq!(dec.add_months(14), YearMonth::new(2025, 2).unwrap());
    }

    #[test]
    fn months_until_counts_across_years() {
        let a = YearMonth::new(2023, 11).unwrap();
        let b = YearMonth::new(2024, 2).unwrap();
        assert_eq!(a.months_until(&b), 3);
        assert_eq!(b.months_until(&a), -3);
        assert_eq!(a.range_inclusive(&b).len(), 4);
    }

    #[test]
    fn labels_use_month_names() {
        let m = YearMonth::new(2024, 3).unwrap();
        assert_eq!(m.label(), "March 2024");
        assert_eq!(m.short_label(), "Mar 2024");
        assert_eq!(m.to_string(), "2024-03");
    }

    #[test]
    fn day_format_is_day_first() {
        let d = parse_date("2024-01-05").unwrap();
        assert_eq!(format_day(&d), "05/01/2024");
        assert_eq!(format_week(&d), "Jan 5, 2024");
        assert_eq!(parse_date("2024-01-05 00:00:00"), Ok(d));
        assert!(parse_date("05/01/2024").is_err());
    }
}
