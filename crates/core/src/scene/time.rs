//! Acquisition time windows

use crate::error::{Error, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive range of acquisition dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, failing if `start` is after `end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    /// Range from `YYYY-MM-DD` strings
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// Whole calendar years `first..=last`
    pub fn years(first: i32, last: i32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(first, 1, 1).ok_or_else(|| bad_year(first))?;
        let end = NaiveDate::from_ymd_opt(last, 12, 31).ok_or_else(|| bad_year(last))?;
        Self::new(start, end)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(Error::InvalidDateRange {
                start: self.start.to_string(),
                end: self.end.to_string(),
            });
        }
        Ok(())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Label such as `1984-2022` or `2022` used in output names
    pub fn year_label(&self) -> String {
        if self.start.year() == self.end.year() {
            self.start.year().to_string()
        } else {
            format!("{}-{}", self.start.year(), self.end.year())
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Fail if any two ranges overlap or any range is inverted.
pub fn ensure_disjoint(ranges: &[DateRange]) -> Result<()> {
    for range in ranges {
        range.validate()?;
    }
    let mut sorted: Vec<&DateRange> = ranges.iter().collect();
    sorted.sort();
    for pair in sorted.windows(2) {
        if pair[0].overlaps(pair[1]) {
            return Err(Error::OverlappingDateRanges {
                first: pair[0].to_string(),
                second: pair[1].to_string(),
            });
        }
    }
    Ok(())
}

/// Inclusive window of calendar months, e.g. July to August.
///
/// A window whose start month is after its end month wraps around the new
/// year (November to February).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthWindow {
    pub start: u32,
    pub end: u32,
}

impl MonthWindow {
    pub fn new(start: u32, end: u32) -> Result<Self> {
        let window = Self { start, end };
        window.validate()?;
        Ok(window)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, month) in [("months.start", self.start), ("months.end", self.end)] {
            if !(1..=12).contains(&month) {
                return Err(Error::InvalidParameter {
                    name,
                    value: month.to_string(),
                    reason: "month must be between 1 and 12".into(),
                });
            }
        }
        Ok(())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        let m = date.month();
        if self.start <= self.end {
            self.start <= m && m <= self.end
        } else {
            m >= self.start || m <= self.end
        }
    }
}

impl Default for MonthWindow {
    fn default() -> Self {
        Self { start: 7, end: 8 }
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| Error::InvalidParameter {
        name: "date",
        value: s.to_string(),
        reason: e.to_string(),
    })
}

fn bad_year(year: i32) -> Error {
    Error::InvalidParameter {
        name: "year",
        value: year.to_string(),
        reason: "year out of range".into(),
    }
}
