//! Requested date ranges and the policies that turn them into date lists.

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CommonError, CommonResult};

/// How a requested `[start, end]` pair maps onto source files and dates.
///
/// The per-day and per-year products disagree on whether the end date is
/// part of the request, so each keeps its own named policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRangePolicy {
    /// Every day from `start` up to but excluding `end`.
    ExclusiveDailyRange,
    /// Every calendar year touched by `start..=end`; dates `start..=end`.
    InclusiveYearRange,
}

/// A requested extraction period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range. `start` may equal `end` but must not follow it.
    pub fn new(start: NaiveDate, end: NaiveDate) -> CommonResult<Self> {
        if start > end {
            return Err(CommonError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse a range from two `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> CommonResult<Self> {
        Self::new(parse_iso_date(start)?, parse_iso_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Days from `start` up to but excluding `end`.
    pub fn exclusive_daily_range(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take_while(|d| *d < self.end)
            .collect()
    }

    /// Days from `start` through `end`.
    pub fn inclusive_daily_range(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take_while(|d| *d <= self.end)
            .collect()
    }

    /// Calendar years touched by the range, both ends included.
    pub fn inclusive_year_range(&self) -> RangeInclusive<i32> {
        self.start.year()..=self.end.year()
    }

    /// The exact list of dates a run under `policy` is expected to produce.
    pub fn expected_dates(&self, policy: DateRangePolicy) -> Vec<NaiveDate> {
        match policy {
            DateRangePolicy::ExclusiveDailyRange => self.exclusive_daily_range(),
            DateRangePolicy::InclusiveYearRange => self.inclusive_daily_range(),
        }
    }

    /// `YYYYMMDD-YYYYMMDD` label used in output filenames.
    pub fn compact_label(&self) -> String {
        format!(
            "{}-{}",
            self.start.format("%Y%m%d"),
            self.end.format("%Y%m%d")
        )
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_iso_date(s: &str) -> CommonResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| CommonError::InvalidDate {
        value: s.to_string(),
        expected: "YYYY-MM-DD",
    })
}

/// Parse a compact `YYYYMMDD` date.
pub fn parse_compact_date(s: &str) -> CommonResult<NaiveDate> {
    let invalid = || CommonError::InvalidDate {
        value: s.to_string(),
        expected: "YYYYMMDD",
    };
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(s, "%Y%m%d").map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_exclusive_daily_range_drops_end() {
        let range = DateRange::parse("2021-05-20", "2021-05-22").unwrap();
        assert_eq!(
            range.exclusive_daily_range(),
            vec![date(2021, 5, 20), date(2021, 5, 21)]
        );
    }

    #[test]
    fn test_same_day_range_is_empty_when_exclusive() {
        let range = DateRange::parse("2021-05-20", "2021-05-20").unwrap();
        assert!(range.exclusive_daily_range().is_empty());
        assert_eq!(range.inclusive_daily_range(), vec![date(2021, 5, 20)]);
    }

    #[test]
    fn test_inclusive_year_range() {
        let range = DateRange::parse("2020-12-30", "2022-01-02").unwrap();
        assert_eq!(range.inclusive_year_range(), 2020..=2022);
        assert_eq!(
            range.expected_dates(DateRangePolicy::InclusiveYearRange).len(),
            369
        );
    }

    #[test]
    fn test_reversed_range_rejected() {
        assert!(matches!(
            DateRange::parse("2021-06-08", "2021-05-20"),
            Err(CommonError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_compact_label() {
        let range = DateRange::parse("2021-05-20", "2021-06-08").unwrap();
        assert_eq!(range.compact_label(), "20210520-20210608");
    }

    #[test]
    fn test_parse_compact_date() {
        assert_eq!(parse_compact_date("20210520").unwrap(), date(2021, 5, 20));
        assert!(parse_compact_date("2021052").is_err());
        assert!(parse_compact_date("20211340").is_err());
        assert!(parse_compact_date("2021-5-2").is_err());
    }
}
