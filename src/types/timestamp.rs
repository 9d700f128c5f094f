//! Timestamp data type implementation

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Formats accepted by the CSV loader, tried in order.
const PARSE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
];

/// Calendar timestamp (second resolution, no timezone)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Parse a timestamp from the dataset's text form.
    ///
    /// Accepts `YYYY-MM-DD HH:MM:SS` (with optional fractional seconds) and
    /// a bare `YYYY-MM-DD`, which maps to midnight.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        for fmt in PARSE_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(Self(dt));
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(Self)
    }

    /// Build a timestamp from calendar components. Used by test fixtures.
    pub fn from_ymd_hms(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, min, sec))
            .map(Self)
    }

    pub fn year(&self) -> i32 {
        chrono::Datelike::year(&self.0)
    }

    pub fn month(&self) -> u32 {
        chrono::Datelike::month(&self.0)
    }

    /// Hour of day, 0-23.
    pub fn hour(&self) -> u32 {
        chrono::Timelike::hour(&self.0)
    }

    /// Whole days from `start` to `end` (negative when `end` precedes `start`).
    pub fn days_between(start: Timestamp, end: Timestamp) -> i64 {
        (end.0 - start.0).num_days()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let ts = Timestamp::parse("2017-10-02 10:56:33").unwrap();
        assert_eq!(ts.year(), 2017);
        assert_eq!(ts.month(), 10);
        assert_eq!(ts.hour(), 10);
        assert_eq!(ts.to_string(), "2017-10-02 10:56:33");
    }

    #[test]
    fn test_parse_date_only() {
        let ts = Timestamp::parse("2018-01-15").unwrap();
        assert_eq!(ts.hour(), 0);
        assert_eq!(ts.to_string(), "2018-01-15 00:00:00");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Timestamp::parse("not a date").is_none());
        assert!(Timestamp::parse("2017-13-40 00:00:00").is_none());
    }

    #[test]
    fn test_days_between() {
        let a = Timestamp::parse("2017-10-02 10:00:00").unwrap();
        let b = Timestamp::parse("2017-10-10 09:00:00").unwrap();
        assert_eq!(Timestamp::days_between(a, b), 7);
        assert_eq!(Timestamp::days_between(b, a), -7);
    }

    #[test]
    fn test_ordering() {
        let a = Timestamp::parse("2017-01-01 00:00:00").unwrap();
        let b = Timestamp::parse("2018-01-01 00:00:00").unwrap();
        assert!(a < b);
    }
}
