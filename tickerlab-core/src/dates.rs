//! Strict `YYYY-MM-DD` date handling and the provider-specific renderings of it.

use chrono::NaiveDate;
use thiserror::Error;

/// The only accepted user-facing date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidFormat(String),

    #[error("start date {start} is after end date {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },
}

/// Parse a date that must be exactly `YYYY-MM-DD`, zero padded.
///
/// chrono alone accepts unpadded fields (`2024-1-2`), so the shape is checked first.
pub fn parse_date(s: &str) -> Result<NaiveDate, DateError> {
    let b = s.as_bytes();
    let shape_ok = b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b.iter()
            .enumerate()
            .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit());
    if !shape_ok {
        return Err(DateError::InvalidFormat(s.to_string()));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| DateError::InvalidFormat(s.to_string()))
}

/// Parse a date token typed in chat: `YYYY-MM-DD` or `YYYYMMDD`.
pub fn parse_date_token(s: &str) -> Option<NaiveDate> {
    if let Ok(d) = parse_date(s) {
        return Some(d);
    }
    if s.len() == 8 && s.bytes().all(|c| c.is_ascii_digit()) {
        return NaiveDate::parse_from_str(s, "%Y%m%d").ok();
    }
    None
}

/// `YYYYMMDD`, the prefix of provider publish timestamps.
pub fn compact(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Closed calendar interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateError> {
        if start > end {
            return Err(DateError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse both ends strictly.
    pub fn parse(start: &str, end: &str) -> Result<Self, DateError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// News-sentiment window: `(YYYYMMDDT0000, YYYYMMDDT2359)`.
    pub fn sentiment_window(&self) -> (String, String) {
        (
            format!("{}T0000", compact(self.start)),
            format!("{}T2359", compact(self.end)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_padded_dates() {
        assert_eq!(
            parse_date("2024-01-02").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
    }

    #[test]
    fn rejects_other_shapes() {
        for bad in ["2024-1-2", "2024/01/02", "20240102", "", "2024-13-01", "2024-02-30", " 2024-01-02"] {
            assert!(parse_date(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn chat_token_accepts_compact_form() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(parse_date_token("20240102"), Some(d));
        assert_eq!(parse_date_token("2024-01-02"), Some(d));
        assert_eq!(parse_date_token("what"), None);
    }

    #[test]
    fn sentiment_window_format() {
        let r = DateRange::parse("2024-01-02", "2024-01-05").unwrap();
        assert_eq!(
            r.sentiment_window(),
            ("20240102T0000".to_string(), "20240105T2359".to_string())
        );
    }

    #[test]
    fn inverted_range_rejected() {
        assert!(matches!(
            DateRange::parse("2024-02-01", "2024-01-01"),
            Err(DateError::Inverted { .. })
        ));
    }

    proptest! {
        #[test]
        fn every_calendar_date_round_trips(days in 0i64..60_000) {
            let d = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap() + chrono::Duration::days(days);
            let s = d.format(DATE_FORMAT).to_string();
            prop_assert_eq!(parse_date(&s).unwrap(), d);
        }

        #[test]
        fn strings_without_dashes_rejected(s in "[0-9]{1,12}") {
            prop_assert!(parse_date(&s).is_err());
        }
    }
}
