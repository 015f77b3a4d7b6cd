//! Normalizes the timestamp strings Spotify hands back.
//!
//! `added_at` is usually `2023-01-01T00:00:00Z`, but offset notation and
//! naive datetimes show up too (and the cache file may have been edited by
//! hand). Everything is normalized to a timezone-aware UTC instant; naive
//! input is assumed to already be UTC.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{Error, Result};

/// Parse an ISO-8601 timestamp into a UTC instant.
///
/// Accepts trailing-`Z`, explicit offsets (`+02:00`), and naive datetimes
/// with or without fractional seconds. Naive values are taken as UTC (a
/// policy choice, not something the API guarantees).
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(rfc3339_err) => value
            .parse::<NaiveDateTime>()
            .map(|naive| naive.and_utc())
            .map_err(|_| Error::Timestamp {
                value: value.to_string(),
                source: rfc3339_err,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_utc_z_notation() {
        let dt = parse_timestamp("2023-06-15T12:30:00Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2023, 6, 15, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_explicit_offset() {
        let dt = parse_timestamp("2023-06-15T14:30:00+02:00").unwrap();
        // +02:00 normalizes back to 12:30 UTC
        assert_eq!(dt, Utc.with_ymd_and_hms(2023, 6, 15, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_assumed_utc() {
        let dt = parse_timestamp("2023-06-15T12:30:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2023, 6, 15, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let with_offset = parse_timestamp("2023-06-15T12:30:00.123456+00:00").unwrap();
        let naive = parse_timestamp("2023-06-15T12:30:00.123456").unwrap();
        assert_eq!(with_offset, naive);
    }

    #[test]
    fn test_parse_malformed_is_an_error() {
        for bad in ["", "not a date", "2023-13-99T00:00:00Z", "12:30:00"] {
            let err = parse_timestamp(bad).unwrap_err();
            match err {
                Error::Timestamp { value, .. } => assert_eq!(value, bad),
                other => panic!("unexpected variant: {other:?}"),
            }
        }
    }

    #[test]
    fn test_notations_compare_consistently() {
        let older = parse_timestamp("2023-06-15T12:29:59Z").unwrap();
        let newer = parse_timestamp("2023-06-15T14:30:00+02:00").unwrap();
        assert!(older < newer);
    }
}
