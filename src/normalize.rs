//! Normalizer and materializer for raw time values
//!
//! Converts date and timestamp values into the canonical `i64` unit of a
//! [`Dimension`] and back:
//!
//! - `date`: days since 1970-01-01, written back as `YYYY-MM-DD`
//! - `timestamp`: seconds since the Unix epoch, written back as RFC 3339 UTC
//!
//! JSON integers are taken as already canonical in either dimension.
//! Sub-second timestamps are rejected, never rounded.
//!
//! # Example
//!
//! ```rust
//! use interval_collapse::normalize::{materialize_value, parse_date, parse_timestamp};
//! use interval_collapse::types::Dimension;
//!
//! assert_eq!(parse_date("1970-01-02").unwrap(), 1);
//! assert_eq!(parse_timestamp("1970-01-01T00:01:00Z").unwrap(), 60);
//! assert!(parse_timestamp("1970-01-01T00:01:00.5Z").is_err());
//! assert_eq!(materialize_value(1, Dimension::Date), "1970-01-02");
//! ```

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, Timelike, Utc};
use serde_json::Value;

use crate::types::Dimension;

/// `NaiveDate::num_days_from_ce` of 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

const NAIVE_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

fn date_to_days(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE
}

/// Parse any accepted timestamp spelling into a UTC date-time, keeping
/// fractional seconds
fn parse_instant(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Parse a date into days since 1970-01-01
///
/// Accepts `YYYY-MM-DD`. Full timestamps are accepted too and truncated to
/// their UTC date.
pub fn parse_date(s: &str) -> Result<i64, String> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date_to_days(date));
    }

    parse_instant(s)
        .map(|dt| date_to_days(dt.date()))
        .ok_or_else(|| format!("expected a date like 1970-01-31, got '{}'", s))
}

/// Parse a timestamp into seconds since the Unix epoch
///
/// Accepts RFC 3339 (offset honoured), naive `YYYY-MM-DD HH:MM:SS` or
/// `YYYY-MM-DDTHH:MM:SS` read as UTC, and bare dates at midnight UTC.
/// A non-zero fractional second is an error.
pub fn parse_timestamp(s: &str) -> Result<i64, String> {
    let s = s.trim();
    let dt = parse_instant(s).ok_or_else(|| {
        format!(
            "expected a timestamp like 1970-01-31T12:00:00Z, got '{}'",
            s
        )
    })?;

    if dt.nanosecond() != 0 {
        return Err(format!(
            "sub-second timestamps are not supported, got '{}'",
            s
        ));
    }
    Ok(dt.and_utc().timestamp())
}

/// Normalize a JSON value into the canonical unit of `dimension`
///
/// Strings are parsed, integers pass through unchanged. Floats are accepted
/// only when they hold a whole number of the dimension's unit.
pub fn normalize_value(value: &Value, dimension: Dimension) -> Result<i64, String> {
    match value {
        Value::String(s) => match dimension {
            Dimension::Date => parse_date(s),
            Dimension::Timestamp => parse_timestamp(s),
        },
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            let f = n
                .as_f64()
                .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .ok_or_else(|| format!("number {} is out of range", n))?;
            if f.fract() == 0.0 {
                return Ok(f as i64);
            }
            Err(format!(
                "expected a whole number of {}, got {}",
                dimension.unit(),
                n
            ))
        },
        Value::Null => Err("value is null".to_string()),
        other => Err(format!("expected a string or integer, got {}", other)),
    }
}

/// Materialize a canonical value as a JSON value
///
/// Values outside chrono's calendar range come back as plain integers.
pub fn materialize_value(value: i64, dimension: Dimension) -> Value {
    let rendered = match dimension {
        Dimension::Date => value
            .checked_add(UNIX_EPOCH_DAYS_FROM_CE)
            .and_then(|days| i32::try_from(days).ok())
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .map(|date| date.format("%Y-%m-%d").to_string()),
        Dimension::Timestamp => DateTime::<Utc>::from_timestamp(value, 0)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
    };

    rendered.map(Value::String).unwrap_or_else(|| Value::from(value))
}
