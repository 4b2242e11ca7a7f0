//! Datetime helpers.
//!
//! - Serialization: `DateTime<Utc>` -> RFC3339 string with millisecond precision
//!   and a `Z` suffix, so identical instants always render identically
//! - Parsing: RFC3339 string or Unix timestamp (JSON value) -> `DateTime<Utc>`

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serializer;
use serde_json::Value;

/// Canonical text form used by every exporter.
pub fn format(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serializes `DateTime<Utc>` in the canonical text form.
pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(dt))
}

/// `Option<DateTime<Utc>>` serializer helpers.
pub mod option {
    use super::{format, DateTime, Serializer, Utc};

    /// Serializes `Option<DateTime<Utc>>` in the canonical text form or `null`.
    pub fn serialize<S>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match dt {
            Some(dt) => serializer.serialize_some(&format(dt)),
            None => serializer.serialize_none(),
        }
    }
}

/// Parses a JSON value as an instant.
///
/// Accepts an RFC3339 string, a numeric string, or a Unix timestamp in
/// seconds or milliseconds.
pub fn parse_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_str(s),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().and_then(|v| i64::try_from(v).ok()))
            .and_then(parse_unix_timestamp),
        _ => None,
    }
}

/// Parses a string as RFC3339, falling back to a Unix timestamp.
pub fn parse_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    s.parse::<i64>().ok().and_then(parse_unix_timestamp)
}

/// Parses a Unix timestamp with second/millisecond auto-detection.
fn parse_unix_timestamp(ts: i64) -> Option<DateTime<Utc>> {
    // Values larger than 10^11 are interpreted as milliseconds.
    if ts > 100_000_000_000 {
        DateTime::from_timestamp_millis(ts)
    } else {
        DateTime::from_timestamp(ts, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn format_is_fixed_width_utc() {
        let dt = parse_str("2024-03-01T12:00:00+02:00").unwrap();
        assert_eq!(format(&dt), "2024-03-01T10:00:00.000Z");
    }

    #[test]
    fn parses_rfc3339_string() {
        let dt = parse_value(&json!("2024-03-01T12:34:56.789Z")).unwrap();
        assert_eq!(dt.timestamp_millis(), 1_709_296_496_789);
    }

    #[test]
    fn parses_unix_seconds_and_millis() {
        let secs = parse_value(&json!(1_709_296_496)).unwrap();
        let millis = parse_value(&json!(1_709_296_496_000_i64)).unwrap();
        assert_eq!(secs, millis);
        assert_eq!(parse_value(&json!("1709296496")), Some(secs));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_value(&json!("yesterday")), None);
        assert_eq!(parse_value(&json!(null)), None);
        assert_eq!(parse_value(&json!(true)), None);
        assert_eq!(parse_value(&json!(1.5)), None);
    }
}
