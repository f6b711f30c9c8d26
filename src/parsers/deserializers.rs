use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO 8601 timestamp, returning `None` when it cannot be understood
///
/// A trailing `Z` is the same instant as `+00:00`. Timestamps without an offset are taken
/// as UTC, and a bare date is midnight UTC.
///
/// # Examples
///
/// ```
/// use chat_ffs::parsers::deserializers::parse_iso_timestamp;
///
/// let z = parse_iso_timestamp("2024-01-15T10:00:00Z");
/// let offset = parse_iso_timestamp("2024-01-15T10:00:00+00:00");
/// assert!(z.is_some());
/// assert_eq!(z, offset);
/// ```
pub fn parse_iso_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }

    // RFC 3339 requires the `T`; ISO 8601 also allows a space
    if let Ok(ts) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(ts.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    warn!(timestamp = text, "Failed to parse timestamp");
    None
}

/// Convert fractional seconds since the Unix epoch to UTC, keeping microsecond precision
pub fn timestamp_from_epoch_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let micros = (seconds * 1_000_000.0).round();
    if micros < i64::MIN as f64 || micros > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_micros(micros as i64)
}

/// Lenient timestamp deserializer for optional fields
///
/// Accepts ISO 8601 strings and numeric epoch seconds. Anything unparsable becomes `None`
/// so the caller can apply its default-or-skip rule instead of failing the whole record.
pub fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::String(s) => parse_iso_timestamp(&s),
        Value::Number(n) => n.as_f64().and_then(timestamp_from_epoch_seconds),
        other => {
            warn!(value = %other, "Ignoring timestamp of unexpected type");
            None
        }
    })
}

/// Deserializer for optional text fields that tolerates `null`
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
