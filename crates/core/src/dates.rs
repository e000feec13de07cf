//! Normalization of the backend's date representations.
//!
//! Depending on the endpoint the backend sends dates as ISO strings or as
//! Jackson-style arrays (`[2025, 5, 23]` or `[2025, 5, 23, 14, 30, 0]`, with
//! a 1-indexed month). Forms want a plain `YYYY-MM-DD`, models want a
//! [`NaiveDateTime`]; both conversions live here.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;
use tracing::warn;

/// Format used for date inputs.
pub const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

/// Format used when sending date-times back to the backend.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Convert any backend date value into a `YYYY-MM-DD` string.
///
/// Never fails: `null`, unparseable strings and unsupported shapes all give
/// `""` (the latter two with a warning).
///
/// ```
/// use bookstore_core::dates::to_date_input_value;
/// use serde_json::json;
///
/// assert_eq!(to_date_input_value(&json!([2025, 5, 23])), "2025-05-23");
/// assert_eq!(to_date_input_value(&json!("2025-05-23")), "2025-05-23");
/// assert_eq!(to_date_input_value(&json!("2025-05-23T10:00:00Z")), "2025-05-23");
/// assert_eq!(to_date_input_value(&json!(null)), "");
/// ```
#[must_use]
pub fn to_date_input_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) if is_date_input(s) => s.clone(),
        Value::String(s) => parse_date_string(s).map_or_else(
            || {
                warn!(value = %s, "unparseable date string");
                String::new()
            },
            |dt| dt.date().format(DATE_INPUT_FORMAT).to_string(),
        ),
        Value::Array(parts) if parts.len() >= 3 => {
            let ymd: Option<Vec<u64>> = parts.iter().take(3).map(whole_number).collect();
            match ymd.as_deref() {
                Some([year, month, day]) => format!("{year:04}-{month:02}-{day:02}"),
                _ => {
                    warn!(value = %value, "date array with non-numeric parts");
                    String::new()
                }
            }
        }
        other => {
            warn!(value = %other, "unsupported date shape");
            String::new()
        }
    }
}

/// Convert an already-decoded model date into a `YYYY-MM-DD` string.
#[must_use]
pub fn format_date_input(value: Option<NaiveDateTime>) -> String {
    value.map_or_else(String::new, |dt| dt.format(DATE_INPUT_FORMAT).to_string())
}

/// Whether `s` already has the `YYYY-MM-DD` shape (digits are not range-checked).
fn is_date_input(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Parse the date string formats the backend is known to emit.
///
/// Offset-bearing timestamps are converted to UTC first; bare dates become
/// midnight.
#[must_use]
pub fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    if let Some(dt) = NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, DATE_INPUT_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
    {
        return Some(date.and_time(NaiveTime::MIN));
    }
    DateTime::parse_from_rfc2822(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).naive_utc())
}

/// A non-negative integer, also when encoded as a float such as `2025.0`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_number(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(f))
            .map(|f| f as u64)
    })
}

/// Interpret a Jackson date array: `[y, m, d, h?, min?, s?, nanos?]`.
fn from_parts(parts: &[Value]) -> Option<NaiveDateTime> {
    let nums: Option<Vec<u32>> = parts
        .iter()
        .map(|v| whole_number(v).and_then(|n| u32::try_from(n).ok()))
        .collect();
    let nums = nums?;
    let part = |i: usize| nums.get(i).copied().unwrap_or(0);
    let year = i32::try_from(*nums.first()?).ok()?;
    let date = NaiveDate::from_ymd_opt(year, part(1), part(2))?;
    let time = NaiveTime::from_hms_nano_opt(part(3), part(4), part(5), part(6))?;
    Some(date.and_time(time))
}

/// Decode any supported date value into a date-time, logging what is dropped.
#[must_use]
pub fn parse_date_value(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Null => None,
        Value::String(s) => parse_date_string(s).or_else(|| {
            warn!(value = %s, "unparseable date string");
            None
        }),
        Value::Array(parts) if parts.len() >= 3 => from_parts(parts).or_else(|| {
            warn!(value = %value, "invalid date array");
            None
        }),
        other => {
            warn!(value = %other, "unsupported date shape");
            None
        }
    }
}

/// Serde adapter for `Option<NaiveDateTime>` fields that may arrive as a
/// string or a date array.
///
/// ```
/// use chrono::NaiveDateTime;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Row {
///     #[serde(default, with = "bookstore_core::dates::flexible")]
///     created_at: Option<NaiveDateTime>,
/// }
///
/// let row: Row = serde_json::from_str(r#"{"created_at":[2025,5,23,8,0,0]}"#).unwrap();
/// assert_eq!(row.created_at.unwrap().to_string(), "2025-05-23 08:00:00");
/// ```
pub mod flexible {
    use super::{DATE_TIME_FORMAT, Deserialize, Deserializer, NaiveDateTime, Serializer, Value};

    /// Lenient: malformed values become `None` rather than failing the whole payload.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(super::parse_date_value(&value))
    }

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.collect_str(&dt.format(DATE_TIME_FORMAT)),
            None => serializer.serialize_none(),
        }
    }
}
