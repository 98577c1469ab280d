//! Normalization of loosely-typed source fields.
//!
//! `teams.json` and `matches.json` are edited by hand, so any scalar may be
//! absent, empty, a string where a number belongs, or plain garbage. The
//! models keep such fields as raw [`serde_json::Value`]s and every consumer
//! goes through these helpers, which never fail.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Placeholder shown for anything not yet announced.
pub const TBA: &str = "TBA";

/// Naive timestamp layouts accepted in `time` fields, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// How much of a timestamp a date label shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateStyle {
    /// `01/15 20:00`, used on cards and lists.
    #[default]
    Short,
    /// `2025/01/15 20:00`, used on the match detail header.
    Full,
}

impl DateStyle {
    fn pattern(self) -> &'static str {
        match self {
            DateStyle::Short => "%m/%d %H:%M",
            DateStyle::Full => "%Y/%m/%d %H:%M",
        }
    }
}

/// Coerce a raw field to a finite number.
///
/// `null`, a missing field, an empty (or blank) string, containers and
/// anything that does not parse as a finite number all yield `None`.
pub fn to_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
        Value::Bool(flag) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
    };
    number.is_finite().then_some(number)
}

/// Render a number the way the site prints scores and stats: integral
/// values without a fractional part, everything else in shortest form.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // also folds -0
        return "0".to_string();
    }
    value.to_string()
}

/// String form of a raw field, or `None` when it is null or empty.
pub fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.as_f64().map(format_number).unwrap_or_else(|| n.to_string())),
        Value::Bool(flag) => Some(flag.to_string()),
        other => Some(other.to_string()),
    }
}

/// String form of a raw field, falling back when it is null or empty.
pub fn safe_text(value: &Value, fallback: &str) -> String {
    text_of(value).unwrap_or_else(|| fallback.to_string())
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64().map_or(false, |f| f == 0.0),
        _ => false,
    }
}

/// Parse a `time` field into a wall-clock timestamp.
///
/// Offset-carrying timestamps keep their own wall-clock time; numbers are
/// read as milliseconds since the Unix epoch.
pub fn parse_time(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Number(n) => {
            let millis = n.as_f64()?;
            if !millis.is_finite() {
                return None;
            }
            DateTime::from_timestamp_millis(millis as i64).map(|dt| dt.naive_utc())
        }
        Value::String(s) => parse_time_str(s.trim()),
        _ => None,
    }
}

fn parse_time_str(s: &str) -> Option<NaiveDateTime> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Sort key for a `time` field in milliseconds since the epoch.
///
/// Missing or unparseable times sort as the epoch itself. Offset-carrying
/// timestamps are compared by their actual instant.
pub fn time_key(value: &Value) -> i64 {
    if let Value::String(s) = value {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s.trim()) {
            return dt.timestamp_millis();
        }
    }
    parse_time(value)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(0)
}

/// Display label for a `time` field.
///
/// Empty input gives `TBA`; input that is not a recognizable date is shown
/// as-is.
pub fn to_date_label(value: &Value, style: DateStyle) -> String {
    if is_falsy(value) {
        return TBA.to_string();
    }
    match parse_time(value) {
        Some(dt) => dt.format(style.pattern()).to_string(),
        None => safe_text(value, TBA),
    }
}

/// Deserialize a nested value, degrading to its default when the source
/// holds something of the wrong shape.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Deserialize a sequence leniently: a non-array becomes empty and each
/// malformed element becomes its default.
pub fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}
