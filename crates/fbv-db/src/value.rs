//! Field values for model records.
//!
//! [`Value`] is what a [`Model`](crate::model::Model) reports for each of its
//! fields. [`Value::to_json`] turns it into JSON the same way for every view:
//! temporal values become ISO-8601 text, UUIDs become hyphenated strings and
//! binary data becomes base64.

use std::fmt;

use base64::Engine as _;
use chrono::{Timelike, Utc};

/// A field value of a model instance.
///
/// # Examples
///
/// ```
/// use fbv_db::value::Value;
///
/// let v = Value::from(42_i64);
/// assert_eq!(v, Value::Int(42));
///
/// let v = Value::from("hello");
/// assert_eq!(v, Value::String("hello".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The absence of a value.
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A UTF-8 string.
    String(String),
    /// Raw binary data.
    Bytes(Vec<u8>),
    /// A date without time.
    Date(chrono::NaiveDate),
    /// A date and time without timezone.
    DateTime(chrono::NaiveDateTime),
    /// A date and time in UTC.
    DateTimeTz(chrono::DateTime<Utc>),
    /// A time without date.
    Time(chrono::NaiveTime),
    /// A duration.
    Duration(chrono::Duration),
    /// A UUID value.
    Uuid(uuid::Uuid),
    /// An arbitrary JSON document.
    Json(serde_json::Value),
    /// A list of values.
    List(Vec<Value>),
}

impl Value {
    /// Returns `true` if this value is `Null`.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Attempts to extract an integer value.
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Encodes this value as JSON.
    ///
    /// - Datetimes: `YYYY-MM-DDTHH:MM:SS`, plus `.mmm` when the sub-second
    ///   part is non-zero, plus `Z` for UTC values.
    /// - Dates: `YYYY-MM-DD`. Times: `HH:MM:SS[.mmm]`.
    /// - Durations: `P{days}DT{HH}H{MM}M{SS}[.ffffff]S`, prefixed with `-`
    ///   for negative durations.
    /// - Non-finite floats become `null`.
    ///
    /// ```
    /// use fbv_db::value::Value;
    ///
    /// let d = chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    /// assert_eq!(Value::Date(d).to_json(), serde_json::json!("2024-01-15"));
    /// ```
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Self::Null => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Int(i) => Json::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Self::String(s) => Json::String(s.clone()),
            Self::Bytes(b) => Json::String(base64::engine::general_purpose::STANDARD.encode(b)),
            Self::Date(d) => Json::String(d.format("%Y-%m-%d").to_string()),
            Self::DateTime(dt) => Json::String(format!(
                "{}{}",
                dt.format("%Y-%m-%dT%H:%M:%S"),
                millis_suffix(dt.nanosecond())
            )),
            Self::DateTimeTz(dt) => Json::String(format!(
                "{}{}Z",
                dt.format("%Y-%m-%dT%H:%M:%S"),
                millis_suffix(dt.nanosecond())
            )),
            Self::Time(t) => Json::String(format!(
                "{}{}",
                t.format("%H:%M:%S"),
                millis_suffix(t.nanosecond())
            )),
            Self::Duration(d) => Json::String(duration_iso_string(*d)),
            Self::Uuid(u) => Json::String(u.hyphenated().to_string()),
            Self::Json(j) => j.clone(),
            Self::List(vals) => Json::Array(vals.iter().map(Self::to_json).collect()),
        }
    }
}

/// `.mmm` for a non-zero sub-second part, truncated to milliseconds.
fn millis_suffix(nanos: u32) -> String {
    let micros = (nanos % 1_000_000_000) / 1_000;
    if micros == 0 {
        String::new()
    } else {
        format!(".{:03}", micros / 1_000)
    }
}

fn duration_iso_string(duration: chrono::Duration) -> String {
    let (sign, duration) = if duration < chrono::Duration::zero() {
        ("-", -duration)
    } else {
        ("", duration)
    };

    let total_seconds = duration.num_seconds();
    let micros = duration.subsec_nanos() / 1_000;
    let days = total_seconds / 86_400;
    let seconds = total_seconds % 86_400;
    let (hours, minutes, seconds) = (seconds / 3_600, (seconds % 3_600) / 60, seconds % 60);

    let fraction = if micros == 0 {
        String::new()
    } else {
        format!(".{micros:06}")
    };
    format!("{sign}P{days}DT{hours:02}H{minutes:02}M{seconds:02}{fraction}S")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "None"),
            Self::String(s) => write!(f, "{s}"),
            Self::Json(j) => write!(f, "{j}"),
            other => match other.to_json() {
                serde_json::Value::String(s) => write!(f, "{s}"),
                json => write!(f, "{json}"),
            },
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::String(s) => Self::String(s),
            Value::Json(j) => j,
            other => other.to_json(),
        }
    }
}

// ── From implementations ───────────────────────────────────────────────

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<chrono::NaiveDate> for Value {
    fn from(v: chrono::NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<chrono::NaiveDateTime> for Value {
    fn from(v: chrono::NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<chrono::DateTime<Utc>> for Value {
    fn from(v: chrono::DateTime<Utc>) -> Self {
        Self::DateTimeTz(v)
    }
}

impl From<chrono::NaiveTime> for Value {
    fn from(v: chrono::NaiveTime) -> Self {
        Self::Time(v)
    }
}

impl From<chrono::Duration> for Value {
    fn from(v: chrono::Duration) -> Self {
        Self::Duration(v)
    }
}

impl From<uuid::Uuid> for Value {
    fn from(v: uuid::Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn datetime(micro: u32) -> chrono::NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_micro_opt(12, 30, 5, micro)
            .unwrap()
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(Some(42_i64)), Value::Int(42));
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }

    #[test]
    fn test_scalars_to_json() {
        assert_eq!(Value::Null.to_json(), json!(null));
        assert_eq!(Value::Bool(true).to_json(), json!(true));
        assert_eq!(Value::Int(123).to_json(), json!(123));
        assert_eq!(Value::Float(1.5).to_json(), json!(1.5));
        assert_eq!(Value::Float(f64::NAN).to_json(), json!(null));
        assert_eq!(Value::from("test123").to_json(), json!("test123"));
    }

    #[test]
    fn test_naive_datetime_to_json() {
        assert_eq!(Value::DateTime(datetime(0)).to_json(), json!("2024-01-15T12:30:05"));
        assert_eq!(
            Value::DateTime(datetime(123_456)).to_json(),
            json!("2024-01-15T12:30:05.123")
        );
        assert_eq!(
            Value::DateTime(datetime(500)).to_json(),
            json!("2024-01-15T12:30:05.000")
        );
    }

    #[test]
    fn test_utc_datetime_to_json() {
        let dt = datetime(250_000).and_utc();
        assert_eq!(Value::DateTimeTz(dt).to_json(), json!("2024-01-15T12:30:05.250Z"));
    }

    #[test]
    fn test_time_to_json() {
        let t = chrono::NaiveTime::from_hms_micro_opt(8, 5, 9, 987_654).unwrap();
        assert_eq!(Value::Time(t).to_json(), json!("08:05:09.987"));
        let t = chrono::NaiveTime::from_hms_opt(23, 59, 0).unwrap();
        assert_eq!(Value::Time(t).to_json(), json!("23:59:00"));
    }

    #[test]
    fn test_duration_to_json() {
        let d = chrono::Duration::days(1) + chrono::Duration::hours(2) + chrono::Duration::seconds(3);
        assert_eq!(Value::Duration(d).to_json(), json!("P1DT02H00M03S"));

        let d = chrono::Duration::minutes(5) + chrono::Duration::microseconds(42);
        assert_eq!(Value::Duration(d).to_json(), json!("P0DT00H05M00.000042S"));

        let d = -chrono::Duration::hours(26);
        assert_eq!(Value::Duration(d).to_json(), json!("-P1DT02H00M00S"));

        let d = -chrono::Duration::minutes(90);
        assert_eq!(Value::Duration(d).to_json(), json!("-P0DT01H30M00S"));
    }

    #[test]
    fn test_uuid_and_bytes_to_json() {
        let u = uuid::Uuid::nil();
        assert_eq!(
            Value::Uuid(u).to_json(),
            json!("00000000-0000-0000-0000-000000000000")
        );
        assert_eq!(Value::Bytes(b"fbv".to_vec()).to_json(), json!("ZmJ2"));
    }

    #[test]
    fn test_list_and_json_to_json() {
        let list = Value::List(vec![Value::Int(1), Value::from("a"), Value::Null]);
        assert_eq!(list.to_json(), json!([1, "a", null]));
        let doc = json!({"nested": [1, 2]});
        assert_eq!(Value::Json(doc.clone()).to_json(), doc);
    }

    #[test]
    fn test_into_serde_json() {
        let v: serde_json::Value = Value::from("abc").into();
        assert_eq!(v, json!("abc"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "None");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::from("hello").to_string(), "hello");
        assert_eq!(
            Value::Date(chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()).to_string(),
            "2024-02-29"
        );
    }

    #[test]
    fn test_accessors() {
        assert!(Value::Null.is_null());
        assert_eq!(Value::Int(7).as_int(), Some(7));
        assert_eq!(Value::Bool(true).as_int(), None);
        assert_eq!(Value::from("x").as_str(), Some("x"));
    }
}
