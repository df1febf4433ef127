//! Coercion of raw record values into comparable numbers, timestamps and text.
//!
//! Records arrive as loosely typed JSON straight from the data layer, so the
//! same logical field can show up as a number, a numeric string, or not at
//! all. The helpers here turn a present [`serde_json::Value`] into the shape a
//! predicate stage needs. Absent values are the caller's concern: each stage
//! decides for itself whether a missing field keeps or drops a record.

use std::borrow::Cow;
use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Numeric value read from a record or a filter input.
///
/// Numbers are stored in one of three variants to preserve precision:
/// - `I64` for signed integers
/// - `U64` for unsigned integers
/// - `F64` for floating point (including the NaN sentinel)
///
/// Comparisons between different numeric types are handled by converting
/// to `f64`. Any comparison involving NaN yields `None`, which every stage
/// treats as "no match".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// The not-a-number sentinel produced by malformed numeric input.
    pub const NAN: Number = Number::F64(f64::NAN);

    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Returns `true` for the NaN sentinel.
    pub fn is_nan(self) -> bool {
        matches!(self, Number::F64(n) if n.is_nan())
    }

    /// Compares two numbers, handling mixed types.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::I64(a), Number::U64(b)) => Some(compare_signed_unsigned(a, b)),
            (Number::U64(a), Number::I64(b)) => Some(compare_signed_unsigned(b, a).reverse()),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }

    /// Parses user or record text into a number.
    ///
    /// Surrounding whitespace is ignored. Text that is neither an integer nor
    /// a decimal yields [`Number::NAN`].
    pub fn parse(text: &str) -> Number {
        let text = text.trim();
        if let Ok(n) = text.parse::<i64>() {
            return Number::I64(n);
        }
        if let Ok(n) = text.parse::<u64>() {
            return Number::U64(n);
        }
        text.parse::<f64>().map(Number::F64).unwrap_or(Number::NAN)
    }

    /// Coerces a present record value into a number.
    ///
    /// JSON numbers convert exactly and strings go through [`Number::parse`].
    /// Booleans, arrays, objects and null are not numbers and yield NaN.
    pub fn from_json(value: &Value) -> Number {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Number::I64(i)
                } else if let Some(u) = n.as_u64() {
                    Number::U64(u)
                } else {
                    n.as_f64().map(Number::F64).unwrap_or(Number::NAN)
                }
            }
            Value::String(s) => Number::parse(s),
            _ => Number::NAN,
        }
    }
}

fn compare_signed_unsigned(a: i64, b: u64) -> Ordering {
    if a < 0 {
        Ordering::Less
    } else {
        (a as u64).cmp(&b)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::I64(n as i64)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::I64(n)
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        Number::U64(n)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::F64(n)
    }
}

/// Strict integer parse used for id filters.
///
/// Returns `None` when the text is not a whole integer, which callers treat
/// as the un-matchable sentinel.
pub fn parse_integer(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok()
}

/// Point in time as milliseconds since the Unix epoch (UTC).
///
/// ```
/// use lending_filter::Timestamp;
///
/// assert!(Timestamp(1000) < Timestamp(2000));
/// assert_eq!(Timestamp::from_secs(2).as_millis(), 2000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

const MILLIS_PER_DAY: i64 = 86_400_000;

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

impl Timestamp {
    /// Creates a new timestamp from milliseconds since Unix epoch.
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Creates a new timestamp from seconds since Unix epoch.
    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs * 1000)
    }

    /// Returns the timestamp as milliseconds since Unix epoch.
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Midnight (00:00:00.000 UTC) of the given calendar day.
    pub fn start_of_day(date: NaiveDate) -> Self {
        Timestamp(date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis())
    }

    /// Last millisecond (23:59:59.999 UTC) of the given calendar day.
    pub fn end_of_day(date: NaiveDate) -> Self {
        Timestamp(Self::start_of_day(date).0 + MILLIS_PER_DAY - 1)
    }

    /// Parses a record date string.
    ///
    /// Accepted shapes:
    /// - RFC 3339 with offset (`2024-03-01T10:00:00Z`, `...+02:00`)
    /// - Postgres text with offset (`2024-03-01 10:00:00.123+00`)
    /// - naive date-time with `T` or space separator, read as UTC
    /// - bare calendar date, read as UTC midnight
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(Timestamp(dt.timestamp_millis()));
        }
        if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%#z") {
            return Some(Timestamp(dt.timestamp_millis()));
        }
        for format in NAIVE_DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
                return Some(Timestamp(dt.and_utc().timestamp_millis()));
            }
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .map(Self::start_of_day)
    }

    /// Coerces a present record value into a timestamp.
    ///
    /// Strings go through [`Timestamp::parse`]; JSON numbers are read as
    /// epoch milliseconds. Anything else does not parse.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
                .map(Timestamp),
            _ => None,
        }
    }
}

impl From<i64> for Timestamp {
    fn from(millis: i64) -> Self {
        Timestamp(millis)
    }
}

/// Text used when matching a value against a search term.
///
/// Strings match on their content, numbers and booleans on their display
/// form. Null, arrays and objects have no searchable text.
pub fn display_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(format_number(n))),
        Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        _ => None,
    }
}

fn format_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        // f64 Display drops a trailing ".0", matching how the UI renders it
        n.as_f64().map(|f| f.to_string()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn number_comparisons_same_type() {
        assert_eq!(Number::I64(5).compare(Number::I64(10)), Some(Ordering::Less));
        assert_eq!(
            Number::U64(10).compare(Number::U64(5)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Number::F64(5.0).compare(Number::F64(5.0)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn number_comparisons_mixed_types() {
        assert_eq!(Number::I64(-1).compare(Number::U64(0)), Some(Ordering::Less));
        assert_eq!(Number::I64(5).compare(Number::F64(5.0)), Some(Ordering::Equal));
        assert_eq!(
            Number::U64(10).compare(Number::F64(5.5)),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn nan_never_compares() {
        assert_eq!(Number::NAN.compare(Number::I64(1)), None);
        assert_eq!(Number::I64(1).compare(Number::NAN), None);
        assert!(Number::NAN.is_nan());
        assert!(!Number::F64(1.5).is_nan());
    }

    #[test]
    fn number_parse() {
        assert_eq!(Number::parse(" 42 "), Number::I64(42));
        assert_eq!(Number::parse("19.99"), Number::F64(19.99));
        assert!(Number::parse("abc").is_nan());
        assert!(Number::parse("").is_nan());
    }

    #[test]
    fn number_from_json() {
        assert_eq!(Number::from_json(&json!(7)), Number::I64(7));
        assert_eq!(Number::from_json(&json!(2.5)), Number::F64(2.5));
        // Postgres numeric columns come through as strings
        assert_eq!(Number::from_json(&json!("120.50")), Number::F64(120.5));
        assert!(Number::from_json(&json!(true)).is_nan());
        assert!(Number::from_json(&json!(null)).is_nan());
    }

    #[test]
    fn integer_parse_is_strict() {
        assert_eq!(parse_integer("12"), Some(12));
        assert_eq!(parse_integer(" 3 "), Some(3));
        assert_eq!(parse_integer("3.5"), None);
        assert_eq!(parse_integer("Books"), None);
    }

    #[test]
    fn day_bounds() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let start = Timestamp::start_of_day(day);
        let end = Timestamp::end_of_day(day);
        assert_eq!(start.as_millis(), 1_709_251_200_000);
        assert_eq!(end.as_millis() - start.as_millis(), MILLIS_PER_DAY - 1);
    }

    #[test]
    fn timestamp_parse_shapes() {
        let midnight = Timestamp(1_709_251_200_000);
        assert_eq!(Timestamp::parse("2024-03-01"), Some(midnight));
        assert_eq!(Timestamp::parse("2024-03-01T00:00:00Z"), Some(midnight));
        assert_eq!(Timestamp::parse("2024-03-01T00:00:00.000"), Some(midnight));
        assert_eq!(Timestamp::parse("2024-03-01 00:00:00"), Some(midnight));
        assert_eq!(Timestamp::parse("2024-03-01 02:00:00+02"), Some(midnight));
        assert_eq!(
            Timestamp::parse("2024-03-01T01:00:00+01:00"),
            Some(midnight)
        );
        assert_eq!(Timestamp::parse("not a date"), None);
        assert_eq!(Timestamp::parse(""), None);
    }

    #[test]
    fn timestamp_from_json() {
        assert_eq!(Timestamp::from_json(&json!(1000)), Some(Timestamp(1000)));
        assert_eq!(
            Timestamp::from_json(&json!("2024-03-01")),
            Some(Timestamp(1_709_251_200_000))
        );
        assert_eq!(Timestamp::from_json(&json!(null)), None);
        assert_eq!(Timestamp::from_json(&json!(false)), None);
    }

    #[test]
    fn display_text_forms() {
        assert_eq!(display_text(&json!("Widget")).as_deref(), Some("Widget"));
        assert_eq!(display_text(&json!(15)).as_deref(), Some("15"));
        assert_eq!(display_text(&json!(15.0)).as_deref(), Some("15"));
        assert_eq!(display_text(&json!(2.5)).as_deref(), Some("2.5"));
        assert_eq!(display_text(&json!(true)).as_deref(), Some("true"));
        assert_eq!(display_text(&json!(null)), None);
        assert_eq!(display_text(&json!({"a": 1})), None);
    }
}
