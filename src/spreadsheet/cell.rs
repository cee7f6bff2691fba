use crate::helpers::datetime::parse_datetime;
use chrono::NaiveDateTime;
use regex::Regex;
use serde::Serialize;
use serde::Serializer;
use std::collections::HashSet;
use std::fmt::Display;
use std::sync::LazyLock;

/// Decimal literal with optional sign, fraction and exponent.
static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("Hardcode regex pattern")
});

/// Hexadecimal, octal or binary integer literal.
static RADIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^0([xX][0-9a-fA-F]+|[oO][0-7]+|[bB][01]+)$").expect("Hardcode regex pattern")
});

/// Minimum length a string must exceed before it is considered a date candidate.
/// Keeps short numeric-like tokens ("1-2", "12/3") out of the date class.
pub const DATE_CANDIDATE_MIN_LEN: usize = 5;

/// A single loosely typed value read from a sheet.
///
/// `Absent` is distinct from `Text("")`: the former means the row source had
/// no value, the latter is an empty string cell. Both count as null when profiling.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    /// Textual value
    Text(String),
    /// Numeric value
    Number(f64),
    /// Native boolean value
    Boolean(bool),
    /// Native date/time value
    Timestamp(NaiveDateTime),
    /// Missing value
    #[default]
    Absent,
}

/// Hashable identity of a present value, used for distinct counting.
/// Values of different variants never collide (`7` and `"7"` are distinct).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum CellKey {
    Text(String),
    Number(u64),
    Boolean(bool),
    Timestamp(NaiveDateTime),
}

impl CellValue {
    /// Returns true for `Absent`.
    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, CellValue::Absent)
    }

    /// Returns true if the value is absent or one of the `nulls` literals.
    pub fn is_null(&self, nulls: &HashSet<String>) -> bool {
        match self {
            CellValue::Text(text) => nulls.contains(text),
            _ => self.is_absent(),
        }
    }

    /// Coerces the value to a finite number.
    /// Native numbers pass through; text must parse completely.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(value) => Some(*value),
            CellValue::Text(value) => parse_number(value),
            _ => None,
        }
        .filter(|value| value.is_finite())
    }

    /// Coerces the value to a timestamp.
    /// Native timestamps pass through; text of more than five characters is parsed.
    pub fn to_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Timestamp(value) => Some(*value),
            CellValue::Text(value) if value.chars().count() > DATE_CANDIDATE_MIN_LEN => {
                parse_datetime(value)
            }
            _ => None,
        }
    }

    /// String form used to compare join keys.
    /// `7`, `7.0` and `"7"` all yield `"7"`, `-0` yields `"0"` and absent yields `""`.
    pub fn join_key(&self) -> String {
        match self {
            CellValue::Number(value) => (value + 0.0).to_string(),
            _ => self.to_string(),
        }
    }

    pub(crate) fn key(&self) -> Option<CellKey> {
        match self {
            CellValue::Text(value) => Some(CellKey::Text(value.to_owned())),
            // Normalise -0.0 so it does not count as a separate value
            CellValue::Number(value) => Some(CellKey::Number((value + 0.0).to_bits())),
            CellValue::Boolean(value) => Some(CellKey::Boolean(*value)),
            CellValue::Timestamp(value) => Some(CellKey::Timestamp(*value)),
            CellValue::Absent => None,
        }
    }
}

/// Parses a string that is entirely a finite number literal, ignoring surrounding whitespace.
pub(crate) fn parse_number(value: &str) -> Option<f64> {
    let value = value.trim();
    if DECIMAL.is_match(value) {
        value.parse::<f64>().ok().filter(|number| number.is_finite())
    } else if RADIX.is_match(value) {
        let radix = match value.as_bytes()[1] {
            b'x' | b'X' => 16,
            b'o' | b'O' => 8,
            _ => 2,
        };
        i64::from_str_radix(&value[2..], radix)
            .ok()
            .map(|number| number as f64)
    } else {
        None
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Text(value) => write!(f, "{value}"),
            CellValue::Number(value) => write!(f, "{value}"),
            CellValue::Boolean(value) => write!(f, "{value}"),
            CellValue::Timestamp(value) => write!(f, "{}", value.format("%Y-%m-%dT%H:%M:%S%.f")),
            CellValue::Absent => Ok(()),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            CellValue::Text(value) => serializer.serialize_str(value),
            CellValue::Number(value) => serializer.serialize_f64(*value),
            CellValue::Boolean(value) => serializer.serialize_bool(*value),
            CellValue::Timestamp(value) => value.serialize(serializer),
            CellValue::Absent => serializer.serialize_none(),
        }
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Absent,
            serde_json::Value::Bool(value) => CellValue::Boolean(value),
            serde_json::Value::Number(value) => value
                .as_f64()
                .map(CellValue::Number)
                .unwrap_or_else(|| CellValue::Text(value.to_string())),
            serde_json::Value::String(value) => CellValue::Text(value),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::Timestamp(value)
    }
}

impl<T> From<Option<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Absent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn number_literals() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number(" -3.5 "), Some(-3.5));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("0x1F"), Some(31.0));
        assert_eq!(parse_number("0b101"), Some(5.0));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("12abc"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn to_number_rejects_non_finite() {
        assert_eq!(CellValue::Number(f64::INFINITY).to_number(), None);
        assert_eq!(CellValue::from("7").to_number(), Some(7.0));
        assert_eq!(CellValue::Boolean(true).to_number(), None);
    }

    #[test]
    fn short_strings_are_not_dates() {
        assert_eq!(CellValue::from("1-2-3").to_timestamp(), None);
        assert!(CellValue::from("2024-01-31").to_timestamp().is_some());
    }

    #[test]
    fn join_key_is_loose() {
        assert_eq!(CellValue::Number(7.0).join_key(), "7");
        assert_eq!(CellValue::from("7").join_key(), "7");
        assert_eq!(CellValue::Number(7.5).join_key(), "7.5");
        assert_eq!(CellValue::Boolean(true).join_key(), "true");
        assert_eq!(CellValue::Number(-0.0).join_key(), CellValue::from("0").join_key());
        assert_eq!(CellValue::from("").join_key(), "");
        assert_eq!(CellValue::Absent.join_key(), "");
    }

    #[test]
    fn null_literals() {
        let nulls = HashSet::from(["".to_owned(), "N/A".to_owned()]);
        assert!(CellValue::Absent.is_null(&nulls));
        assert!(CellValue::from("N/A").is_null(&nulls));
        assert!(!CellValue::from("n/a").is_null(&nulls));
        assert!(!CellValue::Number(0.0).is_null(&nulls));
        assert!(CellValue::Absent.is_null(&HashSet::new()));
    }

    #[test]
    fn distinct_keys_keep_variants_apart() {
        assert_ne!(CellValue::Number(7.0).key(), CellValue::from("7").key());
        assert_eq!(CellValue::Number(0.0).key(), CellValue::Number(-0.0).key());
        assert_eq!(CellValue::Absent.key(), None);
    }

    #[test]
    fn from_json() {
        assert_eq!(CellValue::from(json!(null)), CellValue::Absent);
        assert_eq!(CellValue::from(json!(3)), CellValue::Number(3.0));
        assert_eq!(CellValue::from(json!("x")), CellValue::from("x"));
        assert_eq!(CellValue::from(json!(false)), CellValue::Boolean(false));
        assert_eq!(CellValue::from(json!([1, 2])), CellValue::from("[1,2]"));
    }

    #[test]
    fn serialize_untagged() {
        let values = vec![
            CellValue::from("a"),
            CellValue::Number(1.5),
            CellValue::Boolean(true),
            CellValue::Absent,
        ];
        assert_eq!(serde_json::to_value(&values).unwrap(), json!(["a", 1.5, true, null]));
    }
}
