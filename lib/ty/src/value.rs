//! # Values (and their comparisons)
//!
//! This module provides [`Value`], the tagged representation of a single field.
//!
//! Comparisons follow the rules of the document store rather than SQL: numbers
//! compare across [`Value::Integer`] and [`Value::Float`], dates compare against
//! text that parses as a date, and values of unrelated kinds never compare.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

use crate::parse_date;

/// A single field value.
///
/// # Examples
///
/// ```rust
/// use std::cmp::Ordering;
/// use ty::Value;
///
/// let thirty = Value::Integer(30);
/// let twenty_five = Value::Float(25.0);
///
/// assert_eq!(thirty.compare(&twenty_five), Some(Ordering::Greater));
/// assert_eq!(thirty.compare(&Value::Text("30".to_string())), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
    Date(NaiveDate),
}

impl Value {
    /// Determines if the [`Value`] is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the value's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Integer(_) => "INTEGER",
            Value::Float(_) => "FLOAT",
            Value::Boolean(_) => "BOOLEAN",
            Value::Text(_) => "TEXT",
            Value::Date(_) => "DATE",
        }
    }

    /// Orders two values of compatible kinds. Returns `None` when the kinds are
    /// unrelated or either side is `Null`.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Text(b)) => parse_date(b).map(|b| a.cmp(&b)),
            (Value::Text(a), Value::Date(b)) => parse_date(a).map(|a| a.cmp(b)),
            _ => None,
        }
    }

    /// Equality as the store sees it: `Null` equals `Null`, everything else
    /// goes through [`Value::compare`].
    pub fn loosely_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            _ => self.compare(other) == Some(Ordering::Equal),
        }
    }

    /// Renders the value as a SQL literal that the statement parser reads back
    /// to the same value.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Integer(val) => val.to_string(),
            Value::Float(val) => format!("{:?}", val),
            Value::Boolean(val) => val.to_string(),
            Value::Text(val) if val.contains('\'') => format!("\"{}\"", val),
            Value::Text(val) => format!("'{}'", val),
            Value::Date(val) => format!("'{}'", val.format("%Y-%m-%d")),
        }
    }

    /// Converts the value into plain JSON (dates become `YYYY-MM-DD` strings).
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Integer(val) => serde_json::Value::from(*val),
            Value::Float(val) => serde_json::Number::from_f64(*val)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Boolean(val) => serde_json::Value::Bool(*val),
            Value::Text(val) => serde_json::Value::String(val.clone()),
            Value::Date(val) => serde_json::Value::String(val.format("%Y-%m-%d").to_string()),
        }
    }
}

impl From<i64> for Value {
    fn from(val: i64) -> Self {
        Value::Integer(val)
    }
}

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Value::Boolean(val)
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::Text(val.to_string())
    }
}

impl From<String> for Value {
    fn from(val: String) -> Self {
        Value::Text(val)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(val) => write!(f, "{}", val),
            Value::Float(val) => write!(f, "{}", val),
            Value::Boolean(val) => write!(f, "{}", val),
            Value::Text(val) => write!(f, "{}", val),
            Value::Date(val) => write!(f, "{}", val.format("%Y-%m-%d")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_comparison_crosses_kinds() {
        assert_eq!(
            Value::Integer(30).compare(&Value::Integer(25)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Value::Integer(2).compare(&Value::Float(2.5)),
            Some(Ordering::Less)
        );
        assert!(Value::Float(3.0).loosely_eq(&Value::Integer(3)));
    }

    #[test]
    fn test_unrelated_kinds_do_not_compare() {
        assert_eq!(Value::Integer(1).compare(&Value::Text("1".into())), None);
        assert_eq!(Value::Boolean(true).compare(&Value::Integer(1)), None);
        assert_eq!(Value::Null.compare(&Value::Null), None);
        assert!(Value::Null.loosely_eq(&Value::Null));
        assert!(!Value::Null.loosely_eq(&Value::Integer(0)));
    }

    #[test]
    fn test_date_compares_with_text() {
        let date = Value::Date(NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
        assert_eq!(
            date.compare(&Value::Text("2023-01-01".into())),
            Some(Ordering::Greater)
        );
        assert_eq!(date.compare(&Value::Text("someday".into())), None);
        assert!(Value::Text("2023-06-01".into()).loosely_eq(&date));
    }

    #[test]
    fn test_literal_rendering() {
        assert_eq!(Value::Text("John".into()).to_literal(), "'John'");
        assert_eq!(Value::Text("O'Brien".into()).to_literal(), "\"O'Brien\"");
        assert_eq!(Value::Integer(-7).to_literal(), "-7");
        assert_eq!(Value::Float(2.5).to_literal(), "2.5");
        assert_eq!(Value::Boolean(false).to_literal(), "false");
    }

    #[test]
    fn test_json_conversion() {
        assert_eq!(Value::Integer(1).to_json(), serde_json::json!(1));
        assert_eq!(Value::Text("a".into()).to_json(), serde_json::json!("a"));
        assert_eq!(
            Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()).to_json(),
            serde_json::json!("2024-02-29")
        );
        assert_eq!(Value::Float(f64::NAN).to_json(), serde_json::Value::Null);
    }
}
