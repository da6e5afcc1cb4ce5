//! # Type System
//!
//! The closed set of column types a table may declare ([`DataTypeKind`]), the
//! tagged [`Value`] stored in every field, and the ordered [`Row`] that carries
//! a document's fields between the parser, the executor and the store.
//!
//! Example Usage:
//!
//! ```
//! use ty::{DataTypeKind, Row, Value};
//!
//! let mut row = Row::new();
//! row.insert("name", Value::Text("John".to_string()));
//! row.insert("age", Value::Integer(30));
//!
//! assert_eq!(row.get("age"), Some(&Value::Integer(30)));
//! assert_eq!(DataTypeKind::from_sql("INT"), Some(DataTypeKind::Integer));
//! ```
//!
//! ## Dates
//!
//! `DATE` columns hold calendar dates. Text is accepted wherever a date is
//! expected as long as [`parse_date`] understands it.

pub mod row;
pub mod value;

pub use row::*;
pub use value::*;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use core::fmt;
use serde::{Deserialize, Serialize};

/// Formats accepted for calendar dates, tried in order after RFC 3339.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d %B %Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// The column types a table definition may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DataTypeKind {
    Integer,
    VarChar,
    Boolean,
    Date,
}

impl DataTypeKind {
    /// Resolves a SQL type name (without any length suffix) to a [`DataTypeKind`].
    pub fn from_sql(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "INT" | "INTEGER" => Some(DataTypeKind::Integer),
            "VARCHAR" => Some(DataTypeKind::VarChar),
            "BOOLEAN" | "BOOL" => Some(DataTypeKind::Boolean),
            "DATE" => Some(DataTypeKind::Date),
            _ => None,
        }
    }
}

impl fmt::Display for DataTypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataTypeKind::Integer => write!(f, "INTEGER"),
            DataTypeKind::VarChar => write!(f, "VARCHAR"),
            DataTypeKind::Boolean => write!(f, "BOOLEAN"),
            DataTypeKind::Date => write!(f, "DATE"),
        }
    }
}

/// Parses `text` as a calendar date.
///
/// Date-times are accepted and truncated to their date component.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.date_naive());
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .map(|datetime| datetime.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(DataTypeKind::from_sql("int"), Some(DataTypeKind::Integer));
        assert_eq!(DataTypeKind::from_sql("INTEGER"), Some(DataTypeKind::Integer));
        assert_eq!(DataTypeKind::from_sql("Bool"), Some(DataTypeKind::Boolean));
        assert_eq!(DataTypeKind::from_sql("varchar"), Some(DataTypeKind::VarChar));
        assert_eq!(DataTypeKind::from_sql("DATE"), Some(DataTypeKind::Date));
        assert_eq!(DataTypeKind::from_sql("FLOAT"), None);
    }

    #[test]
    fn test_parse_date() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 15);
        assert_eq!(parse_date("2023-01-15"), expected);
        assert_eq!(parse_date("2023/01/15"), expected);
        assert_eq!(parse_date("2023-01-15T10:30:00Z"), expected);
        assert_eq!(parse_date("2023-01-15 10:30:00"), expected);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2023-02-30"), None);
    }
}
