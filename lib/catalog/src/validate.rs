//! Schema and row validation.
//!
//! The document store accepts any document, so these checks are the only
//! place where a table definition's constraints are enforced. All functions
//! are pure.

use crate::{Column, SchemaError, TableSchema};
use std::collections::HashSet;
use thiserror::Error;
use tracing::warn;
use ty::{parse_date, DataTypeKind, Row, Value};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Column '{column}' cannot be null")]
    NullValue { column: String },
    #[error("Unknown column '{column}'")]
    UnknownColumn { column: String },
    #[error("Column '{column}' must be {}, found {found}", describe(.expected))]
    TypeMismatch {
        column: String,
        expected: DataTypeKind,
        found: &'static str,
    },
    #[error("Column '{column}' must be a valid date, found '{value}'")]
    InvalidDate { column: String, value: String },
    #[error("Column '{column}' exceeds max length of {max_length}")]
    TooLong { column: String, max_length: u32 },
    #[error("Expected {columns} value(s) but found {values}")]
    ColumnCountMismatch { columns: usize, values: usize },
}

fn describe(kind: &DataTypeKind) -> &'static str {
    match kind {
        DataTypeKind::Integer => "an integer",
        DataTypeKind::VarChar => "a string",
        DataTypeKind::Boolean => "a boolean",
        DataTypeKind::Date => "a date",
    }
}

/// Checks the structural invariants of a table definition.
pub fn validate_table_schema(schema: &TableSchema) -> Result<(), SchemaError> {
    if schema.name().trim().is_empty() {
        return Err(SchemaError::EmptyTableName);
    }

    if schema.columns().is_empty() {
        return Err(SchemaError::NoColumns {
            table: schema.name().clone(),
        });
    }

    let primary_keys = schema
        .columns()
        .iter()
        .filter(|column| column.primary_key())
        .count();
    if primary_keys > 1 {
        return Err(SchemaError::MultiplePrimaryKeys {
            table: schema.name().clone(),
        });
    }

    let mut seen = HashSet::new();
    for column in schema.columns() {
        if !seen.insert(column.column_name().as_str()) {
            return Err(SchemaError::DuplicateColumn {
                column: column.column_name().clone(),
            });
        }
        validate_column(column)?;
    }

    Ok(())
}

fn validate_column(column: &Column) -> Result<(), SchemaError> {
    if column.column_type() != DataTypeKind::VarChar {
        return Ok(());
    }

    match column.max_length() {
        None => Err(SchemaError::MissingVarCharLength {
            column: column.column_name().clone(),
        }),
        Some(0) => Err(SchemaError::InvalidVarCharLength {
            column: column.column_name().clone(),
        }),
        Some(_) => Ok(()),
    }
}

/// Checks a complete row about to be inserted.
///
/// Every non-nullable column that the caller has to supply must be present and
/// non-null; auto-increment keys are exempt because the executor fills them in.
/// Every present key must be a known column holding a value of its type.
pub fn validate_row(row: &Row, schema: &TableSchema) -> Result<(), ValidationError> {
    for column in schema.columns().iter().filter(|column| column.requires_value()) {
        let missing = row
            .get(column.column_name())
            .map_or(true, |value| value.is_null());
        if missing {
            warn!(column = %column.column_name(), "Missing value for non-nullable column");
            return Err(ValidationError::NullValue {
                column: column.column_name().clone(),
            });
        }
    }

    check_values(row, schema)
}

/// Checks the assignment list of an `UPDATE`. Columns absent from the list are
/// left untouched, so only the present keys are checked; assigning `NULL` to a
/// non-nullable column is rejected.
pub fn validate_assignments(assignments: &Row, schema: &TableSchema) -> Result<(), ValidationError> {
    for (key, value) in assignments.iter() {
        if let Some(column) = schema.column(key) {
            if value.is_null() && !column.nullable() {
                return Err(ValidationError::NullValue {
                    column: key.to_string(),
                });
            }
        }
    }

    check_values(assignments, schema)
}

fn check_values(row: &Row, schema: &TableSchema) -> Result<(), ValidationError> {
    for (key, value) in row.iter() {
        let column = schema
            .column(key)
            .ok_or_else(|| ValidationError::UnknownColumn {
                column: key.to_string(),
            })?;

        if value.is_null() {
            continue;
        }

        validate_value(value, column)?;
    }

    Ok(())
}

fn validate_value(value: &Value, column: &Column) -> Result<(), ValidationError> {
    let mismatch = || ValidationError::TypeMismatch {
        column: column.column_name().clone(),
        expected: column.column_type(),
        found: value.kind_name(),
    };

    match (column.column_type(), value) {
        (DataTypeKind::Integer, Value::Integer(_)) => Ok(()),
        (DataTypeKind::VarChar, Value::Text(text)) => match column.max_length() {
            Some(max_length) if text.chars().count() > max_length as usize => {
                Err(ValidationError::TooLong {
                    column: column.column_name().clone(),
                    max_length,
                })
            }
            _ => Ok(()),
        },
        (DataTypeKind::Boolean, Value::Boolean(_)) => Ok(()),
        (DataTypeKind::Date, Value::Date(_)) => Ok(()),
        (DataTypeKind::Date, Value::Text(text)) => match parse_date(text) {
            Some(_) => Ok(()),
            None => Err(ValidationError::InvalidDate {
                column: column.column_name().clone(),
                value: text.clone(),
            }),
        },
        _ => Err(mismatch()),
    }
}

/// Rewrites text stored in `DATE` columns as [`Value::Date`]. Call after
/// validation; text that does not parse is left alone.
pub fn coerce_dates(row: &mut Row, schema: &TableSchema) {
    let date_columns = schema
        .columns()
        .iter()
        .filter(|column| column.column_type() == DataTypeKind::Date)
        .map(|column| column.column_name().as_str());

    for name in date_columns {
        let parsed = match row.get(name) {
            Some(Value::Text(text)) => parse_date(text),
            _ => None,
        };
        if let Some(date) = parsed {
            row.insert(name, Value::Date(date));
        }
    }
}
