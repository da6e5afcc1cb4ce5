//! # Column Representation
//!
//! This module provides a representation of a column in a table schema.
//! A [`Column`] carries the declared type together with the constraints the
//! executor enforces on top of the document store: length limits, primary
//! key, uniqueness, auto-increment and nullability.
//!
//! ## Usage
//!
//! To create a new column with the builder:
//!
//! ```
//! use catalog::Column;
//! use ty::DataTypeKind;
//!
//! let id = Column::builder()
//!     .column_name("id")
//!     .column_type(DataTypeKind::Integer)
//!     .primary_key(true)
//!     .auto_increment(true)
//!     .nullable(false)
//!     .build();
//!
//! assert!(id.is_auto_increment_key());
//! ```
//!
//! Shorthands exist for the common cases:
//!
//! ```
//! use catalog::Column;
//!
//! let name = Column::varchar("name", 255);
//! assert_eq!(name.max_length(), Some(255));
//! ```

use getset::{CopyGetters, Getters, Setters};
use serde::{Deserialize, Serialize};
use std::fmt;
use ty::DataTypeKind;
use typed_builder::TypedBuilder;

/// Represents a column in a database table.
///
/// ```ignore
/// +--------------+--------------+------------+-------------+--------+-------+----------+
/// | column_name  | column_type  | max_length | primary_key | unique | auto  | nullable |
/// +--------------+--------------+------------+-------------+--------+-------+----------+
/// | id           | INTEGER      |            | true        | false  | true  | false    |
/// | email        | VARCHAR      | 255        | false       | true   | false | true     |
/// +--------------+--------------+------------+-------------+--------+-------+----------+
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    TypedBuilder,
    Getters,
    CopyGetters,
    Setters,
)]
pub struct Column {
    #[builder(setter(into))]
    #[getset(get = "pub")]
    column_name: String,
    #[getset(get_copy = "pub")]
    column_type: DataTypeKind,
    #[builder(default, setter(strip_option))]
    #[getset(get_copy = "pub", set = "pub")]
    max_length: Option<u32>,
    #[builder(default)]
    #[getset(get_copy = "pub")]
    primary_key: bool,
    #[builder(default)]
    #[getset(get_copy = "pub")]
    unique: bool,
    #[builder(default)]
    #[getset(get_copy = "pub")]
    auto_increment: bool,
    #[builder(default = true)]
    #[getset(get_copy = "pub")]
    nullable: bool,
}

impl Column {
    /// Creates a plain nullable column without constraints.
    pub fn new(column_name: &str, column_type: DataTypeKind) -> Self {
        Column::builder()
            .column_name(column_name)
            .column_type(column_type)
            .build()
    }

    /// Creates a nullable `VARCHAR(max_length)` column.
    pub fn varchar(column_name: &str, max_length: u32) -> Self {
        Column::builder()
            .column_name(column_name)
            .column_type(DataTypeKind::VarChar)
            .max_length(max_length)
            .build()
    }

    /// Creates an auto-incrementing integer primary key.
    pub fn primary(column_name: &str) -> Self {
        Column::builder()
            .column_name(column_name)
            .column_type(DataTypeKind::Integer)
            .primary_key(true)
            .auto_increment(true)
            .nullable(false)
            .build()
    }

    /// Returns `true` iff the executor, not the caller, supplies this column's value.
    pub fn is_auto_increment_key(&self) -> bool {
        self.primary_key && self.auto_increment
    }

    /// Returns `true` iff a row must carry a non-null value for this column.
    pub fn requires_value(&self) -> bool {
        !self.nullable && !self.auto_increment
    }

    /// Returns `true` iff values in this column must be unique across the table.
    pub fn enforces_uniqueness(&self) -> bool {
        self.unique || self.primary_key
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.column_name, self.column_type)?;
        if let Some(length) = self.max_length {
            write!(f, "({})", length)?;
        }
        if self.primary_key {
            write!(f, " PRIMARY KEY")?;
        }
        if self.unique {
            write!(f, " UNIQUE")?;
        }
        if !self.nullable && !self.primary_key {
            write!(f, " NOT NULL")?;
        }
        Ok(())
    }
}
