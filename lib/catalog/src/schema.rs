use crate::Column;
use getset::{CopyGetters, Getters, Setters};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;
use typed_builder::TypedBuilder;

/// [`TableSchema`] is the relational definition of one table: its columns in
/// declaration order, the columns carrying a uniqueness constraint, and the
/// counter used to hand out auto-increment keys.
///
/// The document store owns the durable copy. The executor only ever works on
/// a transient copy loaded for the duration of a single statement.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Getters,
    CopyGetters,
    Setters,
    TypedBuilder,
    Serialize,
    Deserialize,
)]
pub struct TableSchema {
    #[builder(setter(into))]
    #[getset(get = "pub")]
    name: String,
    #[getset(get = "pub")]
    columns: Vec<Column>,
    #[builder(default)]
    #[getset(get = "pub")]
    indexes: Vec<String>,
    #[builder(default = 1)]
    #[getset(get_copy = "pub", set = "pub")]
    next_id: i64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Table name cannot be empty")]
    EmptyTableName,
    #[error("Table '{table}' must have at least one column")]
    NoColumns { table: String },
    #[error("Table '{table}' can only have one primary key")]
    MultiplePrimaryKeys { table: String },
    #[error("Column '{column}' is defined more than once")]
    DuplicateColumn { column: String },
    #[error("VARCHAR column '{column}' must specify maxLength")]
    MissingVarCharLength { column: String },
    #[error("VARCHAR column '{column}' must have a positive maxLength")]
    InvalidVarCharLength { column: String },
    #[error("Table '{table}' already exists")]
    TableAlreadyExists { table: String },
}

impl TableSchema {
    /// Constructs a new [`TableSchema`] with the auto-increment counter at 1.
    /// Every column declared `UNIQUE` is registered in `indexes`.
    pub fn new(name: &str, columns: Vec<Column>) -> Self {
        let indexes = columns
            .iter()
            .filter(|column| column.unique())
            .map(|column| column.column_name().clone())
            .collect::<Vec<_>>();

        trace!(table = name, columns = columns.len(), "Schema created");
        TableSchema::builder()
            .name(name)
            .columns(columns)
            .indexes(indexes)
            .build()
    }

    pub fn column(&self, column_name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|column| column.column_name() == column_name)
    }

    pub fn has_column(&self, column_name: &str) -> bool {
        self.column(column_name).is_some()
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.column_name().as_str())
    }

    pub fn primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|column| column.primary_key())
    }

    /// The primary key, if it is auto-incrementing.
    pub fn auto_increment_key(&self) -> Option<&Column> {
        self.primary_key()
            .filter(|column| column.is_auto_increment_key())
    }

    /// Columns whose values must be unique, in declaration order.
    pub fn unique_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(|column| column.enforces_uniqueness())
    }
}

impl std::fmt::Display for TableSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let columns = self
            .columns
            .iter()
            .map(|column| column.to_string())
            .collect::<Vec<_>>();
        write!(f, "{} ({})", self.name, columns.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions_sorted::assert_eq;
    use ty::DataTypeKind;

    fn users() -> TableSchema {
        TableSchema::new(
            "users",
            vec![
                Column::primary("id"),
                Column::varchar("name", 255),
                Column::builder()
                    .column_name("email")
                    .column_type(DataTypeKind::VarChar)
                    .max_length(255)
                    .unique(true)
                    .build(),
                Column::new("age", DataTypeKind::Integer),
            ],
        )
    }

    #[test]
    fn test_schema_new() {
        let schema = users();

        assert_eq!(schema.name(), "users");
        assert_eq!(schema.columns().len(), 4);
        assert_eq!(schema.indexes(), &vec!["email".to_string()]);
        assert_eq!(schema.next_id(), 1);
    }

    #[test]
    fn test_column_order_is_preserved() {
        let schema = users();
        assert_eq!(
            schema.column_names().collect::<Vec<_>>(),
            vec!["id", "name", "email", "age"]
        );
    }

    #[test]
    fn test_key_lookups() {
        let schema = users();

        assert_eq!(schema.primary_key().unwrap().column_name(), "id");
        assert_eq!(schema.auto_increment_key().unwrap().column_name(), "id");
        assert_eq!(
            schema
                .unique_columns()
                .map(|column| column.column_name().as_str())
                .collect::<Vec<_>>(),
            vec!["id", "email"]
        );
        assert!(schema.has_column("age"));
        assert!(schema.column("salary").is_none());
    }

    #[test]
    fn test_serde_round_trip() {
        let mut schema = users();
        schema.set_next_id(7);

        let json = serde_json::to_string(&schema).unwrap();
        let back: TableSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn test_display() {
        let schema = TableSchema::new("t", vec![Column::primary("id"), Column::varchar("s", 8)]);
        assert_eq!(schema.to_string(), "t (id INTEGER PRIMARY KEY, s VARCHAR(8))");
    }
}
