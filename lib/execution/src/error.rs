use catalog::{SchemaError, ValidationError};
use compile::ParseError;
use storage::StorageError;
use thiserror::Error;

/// Everything that can abort a statement.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Table '{table}' does not exist")]
    NotFound { table: String },
    #[error("Duplicate value for unique column '{column}': {value}")]
    Constraint { column: String, value: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
}
