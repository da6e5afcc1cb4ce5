//! Table definitions and the checks that enforce them.

pub mod column;
pub mod schema;
pub mod validate;

pub use column::*;
pub use schema::*;
pub use validate::{
    coerce_dates, validate_assignments, validate_row, validate_table_schema, ValidationError,
};
