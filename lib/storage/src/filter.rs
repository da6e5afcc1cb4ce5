//! Document filters.
//!
//! Matching follows document-store rules rather than SQL three-valued logic:
//! a missing field reads as `Null`, so `Ne` matches documents that lack the
//! field while the ordering operators never do.

use std::{cmp::Ordering, fmt};
use ty::{Row, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            FilterOp::Eq => "$eq",
            FilterOp::Ne => "$ne",
            FilterOp::Gt => "$gt",
            FilterOp::Lt => "$lt",
            FilterOp::Gte => "$gte",
            FilterOp::Lte => "$lte",
        };
        write!(f, "{}", op)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Filter {
    /// Matches every document.
    #[default]
    All,
    Compare {
        column: String,
        op: FilterOp,
        value: Value,
    },
}

impl Filter {
    pub fn compare(column: impl Into<String>, op: FilterOp, value: Value) -> Self {
        Filter::Compare {
            column: column.into(),
            op,
            value,
        }
    }

    pub fn matches(&self, row: &Row) -> bool {
        let (column, op, expected) = match self {
            Filter::All => return true,
            Filter::Compare { column, op, value } => (column, op, value),
        };

        let actual = row.get(column).unwrap_or(&Value::Null);
        match op {
            FilterOp::Eq => actual.loosely_eq(expected),
            FilterOp::Ne => !actual.loosely_eq(expected),
            FilterOp::Gt => actual.compare(expected) == Some(Ordering::Greater),
            FilterOp::Lt => actual.compare(expected) == Some(Ordering::Less),
            FilterOp::Gte => matches!(
                actual.compare(expected),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Lte => matches!(
                actual.compare(expected),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => write!(f, "{{}}"),
            Filter::Compare { column, op, value } => {
                write!(f, "{{{}: {{{}: {}}}}}", column, op, value.to_literal())
            }
        }
    }
}
