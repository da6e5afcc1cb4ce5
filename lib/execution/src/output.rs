use std::fmt;
use ty::Row;

/// The result of one statement: a row set for `SELECT`, a status line for
/// everything else.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    Rows(Vec<Row>),
    Status { message: String, affected: u64 },
}

impl QueryOutput {
    pub(crate) fn status(message: impl Into<String>, affected: u64) -> Self {
        QueryOutput::Status {
            message: message.into(),
            affected,
        }
    }

    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            QueryOutput::Rows(rows) => Some(rows),
            QueryOutput::Status { .. } => None,
        }
    }

    pub fn into_rows(self) -> Option<Vec<Row>> {
        match self {
            QueryOutput::Rows(rows) => Some(rows),
            QueryOutput::Status { .. } => None,
        }
    }

    /// Rows become an array of objects, a status becomes its message.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            QueryOutput::Rows(rows) => {
                serde_json::Value::Array(rows.iter().map(Row::to_json).collect())
            }
            QueryOutput::Status { message, .. } => serde_json::Value::String(message.clone()),
        }
    }
}

impl fmt::Display for QueryOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOutput::Rows(rows) => {
                for row in rows {
                    writeln!(f, "{}", row)?;
                }
                write!(f, "({} rows)", rows.len())
            }
            QueryOutput::Status { message, .. } => write!(f, "{}", message),
        }
    }
}
