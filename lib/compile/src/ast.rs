//! The structured form of a parsed statement.

use catalog::TableSchema;
use std::fmt;
use ty::{Row, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedQuery {
    CreateTable(CreateTable),
    Insert(Insert),
    Select(Select),
    Update(Update),
    Delete(Delete),
    DropTable(DropTable),
}

impl ParsedQuery {
    /// The table the statement targets.
    pub fn table(&self) -> &str {
        match self {
            ParsedQuery::CreateTable(create) => create.schema.name(),
            ParsedQuery::Insert(insert) => &insert.table,
            ParsedQuery::Select(select) => &select.table,
            ParsedQuery::Update(update) => &update.table,
            ParsedQuery::Delete(delete) => &delete.table,
            ParsedQuery::DropTable(drop) => &drop.table,
        }
    }

    /// Statement keyword, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ParsedQuery::CreateTable(_) => "CREATE TABLE",
            ParsedQuery::Insert(_) => "INSERT",
            ParsedQuery::Select(_) => "SELECT",
            ParsedQuery::Update(_) => "UPDATE",
            ParsedQuery::Delete(_) => "DELETE",
            ParsedQuery::DropTable(_) => "DROP TABLE",
        }
    }
}

/// `CREATE TABLE`. The schema is complete except for validation, which the
/// executor runs before persisting it.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub schema: TableSchema,
}

/// `INSERT INTO`. `columns` is `None` when the statement relies on the
/// table's column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: String,
    pub columns: Option<Vec<String>>,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: String,
    pub projection: Projection,
    pub predicate: Option<Predicate>,
    pub join: Option<JoinSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: String,
    pub assignments: Row,
    pub predicate: Option<Predicate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: String,
    pub predicate: Option<Predicate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropTable {
    pub table: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// `*`: every stored field.
    All,
    /// An explicit list; names may be qualified (`users.name`).
    Columns(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    NotEq,
    Gt,
    Lt,
    GtEq,
    LtEq,
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::NotEq => "!=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Lt => "<",
            ComparisonOp::GtEq => ">=",
            ComparisonOp::LtEq => "<=",
        };
        write!(f, "{}", op)
    }
}

/// A single `column <op> value` comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub op: ComparisonOp,
    pub value: Value,
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column, self.op, self.value.to_literal())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// `JOIN <table> ON <left> = <right>`, with the sides as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSpec {
    pub table: String,
    pub left: ColumnRef,
    pub right: ColumnRef,
}

impl fmt::Display for JoinSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ON {} = {}", self.table, self.left, self.right)
    }
}
