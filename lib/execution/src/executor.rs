//! Executes structured queries against a [`StorageGateway`].
//!
//! Each statement is an independent unit of work: the table's schema is
//! loaded from the gateway, the statement is checked against it, and the
//! resulting document operations are issued. Nothing is cached between
//! statements.

use crate::{join::equi_join, ExecutionError, QueryOutput};
use catalog::{
    coerce_dates, validate_assignments, validate_row, validate_table_schema, SchemaError,
    TableSchema, ValidationError,
};
use compile::ast::*;
use std::{collections::HashSet, sync::Arc};
use storage::{Collection, DocumentId, Filter, FilterOp, StorageGateway};
use tracing::{debug, info, instrument, warn};
use ty::{Row, Value};

#[derive(Clone)]
pub struct QueryExecutor {
    gateway: Arc<dyn StorageGateway>,
}

impl std::fmt::Debug for QueryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExecutor").finish()
    }
}

impl QueryExecutor {
    pub fn new(gateway: Arc<dyn StorageGateway>) -> Self {
        Self { gateway }
    }

    pub async fn execute(&self, query: ParsedQuery) -> Result<QueryOutput, ExecutionError> {
        match query {
            ParsedQuery::CreateTable(create) => self.create_table(create).await,
            ParsedQuery::Insert(insert) => self.insert(insert).await,
            ParsedQuery::Select(select) => self.select(select).await,
            ParsedQuery::Update(update) => self.update(update).await,
            ParsedQuery::Delete(delete) => self.delete(delete).await,
            ParsedQuery::DropTable(drop) => self.drop_table(drop).await,
        }
    }

    #[instrument(skip_all, fields(table = %create.schema.name()))]
    pub async fn create_table(&self, create: CreateTable) -> Result<QueryOutput, ExecutionError> {
        let schema = create.schema;
        if self.gateway.table_exists(schema.name()).await? {
            warn!("Table already exists");
            return Err(SchemaError::TableAlreadyExists {
                table: schema.name().clone(),
            }
            .into());
        }

        validate_table_schema(&schema)?;
        self.gateway.save_table_schema(&schema).await?;

        info!(columns = schema.columns().len(), "Table created");
        Ok(QueryOutput::status(
            format!("Table '{}' created successfully", schema.name()),
            0,
        ))
    }

    #[instrument(skip_all, fields(table = %insert.table))]
    pub async fn insert(&self, insert: Insert) -> Result<QueryOutput, ExecutionError> {
        let schema = self.schema(&insert.table).await?;
        let mut row = build_row(&schema, insert.columns, insert.values)?;

        // A caller-supplied key is replaced by the allocated one; `Null` keeps
        // its position in the row and passes validation.
        let auto_key = schema
            .auto_increment_key()
            .map(|column| column.column_name().clone());
        if let Some(key) = &auto_key {
            if row.contains_key(key) {
                row.insert(key.as_str(), Value::Null);
            }
        }

        validate_row(&row, &schema)?;

        let collection = self.gateway.collection(&insert.table);
        for column in schema
            .unique_columns()
            .filter(|column| !column.is_auto_increment_key())
        {
            check_unique(collection.as_ref(), column.column_name(), row.get(column.column_name()))
                .await?;
        }

        if let Some(key) = &auto_key {
            let id = self.gateway.allocate_id(&insert.table).await?;
            debug!(key = %key, id, "Allocated auto-increment key");
            row.insert(key.as_str(), Value::Integer(id));
            check_unique(collection.as_ref(), key, row.get(key)).await?;
        }

        coerce_dates(&mut row, &schema);
        collection.insert_one(row).await?;

        info!("Row inserted");
        Ok(QueryOutput::status(
            format!("1 row inserted into '{}'", insert.table),
            1,
        ))
    }

    #[instrument(skip_all, fields(table = %select.table))]
    pub async fn select(&self, select: Select) -> Result<QueryOutput, ExecutionError> {
        self.schema(&select.table).await?;

        let filter = to_filter(select.predicate.as_ref());
        let mut rows = self
            .gateway
            .collection(&select.table)
            .find(&filter)
            .await?
            .into_iter()
            .map(|document| document.into_row())
            .collect::<Vec<_>>();

        if let Some(join) = &select.join {
            self.schema(&join.table).await?;
            let right = self
                .gateway
                .collection(&join.table)
                .find(&Filter::All)
                .await?
                .into_iter()
                .map(|document| document.into_row())
                .collect::<Vec<_>>();
            debug!(%join, left = rows.len(), right = right.len(), "Joining");
            rows = equi_join(&select.table, &rows, join, &right);
        }

        if let Projection::Columns(columns) = &select.projection {
            rows = rows.iter().map(|row| row.project(columns)).collect();
        }

        info!(rows = rows.len(), "Rows selected");
        Ok(QueryOutput::Rows(rows))
    }

    #[instrument(skip_all, fields(table = %update.table))]
    pub async fn update(&self, update: Update) -> Result<QueryOutput, ExecutionError> {
        let schema = self.schema(&update.table).await?;
        validate_assignments(&update.assignments, &schema)?;

        let filter = to_filter(update.predicate.as_ref());
        let collection = self.gateway.collection(&update.table);
        self.check_unique_assignments(collection.as_ref(), &schema, &update.assignments, &filter)
            .await?;

        let mut assignments = update.assignments;
        coerce_dates(&mut assignments, &schema);
        let modified = collection.update_many(&filter, &assignments).await?;

        info!(modified, "Rows updated");
        Ok(QueryOutput::status(
            format!("{} row(s) updated in '{}'", modified, update.table),
            modified,
        ))
    }

    #[instrument(skip_all, fields(table = %delete.table))]
    pub async fn delete(&self, delete: Delete) -> Result<QueryOutput, ExecutionError> {
        self.schema(&delete.table).await?;

        let filter = to_filter(delete.predicate.as_ref());
        let deleted = self
            .gateway
            .collection(&delete.table)
            .delete_many(&filter)
            .await?;

        info!(deleted, "Rows deleted");
        Ok(QueryOutput::status(
            format!("{} row(s) deleted from '{}'", deleted, delete.table),
            deleted,
        ))
    }

    #[instrument(skip_all, fields(table = %drop.table))]
    pub async fn drop_table(&self, drop: DropTable) -> Result<QueryOutput, ExecutionError> {
        if !self.gateway.drop_table(&drop.table).await? {
            return Err(ExecutionError::NotFound { table: drop.table });
        }

        info!("Table dropped");
        Ok(QueryOutput::status(
            format!("Table '{}' dropped", drop.table),
            0,
        ))
    }

    async fn schema(&self, table: &str) -> Result<TableSchema, ExecutionError> {
        self.gateway
            .get_table_schema(table)
            .await?
            .ok_or_else(|| ExecutionError::NotFound {
                table: table.to_string(),
            })
    }

    /// A unique value may be written to at most one row, and only if no row
    /// outside the matched set already holds it.
    async fn check_unique_assignments(
        &self,
        collection: &dyn Collection,
        schema: &TableSchema,
        assignments: &Row,
        filter: &Filter,
    ) -> Result<(), ExecutionError> {
        let unique = assignments
            .iter()
            .filter(|(key, value)| {
                !value.is_null()
                    && schema
                        .column(key)
                        .map_or(false, |column| column.enforces_uniqueness())
            })
            .collect::<Vec<_>>();
        if unique.is_empty() {
            return Ok(());
        }

        let matched = collection
            .find(filter)
            .await?
            .into_iter()
            .map(|document| *document.id())
            .collect::<HashSet<DocumentId>>();

        for (column, value) in unique {
            let duplicate = || ExecutionError::Constraint {
                column: column.to_string(),
                value: value.to_string(),
            };
            if matched.len() > 1 {
                return Err(duplicate());
            }
            let holders = collection
                .find(&Filter::compare(column, FilterOp::Eq, value.clone()))
                .await?;
            if holders.iter().any(|document| !matched.contains(document.id())) {
                return Err(duplicate());
            }
        }
        Ok(())
    }
}

/// Pairs the statement's values with column names: the explicit list if one
/// was given, the schema's column order otherwise.
fn build_row(
    schema: &TableSchema,
    columns: Option<Vec<String>>,
    values: Vec<Value>,
) -> Result<Row, ValidationError> {
    let mismatch = |columns: usize| ValidationError::ColumnCountMismatch {
        columns,
        values: values.len(),
    };

    let names = match columns {
        Some(columns) if columns.len() != values.len() => return Err(mismatch(columns.len())),
        Some(columns) => columns,
        None if values.len() > schema.columns().len() => {
            return Err(mismatch(schema.columns().len()))
        }
        None => schema.column_names().map(str::to_string).collect(),
    };

    Ok(names.into_iter().zip(values).collect())
}

fn to_filter(predicate: Option<&Predicate>) -> Filter {
    let Some(predicate) = predicate else {
        return Filter::All;
    };
    let op = match predicate.op {
        ComparisonOp::Eq => FilterOp::Eq,
        ComparisonOp::NotEq => FilterOp::Ne,
        ComparisonOp::Gt => FilterOp::Gt,
        ComparisonOp::Lt => FilterOp::Lt,
        ComparisonOp::GtEq => FilterOp::Gte,
        ComparisonOp::LtEq => FilterOp::Lte,
    };
    Filter::compare(predicate.column.as_str(), op, predicate.value.clone())
}

/// Fails if any stored document already holds `value` in `column`. Absent
/// and `Null` values are not checked.
async fn check_unique(
    collection: &dyn Collection,
    column: &str,
    value: Option<&Value>,
) -> Result<(), ExecutionError> {
    let Some(value) = value.filter(|value| !value.is_null()) else {
        return Ok(());
    };

    let existing = collection
        .find(&Filter::compare(column, FilterOp::Eq, value.clone()))
        .await?;
    if !existing.is_empty() {
        warn!(column, %value, "Unique constraint violated");
        return Err(ExecutionError::Constraint {
            column: column.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}
