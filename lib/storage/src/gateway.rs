use crate::{Document, DocumentId, Filter, StorageError};
use async_trait::async_trait;
use catalog::TableSchema;
use ty::Row;

/// Access to a database in the document store.
///
/// Every operation fails with [`StorageError::NotConnected`] until
/// [`StorageGateway::connect`] succeeds, and again after
/// [`StorageGateway::disconnect`].
#[async_trait]
pub trait StorageGateway: Send + Sync {
    async fn connect(&self, database: &str) -> Result<(), StorageError>;

    async fn disconnect(&self) -> Result<(), StorageError>;

    async fn table_exists(&self, table: &str) -> Result<bool, StorageError>;

    async fn get_table_schema(&self, table: &str) -> Result<Option<TableSchema>, StorageError>;

    /// Inserts or replaces the schema stored under the schema's name.
    async fn save_table_schema(&self, schema: &TableSchema) -> Result<(), StorageError>;

    /// Returns the table's `next_id` and advances the stored counter, as one
    /// atomic step.
    async fn allocate_id(&self, table: &str) -> Result<i64, StorageError>;

    /// Removes the schema and the collection. Returns `false` if there was no
    /// schema.
    async fn drop_table(&self, table: &str) -> Result<bool, StorageError>;

    /// Names of all tables with a stored schema, sorted.
    async fn list_tables(&self) -> Result<Vec<String>, StorageError>;

    /// Handle to the collection holding a table's documents. Collections need
    /// not exist beforehand.
    fn collection(&self, table: &str) -> Box<dyn Collection>;
}

/// A schemaless set of documents.
#[async_trait]
pub trait Collection: Send + Sync {
    fn name(&self) -> &str;

    async fn insert_one(&self, row: Row) -> Result<DocumentId, StorageError>;

    /// Matching documents in insertion order.
    async fn find(&self, filter: &Filter) -> Result<Vec<Document>, StorageError>;

    /// Merges `set` into every matching document. Returns how many documents
    /// actually changed.
    async fn update_many(&self, filter: &Filter, set: &Row) -> Result<u64, StorageError>;

    /// Returns how many documents were removed.
    async fn delete_many(&self, filter: &Filter) -> Result<u64, StorageError>;
}
