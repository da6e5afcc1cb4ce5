//! In-process document store.
//!
//! Schemas live in their own map, separate from the user collections, so a
//! table may be called anything. With a snapshot directory, the whole
//! database is written to `<dir>/<database>.json` after every mutation
//! (write to a temporary file, then rename) and read back on connect.

use crate::{Collection, Document, DocumentId, Filter, StorageError, StorageGateway};
use async_trait::async_trait;
use catalog::TableSchema;
use common::StorageTarget;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, info, instrument, trace};
use ty::Row;

/// Cheap to clone; clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    snapshot_dir: Option<PathBuf>,
    session: RwLock<Session>,
    schemas: DashMap<String, TableSchema>,
    collections: DashMap<String, Vec<Document>>,
    persist_lock: tokio::sync::Mutex<()>,
}

#[derive(Debug, Default)]
struct Session {
    database: Option<String>,
    connected: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    schemas: Vec<TableSchema>,
    collections: BTreeMap<String, Vec<Document>>,
}

impl MemoryStore {
    /// A store that keeps nothing beyond the process.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that snapshots each database into `dir`.
    pub fn with_snapshot_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Inner {
                snapshot_dir: Some(dir.into()),
                ..Inner::default()
            }),
        }
    }

    pub fn from_target(target: &StorageTarget) -> Self {
        match target {
            StorageTarget::Memory => Self::new(),
            StorageTarget::Directory(dir) => Self::with_snapshot_dir(dir),
        }
    }

    pub fn snapshot_dir(&self) -> Option<&Path> {
        self.inner.snapshot_dir.as_deref()
    }

    fn database(&self) -> Result<String, StorageError> {
        let session = self.inner.session.read();
        match (&session.database, session.connected) {
            (Some(database), true) => Ok(database.clone()),
            _ => Err(StorageError::NotConnected),
        }
    }

    fn snapshot_path(&self, database: &str) -> Option<PathBuf> {
        self.snapshot_dir()
            .map(|dir| dir.join(format!("{}.json", database)))
    }

    fn snapshot(&self) -> Snapshot {
        let mut schemas = self
            .inner
            .schemas
            .iter()
            .map(|entry| entry.value().clone())
            .collect::<Vec<_>>();
        schemas.sort_by(|a, b| a.name().cmp(b.name()));

        let collections = self
            .inner
            .collections
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        Snapshot {
            schemas,
            collections,
        }
    }

    fn clear(&self) {
        self.inner.schemas.clear();
        self.inner.collections.clear();
    }

    async fn load(&self, database: &str) -> Result<(), StorageError> {
        self.clear();

        let Some(path) = self.snapshot_path(database) else {
            return Ok(());
        };
        if !tokio::fs::try_exists(&path).await? {
            debug!(path = %path.display(), "No snapshot yet");
            return Ok(());
        }

        let bytes = tokio::fs::read(&path).await?;
        let snapshot = serde_json::from_slice::<Snapshot>(&bytes)?;
        debug!(
            path = %path.display(),
            tables = snapshot.schemas.len(),
            "Loaded snapshot"
        );

        for schema in snapshot.schemas {
            self.inner.schemas.insert(schema.name().clone(), schema);
        }
        for (name, documents) in snapshot.collections {
            self.inner.collections.insert(name, documents);
        }
        Ok(())
    }

    async fn persist(&self) -> Result<(), StorageError> {
        let database = self.database()?;
        let (Some(dir), Some(path)) = (self.snapshot_dir(), self.snapshot_path(&database)) else {
            return Ok(());
        };

        let _guard = self.inner.persist_lock.lock().await;
        let bytes = serde_json::to_vec_pretty(&self.snapshot())?;
        let temp = path.with_extension("json.tmp");

        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&temp, &bytes).await?;
        tokio::fs::rename(&temp, &path).await?;
        trace!(path = %path.display(), bytes = bytes.len(), "Snapshot written");
        Ok(())
    }
}

#[async_trait]
impl StorageGateway for MemoryStore {
    #[instrument(skip(self))]
    async fn connect(&self, database: &str) -> Result<(), StorageError> {
        let previous = self.inner.session.read().database.clone();

        if self.snapshot_dir().is_some() {
            self.load(database).await?;
        } else if previous.as_deref() != Some(database) {
            self.clear();
        }

        let mut session = self.inner.session.write();
        session.database = Some(database.to_string());
        session.connected = true;
        info!(database, "Connected to storage");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn disconnect(&self) -> Result<(), StorageError> {
        let mut session = self.inner.session.write();
        if session.connected {
            session.connected = false;
            info!(database = ?session.database, "Disconnected from storage");
        }
        Ok(())
    }

    async fn table_exists(&self, table: &str) -> Result<bool, StorageError> {
        self.database()?;
        Ok(self.inner.schemas.contains_key(table))
    }

    async fn get_table_schema(&self, table: &str) -> Result<Option<TableSchema>, StorageError> {
        self.database()?;
        Ok(self
            .inner
            .schemas
            .get(table)
            .map(|schema| schema.value().clone()))
    }

    async fn save_table_schema(&self, schema: &TableSchema) -> Result<(), StorageError> {
        self.database()?;
        self.inner
            .schemas
            .insert(schema.name().clone(), schema.clone());
        debug!(table = %schema.name(), "Schema saved");
        self.persist().await
    }

    async fn allocate_id(&self, table: &str) -> Result<i64, StorageError> {
        self.database()?;
        let id = {
            let mut schema =
                self.inner
                    .schemas
                    .get_mut(table)
                    .ok_or_else(|| StorageError::MissingSchema {
                        table: table.to_string(),
                    })?;
            let id = schema.next_id();
            schema.set_next_id(id + 1);
            id
        };
        trace!(table, id, "Allocated id");
        self.persist().await?;
        Ok(id)
    }

    async fn drop_table(&self, table: &str) -> Result<bool, StorageError> {
        self.database()?;
        let existed = self.inner.schemas.remove(table).is_some();
        self.inner.collections.remove(table);
        if existed {
            self.persist().await?;
        }
        Ok(existed)
    }

    async fn list_tables(&self) -> Result<Vec<String>, StorageError> {
        self.database()?;
        let mut tables = self
            .inner
            .schemas
            .iter()
            .map(|entry| entry.key().clone())
            .collect::<Vec<_>>();
        tables.sort();
        Ok(tables)
    }

    fn collection(&self, table: &str) -> Box<dyn Collection> {
        Box::new(MemoryCollection {
            store: self.clone(),
            name: table.to_string(),
        })
    }
}

#[derive(Debug)]
struct MemoryCollection {
    store: MemoryStore,
    name: String,
}

#[async_trait]
impl Collection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn insert_one(&self, row: Row) -> Result<DocumentId, StorageError> {
        self.store.database()?;
        let document = Document::new(row);
        let id = *document.id();
        self.store
            .inner
            .collections
            .entry(self.name.clone())
            .or_default()
            .push(document);
        self.store.persist().await?;
        Ok(id)
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<Document>, StorageError> {
        self.store.database()?;
        let documents = self
            .store
            .inner
            .collections
            .get(&self.name)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| filter.matches(document.row()))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        trace!(collection = %self.name, %filter, found = documents.len(), "find");
        Ok(documents)
    }

    async fn update_many(&self, filter: &Filter, set: &Row) -> Result<u64, StorageError> {
        self.store.database()?;
        let modified = match self.store.inner.collections.get_mut(&self.name) {
            Some(mut documents) => documents
                .iter_mut()
                .filter(|document| filter.matches(document.row()))
                .map(|document| document.row_mut().merge(set))
                .filter(|changed| *changed)
                .count() as u64,
            None => 0,
        };
        if modified > 0 {
            self.store.persist().await?;
        }
        Ok(modified)
    }

    async fn delete_many(&self, filter: &Filter) -> Result<u64, StorageError> {
        self.store.database()?;
        let deleted = match self.store.inner.collections.get_mut(&self.name) {
            Some(mut documents) => {
                let before = documents.len();
                documents.retain(|document| !filter.matches(document.row()));
                (before - documents.len()) as u64
            }
            None => 0,
        };
        if deleted > 0 {
            self.store.persist().await?;
        }
        Ok(deleted)
    }
}
