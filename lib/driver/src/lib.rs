//! Interactive front end over an [`execution::Database`]: runs statements,
//! renders their output for a terminal, and hosts the line-editing [`shell`].

use anyhow::Result;
use common::{DbConfig, StorageTarget};
use execution::{Database, ExecutionError, QueryOutput};
use getset::Getters;
use std::sync::Arc;
use storage::MemoryStore;
use tracing::{info, instrument};
use typed_builder::TypedBuilder;

pub mod render;
pub mod shell;

pub type DriverRef = Arc<Driver>;

#[derive(Debug, TypedBuilder, Getters)]
pub struct Driver {
    #[getset(get = "pub")]
    database: Database,
    #[getset(get = "pub")]
    name: String,
}

impl Driver {
    /// Opens the configured store and connects to the configured database.
    #[instrument(skip(config), fields(database = %config.database()))]
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        let target = config.storage_target()?;
        if let StorageTarget::Directory(dir) = &target {
            info!(dir = %dir.display(), "Using snapshot directory");
        }

        let database = Database::new(Arc::new(MemoryStore::from_target(&target)));
        database.connect(config.database()).await?;
        info!("Connected");

        Ok(Driver::builder()
            .database(database)
            .name(config.database().clone())
            .build())
    }

    pub async fn execute(&self, sql: &str) -> Result<QueryOutput, ExecutionError> {
        self.database.query(sql).await
    }

    /// Runs one statement and prints its output. Errors are printed too and
    /// then returned so the caller can decide whether to stop.
    pub async fn process_sql_command(&self, sql: &str) -> Result<()> {
        match self.execute(sql).await {
            Ok(output) => {
                println!("{}", render::render_output(&output));
                Ok(())
            }
            Err(error) => {
                eprintln!("{}", render::render_error(sql, &error));
                Err(error.into())
            }
        }
    }

    pub async fn tables(&self) -> Result<Vec<String>> {
        Ok(self.database.tables().await?)
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.database.disconnect().await?;
        info!(database = %self.name, "Disconnected");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions_sorted::assert_eq;

    #[tokio::test]
    async fn test_connect_in_memory() -> Result<()> {
        let driver = Driver::connect(&DbConfig::default()).await?;

        assert_eq!(driver.name(), "simpledb");
        driver.process_sql_command("CREATE TABLE users (id INT PRIMARY KEY)").await?;
        assert_eq!(driver.tables().await?, vec!["users".to_string()]);
        assert!(driver.process_sql_command("SELECT * FROM missing").await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_snapshot_directory_persists_between_drivers() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = DbConfig::builder()
            .storage_uri(format!("file://{}", dir.path().display()))
            .database("shop")
            .build();

        let driver = Driver::connect(&config).await?;
        driver.execute("CREATE TABLE items (id INT PRIMARY KEY, name VARCHAR(32))").await?;
        driver.execute("INSERT INTO items (name) VALUES ('lamp')").await?;
        driver.shutdown().await?;

        let driver = Driver::connect(&config).await?;
        let rows = driver
            .execute("SELECT name FROM items")
            .await?
            .into_rows()
            .unwrap_or_default();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some(&ty::Value::Text("lamp".into())));
        Ok(())
    }
}
