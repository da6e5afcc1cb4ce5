use crate::{ExecutionError, QueryExecutor, QueryOutput};
use common::util::time::format_duration;
use std::{sync::Arc, time::Instant};
use storage::StorageGateway;
use tracing::{info, instrument, warn};

/// Entry point for running SQL text: owns the gateway's connection lifecycle
/// and hands parsed statements to a [`QueryExecutor`].
#[derive(Clone)]
pub struct Database {
    executor: QueryExecutor,
    gateway: Arc<dyn StorageGateway>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

impl Database {
    pub fn new(gateway: Arc<dyn StorageGateway>) -> Self {
        Self {
            executor: QueryExecutor::new(gateway.clone()),
            gateway,
        }
    }

    pub async fn connect(&self, database: &str) -> Result<(), ExecutionError> {
        Ok(self.gateway.connect(database).await?)
    }

    pub async fn disconnect(&self) -> Result<(), ExecutionError> {
        Ok(self.gateway.disconnect().await?)
    }

    /// Parses and executes one statement.
    #[instrument(skip(self))]
    pub async fn query(&self, sql: &str) -> Result<QueryOutput, ExecutionError> {
        let start = Instant::now();
        let query = compile::parse(sql)?;
        info!(kind = query.kind(), table = query.table(), "Executing statement");

        let result = self.executor.execute(query).await;
        let elapsed = format_duration(start.elapsed());
        match &result {
            Ok(_) => info!(%elapsed, "Statement finished"),
            Err(error) => warn!(%elapsed, %error, "Statement failed"),
        }
        result
    }

    /// Names of every table, sorted.
    pub async fn tables(&self) -> Result<Vec<String>, ExecutionError> {
        Ok(self.gateway.list_tables().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{SchemaError, ValidationError};
    use pretty_assertions_sorted::assert_eq;
    use storage::MemoryStore;
    use ty::{Row, Value};

    async fn database() -> Database {
        let db = Database::new(Arc::new(MemoryStore::new()));
        db.connect("test").await.unwrap();
        db
    }

    async fn rows(db: &Database, sql: &str) -> Vec<Row> {
        db.query(sql).await.unwrap().into_rows().unwrap()
    }

    async fn status(db: &Database, sql: &str) -> (String, u64) {
        match db.query(sql).await.unwrap() {
            QueryOutput::Status { message, affected } => (message, affected),
            other => panic!("expected a status, got {:?}", other),
        }
    }

    fn row(fields: &[(&str, Value)]) -> Row {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    async fn users(db: &Database) {
        status(
            db,
            "CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR(255), email VARCHAR(255) UNIQUE, age INT)",
        )
        .await;
        status(
            db,
            "INSERT INTO users (name, email, age) VALUES ('John', 'john@example.com', 30)",
        )
        .await;
        status(
            db,
            "INSERT INTO users (name, email, age) VALUES ('Jane', 'jane@example.com', 25)",
        )
        .await;
    }

    #[tokio::test]
    async fn create_table() {
        let db = database().await;
        let (message, _) =
            status(&db, "CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR(255), age INT)").await;
        assert_eq!(message, "Table 'users' created successfully");
        assert_eq!(db.tables().await.unwrap(), vec!["users".to_string()]);

        let err = db
            .query("CREATE TABLE users (id INT PRIMARY KEY)")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::Schema(SchemaError::TableAlreadyExists { .. })
        ));
        assert_eq!(err.to_string(), "Table 'users' already exists");
    }

    #[tokio::test]
    async fn create_table_is_validated() {
        let db = database().await;
        let err = db
            .query("CREATE TABLE t (a INT PRIMARY KEY, b INT PRIMARY KEY)")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::Schema(SchemaError::MultiplePrimaryKeys { .. })
        ));
        let err = db.query("CREATE TABLE t (name VARCHAR)").await.unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::Schema(SchemaError::MissingVarCharLength { .. })
        ));
        assert!(db.tables().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn auto_increment_ids() {
        let db = database().await;
        users(&db).await;

        let rows = rows(&db, "SELECT id, name FROM users").await;
        assert_eq!(
            rows,
            vec![
                row(&[("id", Value::Integer(1)), ("name", Value::Text("John".into()))]),
                row(&[("id", Value::Integer(2)), ("name", Value::Text("Jane".into()))]),
            ]
        );
    }

    #[tokio::test]
    async fn select_star_keeps_written_order() {
        let db = database().await;
        users(&db).await;

        let rows = rows(&db, "SELECT * FROM users WHERE age > 25").await;
        assert_eq!(
            rows,
            vec![row(&[
                ("name", Value::Text("John".into())),
                ("email", Value::Text("john@example.com".into())),
                ("age", Value::Integer(30)),
                ("id", Value::Integer(1)),
            ])]
        );
    }

    #[tokio::test]
    async fn positional_insert_follows_schema_order() {
        let db = database().await;
        status(&db, "CREATE TABLE items (id INT PRIMARY KEY, name VARCHAR(20), qty INT)").await;
        // The supplied id is overwritten by the counter.
        status(&db, "INSERT INTO items VALUES (99, 'bolt', 4)").await;
        status(&db, "INSERT INTO items VALUES (0, 'nut')").await;

        let rows = rows(&db, "SELECT * FROM items").await;
        assert_eq!(
            rows,
            vec![
                row(&[
                    ("id", Value::Integer(1)),
                    ("name", Value::Text("bolt".into())),
                    ("qty", Value::Integer(4)),
                ]),
                row(&[("id", Value::Integer(2)), ("name", Value::Text("nut".into()))]),
            ]
        );

        let err = db
            .query("INSERT INTO items VALUES (1, 'x', 2, 3)")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::Validation(ValidationError::ColumnCountMismatch { .. })
        ));
        let err = db
            .query("INSERT INTO items (name, qty) VALUES ('x')")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::Validation(ValidationError::ColumnCountMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn rejected_insert_does_not_burn_an_id() {
        let db = database().await;
        users(&db).await;

        let err = db
            .query("INSERT INTO users (name, age) VALUES ('Old', 'very')")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Column 'age' must be an integer, found TEXT");

        status(&db, "INSERT INTO users (name, age) VALUES ('Bob', 40)").await;
        let rows = rows(&db, "SELECT id FROM users WHERE name = 'Bob'").await;
        assert_eq!(rows, vec![row(&[("id", Value::Integer(3))])]);
    }

    #[tokio::test]
    async fn update_reports_changed_rows() {
        let db = database().await;
        users(&db).await;

        let (message, affected) = status(&db, "UPDATE users SET age = 31 WHERE name = 'John'").await;
        assert_eq!(message, "1 row(s) updated in 'users'");
        assert_eq!(affected, 1);

        let rows = rows(&db, "SELECT age FROM users WHERE name = 'John'").await;
        assert_eq!(rows, vec![row(&[("age", Value::Integer(31))])]);

        let (_, affected) = status(&db, "UPDATE users SET age = 31 WHERE name = 'John'").await;
        assert_eq!(affected, 0);
    }

    #[tokio::test]
    async fn update_is_validated() {
        let db = database().await;
        users(&db).await;

        let err = db
            .query("UPDATE users SET salary = 10")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::Validation(ValidationError::UnknownColumn { .. })
        ));

        let err = db
            .query("UPDATE users SET email = 'jane@example.com' WHERE name = 'John'")
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Constraint { .. }));

        let err = db
            .query("UPDATE users SET email = 'same@example.com'")
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Constraint { .. }));

        // Rewriting a row's own unique value is allowed.
        let (_, affected) = status(
            &db,
            "UPDATE users SET email = 'john@example.com', age = 33 WHERE name = 'John'",
        )
        .await;
        assert_eq!(affected, 1);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let db = database().await;
        users(&db).await;

        let (message, affected) = status(&db, "DELETE FROM users WHERE age < 28").await;
        assert_eq!(message, "1 row(s) deleted from 'users'");
        assert_eq!(affected, 1);

        let (message, affected) = status(&db, "DELETE FROM users WHERE age < 28").await;
        assert_eq!(message, "0 row(s) deleted from 'users'");
        assert_eq!(affected, 0);

        assert_eq!(rows(&db, "SELECT * FROM users").await.len(), 1);
    }

    #[tokio::test]
    async fn join_prefixes_keys() {
        let db = database().await;
        users(&db).await;
        status(&db, "CREATE TABLE orders (id INT PRIMARY KEY, user_id INT, total INT)").await;
        status(&db, "INSERT INTO orders (user_id, total) VALUES (1, 250)").await;

        let rows = rows(&db, "SELECT * FROM users JOIN orders ON users.id = orders.user_id").await;
        assert_eq!(
            rows,
            vec![row(&[
                ("users.name", Value::Text("John".into())),
                ("users.email", Value::Text("john@example.com".into())),
                ("users.age", Value::Integer(30)),
                ("users.id", Value::Integer(1)),
                ("orders.user_id", Value::Integer(1)),
                ("orders.total", Value::Integer(250)),
                ("orders.id", Value::Integer(1)),
            ])]
        );

        let rows = self::rows(
            &db,
            "SELECT users.name, orders.total, missing FROM users JOIN orders ON users.id = orders.user_id",
        )
        .await;
        assert_eq!(
            rows,
            vec![row(&[
                ("users.name", Value::Text("John".into())),
                ("orders.total", Value::Integer(250)),
            ])]
        );
    }

    #[tokio::test]
    async fn join_requires_both_tables() {
        let db = database().await;
        users(&db).await;

        let err = db
            .query("SELECT * FROM users JOIN orders ON users.id = orders.user_id")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Table 'orders' does not exist");
    }

    #[tokio::test]
    async fn duplicate_unique_value() {
        let db = database().await;
        users(&db).await;

        let err = db
            .query("INSERT INTO users (name, email, age) VALUES ('Johnny', 'john@example.com', 20)")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Duplicate value for unique column 'email': john@example.com"
        );
        assert_eq!(rows(&db, "SELECT * FROM users").await.len(), 2);

        // Nulls are never duplicates.
        status(&db, "INSERT INTO users (name) VALUES ('A')").await;
        status(&db, "INSERT INTO users (name) VALUES ('B')").await;
    }

    #[tokio::test]
    async fn missing_tables() {
        let db = database().await;
        for sql in [
            "SELECT * FROM ghosts",
            "INSERT INTO ghosts VALUES (1)",
            "UPDATE ghosts SET a = 1",
            "DELETE FROM ghosts",
            "DROP TABLE ghosts",
        ] {
            let err = db.query(sql).await.unwrap_err();
            assert!(
                matches!(err, ExecutionError::NotFound { ref table } if table == "ghosts"),
                "{} gave {:?}",
                sql,
                err
            );
        }
    }

    #[tokio::test]
    async fn drop_table() {
        let db = database().await;
        users(&db).await;

        let (message, _) = status(&db, "DROP TABLE users").await;
        assert_eq!(message, "Table 'users' dropped");
        assert!(matches!(
            db.query("SELECT * FROM users").await,
            Err(ExecutionError::NotFound { .. })
        ));

        // Recreating starts from a fresh counter and an empty collection.
        users(&db).await;
        assert_eq!(rows(&db, "SELECT * FROM users").await.len(), 2);
    }

    #[tokio::test]
    async fn dates_are_normalised() {
        let db = database().await;
        status(&db, "CREATE TABLE events (id INT PRIMARY KEY, name VARCHAR(50), day DATE)").await;
        status(&db, "INSERT INTO events (name, day) VALUES ('launch', '2024-03-01')").await;
        status(&db, "INSERT INTO events (name, day) VALUES ('review', '2024/06/15')").await;

        let err = db
            .query("INSERT INTO events (name, day) VALUES ('never', 'someday')")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::Validation(ValidationError::InvalidDate { .. })
        ));

        let rows = rows(&db, "SELECT name FROM events WHERE day > '2024-04-01'").await;
        assert_eq!(rows, vec![row(&[("name", Value::Text("review".into()))])]);
    }

    #[tokio::test]
    async fn not_null_columns() {
        let db = database().await;
        status(&db, "CREATE TABLE t (id INT PRIMARY KEY, code VARCHAR(4) NOT NULL)").await;

        let err = db.query("INSERT INTO t (id) VALUES (5)").await.unwrap_err();
        assert_eq!(err.to_string(), "Column 'code' cannot be null");

        // Bare NULL is read as text.
        status(&db, "INSERT INTO t (code) VALUES (NULL)").await;
        let rows = rows(&db, "SELECT code FROM t").await;
        assert_eq!(rows, vec![row(&[("code", Value::Text("NULL".into()))])]);
    }

    #[tokio::test]
    async fn parse_errors_surface() {
        let db = database().await;
        let err = db.query("SELEC * FROM users").await.unwrap_err();
        assert!(matches!(err, ExecutionError::Parse(_)));
        assert_eq!(err.to_string(), "unsupported query: SELEC * FROM users");
    }

    #[tokio::test]
    async fn queries_require_connection() {
        let db = Database::new(Arc::new(MemoryStore::new()));
        let err = db.query("SELECT * FROM users").await.unwrap_err();
        assert!(matches!(err, ExecutionError::Storage(_)));
    }
}
