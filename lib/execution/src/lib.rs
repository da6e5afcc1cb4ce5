//! # Query Execution
//!
//! [`QueryExecutor`] runs a parsed statement against a
//! [`storage::StorageGateway`], enforcing the table's schema on the way in.
//! [`Database`] wraps it with parsing and the connection lifecycle.
//!
//! ```
//! use execution::Database;
//! use std::sync::Arc;
//! use storage::MemoryStore;
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! runtime.block_on(async {
//!     let db = Database::new(Arc::new(MemoryStore::new()));
//!     db.connect("example").await.unwrap();
//!     db.query("CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR(50))").await.unwrap();
//!     db.query("INSERT INTO users (name) VALUES ('Ada')").await.unwrap();
//!
//!     let output = db.query("SELECT * FROM users").await.unwrap();
//!     assert_eq!(output.rows().map(|rows| rows.len()), Some(1));
//! });
//! ```

pub mod database;
pub mod error;
pub mod executor;
pub mod join;
pub mod output;

pub use database::Database;
pub use error::ExecutionError;
pub use executor::QueryExecutor;
pub use output::QueryOutput;
