//! # Storage Gateway
//!
//! The document store behind the executor. A store holds one metadata area
//! with a [`catalog::TableSchema`] per table, and one schemaless collection of
//! [`Document`]s per table. The executor talks to it only through the
//! [`StorageGateway`] and [`Collection`] traits; [`MemoryStore`] is the
//! in-process implementation, optionally snapshotted to disk.

pub mod document;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod memory;

pub use document::{Document, DocumentId};
pub use error::StorageError;
pub use filter::{Filter, FilterOp};
pub use gateway::{Collection, StorageGateway};
pub use memory::MemoryStore;
