//! HTTP access to a database: `POST /query` with `{"sql": "..."}`.

pub mod middleware;
pub mod server;

pub use server::{start_server, DbServer};
