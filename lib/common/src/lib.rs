pub mod config;

pub mod util {
    pub mod time;
    pub mod trace;
}

pub use config::{DbConfig, DbConfigError, StorageTarget};
