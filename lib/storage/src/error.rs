use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage is not connected")]
    NotConnected,
    #[error("No schema stored for table '{table}'")]
    MissingSchema { table: String },
    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Snapshot is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}
