mod local;

pub use local::LocalStore;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("File not found: {0}")]
    NotFound(String),
}

/// A persisted upload: the generated on-disk name plus the name the user
/// gave the file. Stored names are unique per upload; original names are
/// cosmetic and need not be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedUpload {
    pub stored_name: String,
    pub original_name: String,
}

/// Abstraction over upload storage. Stored names are collision-resistant
/// tokens -- the raw files are meaningless without the metadata DB.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Write `data` under a freshly generated stored name.
    async fn save(&self, data: Bytes, original_name: &str) -> Result<SavedUpload, FileStoreError>;
    async fn read(&self, stored_name: &str) -> Result<Bytes, FileStoreError>;
    /// Open the stored file for streaming reads.
    async fn open(&self, stored_name: &str) -> Result<tokio::fs::File, FileStoreError>;
    /// Remove the file if present. A missing file is not an error --
    /// deletion is best-effort cleanup.
    async fn delete(&self, stored_name: &str) -> Result<(), FileStoreError>;
    async fn exists(&self, stored_name: &str) -> Result<bool, FileStoreError>;
}
