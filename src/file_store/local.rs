use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use super::{FileStore, FileStoreError, SavedUpload};

/// Local filesystem store for uploaded originals.
pub struct LocalStore {
    base_path: PathBuf,
}

impl LocalStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, std::io::Error> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    fn file_path(&self, stored_name: &str) -> PathBuf {
        self.base_path.join(stored_name)
    }

    /// `{uuid-hex}{ext}`, with the extension taken (lowercased) from the
    /// original name so stored files keep a recognizable suffix.
    fn generate_stored_name(original_name: &str) -> String {
        let ext = Path::new(original_name)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        format!("{}{ext}", uuid::Uuid::new_v4().simple())
    }
}

#[async_trait]
impl FileStore for LocalStore {
    async fn save(&self, data: Bytes, original_name: &str) -> Result<SavedUpload, FileStoreError> {
        let stored_name = Self::generate_stored_name(original_name);
        let path = self.file_path(&stored_name);
        tokio::fs::write(&path, &data).await?;
        Ok(SavedUpload {
            stored_name,
            original_name: original_name.to_string(),
        })
    }

    async fn read(&self, stored_name: &str) -> Result<Bytes, FileStoreError> {
        let path = self.file_path(stored_name);
        if !path.exists() {
            return Err(FileStoreError::NotFound(stored_name.to_string()));
        }
        let data = tokio::fs::read(&path).await?;
        Ok(Bytes::from(data))
    }

    async fn open(&self, stored_name: &str) -> Result<tokio::fs::File, FileStoreError> {
        let path = self.file_path(stored_name);
        if !path.exists() {
            return Err(FileStoreError::NotFound(stored_name.to_string()));
        }
        Ok(tokio::fs::File::open(&path).await?)
    }

    async fn delete(&self, stored_name: &str) -> Result<(), FileStoreError> {
        let path = self.file_path(stored_name);
        if path.exists() {
            tokio::fs::remove_file(&path).await?;
        }
        Ok(())
    }

    async fn exists(&self, stored_name: &str) -> Result<bool, FileStoreError> {
        let path = self.file_path(stored_name);
        Ok(path.exists())
    }
}
