//! Document storage.
//!
//! Generated PDFs live in one flat directory, one `<numero>.pdf` per quote.
//! Writes go through a temporary file in the same directory and are renamed
//! into place, so a reader never observes a partially written document.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use actix_web::error::BlockingError;
use actix_web::web;
use async_trait::async_trait;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("document '{0}' not found")]
    NotFound(String),
    #[error("invalid document name '{0}'")]
    InvalidName(String),
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to move document into place: {0}")]
    Persist(#[from] tempfile::PersistError),
    #[error("storage task failed: {0}")]
    Blocking(#[from] BlockingError),
}

#[async_trait]
pub trait DocumentStorage: Send + Sync {
    async fn save(&self, filename: &str, data: &[u8]) -> Result<(), StorageError>;

    async fn load(&self, filename: &str) -> Result<Vec<u8>, StorageError>;
}

/// Storage backed by a local directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the storage directory if it does not exist yet.
    pub fn ensure_root(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Resolve `filename` inside the root. Only bare names are accepted.
    pub fn path_for(&self, filename: &str) -> Result<PathBuf, StorageError> {
        if !is_bare_filename(filename) {
            return Err(StorageError::InvalidName(filename.to_string()));
        }
        Ok(self.root.join(filename))
    }
}

fn is_bare_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.starts_with('.')
        && !filename.contains(['/', '\\', '\0'])
}

fn write_atomically(root: &Path, path: &Path, data: &[u8]) -> Result<(), StorageError> {
    fs::create_dir_all(root)?;
    let mut temp_file = NamedTempFile::new_in(root)?;
    temp_file.write_all(data)?;
    temp_file.as_file().sync_all()?;
    temp_file.persist(path)?;
    Ok(())
}

#[async_trait]
impl DocumentStorage for LocalStorage {
    async fn save(&self, filename: &str, data: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(filename)?;
        let root = self.root.clone();
        let data = data.to_vec();

        web::block(move || write_atomically(&root, &path, &data)).await??;
        log::debug!("Stored {} in {}", filename, self.root.display());
        Ok(())
    }

    async fn load(&self, filename: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(filename)?;
        let name = filename.to_string();

        let bytes = web::block(move || fs::read(&path)).await?.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StorageError::NotFound(name)
            } else {
                StorageError::Io(e)
            }
        })?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[actix_web::test]
    async fn test_save_then_load_returns_same_bytes() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.save("DEV-20250101-ABCDEF.pdf", b"%PDF-1.3 test").await.unwrap();
        let bytes = storage.load("DEV-20250101-ABCDEF.pdf").await.unwrap();

        assert_eq!(bytes, b"%PDF-1.3 test");
    }

    #[actix_web::test]
    async fn test_save_leaves_no_temporary_files() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.save("DEV-20250101-ABCDEF.pdf", b"one").await.unwrap();
        storage.save("DEV-20250101-ABCDEF.pdf", b"two").await.unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(storage.load("DEV-20250101-ABCDEF.pdf").await.unwrap(), b"two");
    }

    #[actix_web::test]
    async fn test_save_creates_missing_root() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("nested").join("pdfs"));

        storage.save("DEV-20250101-ABCDEF.pdf", b"data").await.unwrap();
        assert!(storage.root().join("DEV-20250101-ABCDEF.pdf").exists());
    }

    #[actix_web::test]
    async fn test_load_missing_document() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let result = storage.load("DEV-20250101-ZZZZZZ.pdf").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[actix_web::test]
    async fn test_rejects_path_components() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        for name in ["../secret.pdf", "a/b.pdf", "..\\b.pdf", ".hidden", ""] {
            let result = storage.load(name).await;
            assert!(
                matches!(result, Err(StorageError::InvalidName(_))),
                "{:?} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_ensure_root() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("out"));
        storage.ensure_root().unwrap();
        assert!(storage.root().is_dir());
    }
}
