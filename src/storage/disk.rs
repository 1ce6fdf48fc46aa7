use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::{check_key, new_key, BlobStore, FileExtension, StorageError};

/// Stores blobs as flat files in a single upload directory.
#[derive(Clone, Debug)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Opens the store, creating the directory when needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(DiskStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a key to its file path. Fails for keys that are not ours.
    pub fn path_of(&self, key: &str) -> Result<PathBuf, StorageError> {
        check_key(key)?;
        Ok(self.root.join(key))
    }

    pub async fn read(&self, key: &str) -> Result<fs::File, StorageError> {
        let path = self.path_of(key)?;
        fs::File::open(&path).await.map_err(|err| match err.kind() {
            ErrorKind::NotFound => StorageError::Missing(key.to_owned()),
            _ => StorageError::Io(err),
        })
    }
}

impl BlobStore for DiskStore {
    async fn put(&self, data: Bytes, extension: FileExtension) -> Result<String, StorageError> {
        let key = new_key(extension);
        fs::write(self.root.join(&key), &data).await?;
        Ok(key)
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_of(key)?;
        fs::remove_file(&path).await.map_err(|err| match err.kind() {
            ErrorKind::NotFound => StorageError::Missing(key.to_owned()),
            _ => StorageError::Io(err),
        })
    }
}
