//! Blob storage for product images.
//!
//! Images live outside the relational store and are addressed by opaque keys
//! of the form `<uuid>.<ext>`. Catalog code only talks to [`BlobStore`]; the
//! local-disk backend is [`DiskStore`].

mod disk;

pub use disk::DiskStore;

use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

pub trait BlobStore: Send + Sync {
    /// Stores `data` under a freshly generated key and returns that key.
    fn put(
        &self,
        data: Bytes,
        extension: FileExtension,
    ) -> impl Future<Output = Result<String, StorageError>> + Send;

    fn delete(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
    #[error("No blob stored under {0}")]
    Missing(String),
    #[error("Storage io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FileExtension {
    Jpg,
    Png,
    Gif,
    Webp,
}

impl FileExtension {
    /// Maps an upload's declared content type to the extension it is stored with.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            "image/jpeg" | "image/jpg" => Some(FileExtension::Jpg),
            "image/png" => Some(FileExtension::Png),
            "image/gif" => Some(FileExtension::Gif),
            "image/webp" => Some(FileExtension::Webp),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileExtension::Jpg => "jpg",
            FileExtension::Png => "png",
            FileExtension::Gif => "gif",
            FileExtension::Webp => "webp",
        }
    }
}

impl FromStr for FileExtension {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jpg" => Ok(FileExtension::Jpg),
            "png" => Ok(FileExtension::Png),
            "gif" => Ok(FileExtension::Gif),
            "webp" => Ok(FileExtension::Webp),
            _ => Err(()),
        }
    }
}

impl fmt::Display for FileExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}\.(jpg|png|gif|webp)$")
        .expect("storage key pattern is valid")
});

pub fn new_key(extension: FileExtension) -> String {
    format!("{}.{}", Uuid::new_v4(), extension)
}

/// Rejects anything that is not a key this module could have generated.
pub fn check_key(key: &str) -> Result<(), StorageError> {
    if KEY_REGEX.is_match(key) {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_owned()))
    }
}
