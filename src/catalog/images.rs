use bytes::Bytes;
use std::collections::HashSet;
use tracing::warn;
use validator::ValidationErrors;

use super::{field_error, CatalogError};
use crate::storage::{BlobStore, FileExtension, StorageError};

/// One slot of a submitted image list.
#[derive(Debug, Clone)]
pub enum ImageEntry {
    /// Keep an image the product already owns, at this position.
    Kept { key: String },
    /// Store a freshly uploaded image.
    New(Upload),
}

#[derive(Debug, Clone)]
pub struct Upload {
    pub data: Bytes,
    pub extension: FileExtension,
}

impl Upload {
    /// Checks an uploaded part before anything is written anywhere.
    pub fn accept(
        content_type: Option<&str>,
        data: Bytes,
        size_limit: usize,
    ) -> Result<Self, CatalogError> {
        let Some(extension) = content_type.and_then(FileExtension::from_content_type) else {
            return Err(field_error(
                "images",
                "image",
                "Images must be JPEG, PNG, GIF or WebP files",
            )
            .into());
        };
        if data.len() > size_limit {
            return Err(CatalogError::TooLarge { limit: size_limit });
        }

        Ok(Upload { data, extension })
    }
}

/// The keep/remove/add sets for one image-list submission.
#[derive(Debug, Default)]
pub struct ImagePlan {
    /// Kept keys, in submitted order.
    pub kept: Vec<String>,
    /// New payloads, in submitted order. Their keys go after `kept`.
    pub incoming: Vec<Upload>,
    /// Keys currently owned by the product that the submission dropped.
    pub removed: Vec<String>,
}

impl ImagePlan {
    /// Partitions `submitted` against the product's `current` keys.
    ///
    /// Fails when a kept entry names a key the product does not own.
    pub fn new(current: &[String], submitted: Vec<ImageEntry>) -> Result<Self, ValidationErrors> {
        let owned: HashSet<&str> = current.iter().map(String::as_str).collect();
        let mut plan = ImagePlan::default();

        for entry in submitted {
            match entry {
                ImageEntry::Kept { key } => {
                    if !owned.contains(key.as_str()) {
                        return Err(field_error(
                            "images",
                            "unknown_key",
                            format!("Image {key} does not belong to this product"),
                        ));
                    }
                    plan.kept.push(key);
                }
                ImageEntry::New(upload) => plan.incoming.push(upload),
            }
        }

        let kept: HashSet<&str> = plan.kept.iter().map(String::as_str).collect();
        plan.removed = unique_keys(current)
            .into_iter()
            .filter(|key| !kept.contains(key.as_str()))
            .collect();

        Ok(plan)
    }
}

/// Keys in first-seen order with repeats dropped.
pub fn unique_keys(keys: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    keys.iter()
        .filter(|key| seen.insert(key.as_str()))
        .cloned()
        .collect()
}

/// Stores every upload in order. On the first failure the blobs already
/// written by this call are deleted again and the error is returned.
pub async fn store_all<S: BlobStore>(
    storage: &S,
    uploads: Vec<Upload>,
) -> Result<Vec<String>, StorageError> {
    let mut stored = Vec::with_capacity(uploads.len());
    for upload in uploads {
        match storage.put(upload.data, upload.extension).await {
            Ok(key) => stored.push(key),
            Err(err) => {
                discard(storage, &stored).await;
                return Err(err);
            }
        }
    }
    Ok(stored)
}

/// Best-effort delete. Failures are logged and counted, never returned.
pub async fn discard<S: BlobStore>(storage: &S, keys: &[String]) -> usize {
    let mut failed = 0;
    for key in keys {
        if let Err(err) = storage.delete(key).await {
            failed += 1;
            warn!(key = %key, error = %err, "Failed to delete image blob");
        }
    }
    failed
}
