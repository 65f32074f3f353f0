//! S3-compatible object store access: paginated listing and scoped downloads.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use object_store::ObjectStore;
use object_store::aws::AmazonS3Builder;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::models::ObjectInfo;

/// Lists objects under a prefix. Pagination is transparent; the whole prefix
/// is drained. No type filtering happens here.
#[async_trait]
pub trait ObjectLister: Send + Sync {
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>, StoreError>;
}

/// Downloads one object to a scoped local temporary file.
#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<FetchedObject, StoreError>;
}

/// A downloaded object. The backing temporary file is removed when this
/// handle drops, on every exit path.
pub struct FetchedObject {
    key: String,
    tmp: NamedTempFile,
}

impl FetchedObject {
    /// Write `content` into a fresh temporary file.
    pub fn from_bytes(key: impl Into<String>, content: &[u8]) -> Result<Self, StoreError> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(content)?;
        tmp.flush()?;
        Ok(Self {
            key: key.into(),
            tmp,
        })
    }

    /// Object key this download came from.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Path of the local copy. Valid until the handle drops.
    pub fn path(&self) -> &Path {
        self.tmp.path()
    }

    /// Read the local copy back into memory.
    pub fn read(&self) -> Result<Vec<u8>, StoreError> {
        Ok(std::fs::read(self.tmp.path())?)
    }
}

/// Object store client backed by an S3-compatible endpoint.
pub struct S3Store {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl S3Store {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        if config.bucket.is_empty() {
            return Err(StoreError::NotConfigured("bucket name is empty".into()));
        }

        // object_store requires absolute endpoint URLs
        let endpoint = if config.endpoint.starts_with("http://")
            || config.endpoint.starts_with("https://")
        {
            config.endpoint.clone()
        } else {
            format!("https://{}", config.endpoint)
        };

        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region)
            .with_endpoint(&endpoint)
            .with_allow_http(endpoint.starts_with("http://"));

        if let Some(ref key) = config.access_key_id {
            builder = builder.with_access_key_id(key);
        }
        if let Some(ref secret) = config.secret_access_key {
            builder = builder.with_secret_access_key(secret);
        }

        let store = builder.build().map_err(StoreError::Unavailable)?;
        info!("Object store: bucket '{}' at {}", config.bucket, endpoint);

        Ok(Self {
            store: Arc::new(store),
            bucket: config.bucket.clone(),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectLister for S3Store {
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>, StoreError> {
        let path = object_store::path::Path::from(prefix);
        let mut stream = self.store.list(Some(&path));

        let mut objects = Vec::new();
        while let Some(meta) = stream
            .try_next()
            .await
            .map_err(StoreError::Unavailable)?
        {
            objects.push(ObjectInfo {
                key: meta.location.to_string(),
                size: meta.size,
                last_modified: meta.last_modified,
            });
        }

        debug!("Listed {} objects under '{}'", objects.len(), prefix);
        Ok(objects)
    }
}

#[async_trait]
impl ObjectFetcher for S3Store {
    async fn fetch(&self, key: &str) -> Result<FetchedObject, StoreError> {
        let path = object_store::path::Path::from(key);
        let result = self.store.get(&path).await.map_err(|source| {
            StoreError::Fetch {
                key: key.to_string(),
                source,
            }
        })?;
        let bytes = result.bytes().await.map_err(|source| StoreError::Fetch {
            key: key.to_string(),
            source,
        })?;

        debug!("Fetched '{}' ({} bytes)", key, bytes.len());
        FetchedObject::from_bytes(key, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetched_object_round_trip() {
        let fetched = FetchedObject::from_bytes("invoices/a.jpg", b"payload").unwrap();
        assert_eq!(fetched.key(), "invoices/a.jpg");
        assert_eq!(fetched.read().unwrap(), b"payload");
    }

    #[test]
    fn test_temp_file_removed_on_drop() {
        let fetched = FetchedObject::from_bytes("a.jpg", b"x").unwrap();
        let path = fetched.path().to_path_buf();
        assert!(path.exists());
        drop(fetched);
        assert!(!path.exists());
    }
}
