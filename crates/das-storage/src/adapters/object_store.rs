//! # Object Store Storage
//!
//! Terminal tier for the `s3` chain. Objects are keyed `<prefix><hex(hash)>`.

use crate::domain::config::ObjectStoreConfig;
use crate::domain::errors::{ClientError, StorageError};
use crate::domain::lifecycle::CloseState;
use crate::domain::{matches_hash, unix_now};
use crate::ports::backend::StorageBackend;
use crate::ports::outbound::ObjectStoreClient;
use async_trait::async_trait;
use das_types::{keccak256, ExpirationPolicy, Hash};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

pub struct ObjectStoreStorage {
    client: Arc<dyn ObjectStoreClient>,
    bucket: String,
    object_prefix: String,
    policy: ExpirationPolicy,
    closed: CloseState,
}

impl ObjectStoreStorage {
    pub fn new(
        client: Arc<dyn ObjectStoreClient>,
        config: &ObjectStoreConfig,
        discard_after_timeout: bool,
    ) -> Self {
        let policy = ExpirationPolicy::from_discard_flag(discard_after_timeout);
        info!(
            "[das-storage] 🪣 Object store storage in bucket '{}' ({})",
            config.bucket, policy
        );

        Self {
            client,
            bucket: config.bucket.clone(),
            object_prefix: config.object_prefix.clone(),
            policy,
            closed: CloseState::default(),
        }
    }

    fn object_key(&self, hash: &Hash) -> String {
        format!("{}{}", self.object_prefix, hex::encode(hash))
    }
}

#[async_trait]
impl StorageBackend for ObjectStoreStorage {
    async fn put(&self, data: &[u8], timeout: u64) -> Result<(), StorageError> {
        self.closed.ensure_open()?;

        let key = self.object_key(&keccak256(data));
        self.client
            .put_object(&self.bucket, &key, data.to_vec(), self.policy.expiry_for(timeout))
            .await
            .map_err(|e| StorageError::backend("s3", e))?;

        debug!("[das-storage] Uploaded {} bytes to {}", data.len(), key);
        Ok(())
    }

    async fn get_by_hash(&self, hash: &Hash) -> Result<Vec<u8>, StorageError> {
        self.closed.ensure_open()?;

        let data = self
            .client
            .get_object(&self.bucket, &self.object_key(hash))
            .await
            .map_err(|e| StorageError::backend("s3", e))?
            .ok_or(StorageError::NotFound)?;

        if !matches_hash(&data, hash) {
            return Err(StorageError::Corruption {
                hash: hex::encode(hash),
            });
        }
        Ok(data)
    }

    /// Uploads are durable once acknowledged.
    async fn sync(&self) -> Result<(), StorageError> {
        self.closed.ensure_open()
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        self.closed.ensure_open()?;
        self.client
            .head_bucket(&self.bucket)
            .await
            .map_err(|e| StorageError::backend("s3", e))
    }

    async fn close(&self) -> Result<(), StorageError> {
        if self.closed.close() {
            info!("[das-storage] Closed {}", self);
        }
        Ok(())
    }

    fn expiration_policy(&self) -> ExpirationPolicy {
        self.policy
    }
}

impl fmt::Display for ObjectStoreStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectStoreStorage({})", self.bucket)
    }
}

struct StoredObject {
    body: Vec<u8>,
    expires_at: Option<u64>,
}

/// In-process object store for development and tests.
///
/// Only buckets passed to [`with_bucket`](Self::with_bucket) exist. Objects past
/// their expiry read as absent.
#[derive(Default)]
pub struct InMemoryObjectStore {
    buckets: RwLock<HashSet<String>>,
    objects: RwLock<HashMap<(String, String), StoredObject>>,
}

impl InMemoryObjectStore {
    pub fn with_bucket(bucket: impl Into<String>) -> Self {
        let store = Self::default();
        store.buckets.write().insert(bucket.into());
        store
    }

    pub fn object_count(&self) -> usize {
        self.objects.read().len()
    }

    fn ensure_bucket(&self, bucket: &str) -> Result<(), ClientError> {
        if self.buckets.read().contains(bucket) {
            Ok(())
        } else {
            Err(ClientError::Request(format!("no such bucket: {}", bucket)))
        }
    }
}

#[async_trait]
impl ObjectStoreClient for InMemoryObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        expires_at: Option<u64>,
    ) -> Result<(), ClientError> {
        self.ensure_bucket(bucket)?;
        self.objects.write().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject { body, expires_at },
        );
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, ClientError> {
        self.ensure_bucket(bucket)?;
        let objects = self.objects.read();
        let object = objects
            .get(&(bucket.to_string(), key.to_string()))
            .filter(|o| o.expires_at.map_or(true, |at| at > unix_now()));
        Ok(object.map(|o| o.body.clone()))
    }

    async fn head_bucket(&self, bucket: &str) -> Result<(), ClientError> {
        self.ensure_bucket(bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(prefix: &str) -> ObjectStoreConfig {
        ObjectStoreConfig {
            bucket: "das".into(),
            object_prefix: prefix.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_put_get_with_prefix() {
        let client = Arc::new(InMemoryObjectStore::with_bucket("das"));
        let storage = ObjectStoreStorage::new(client.clone(), &config("blobs/"), false);

        storage.put(b"hello", 1).await.unwrap();
        storage.sync().await.unwrap();

        let hash = keccak256(b"hello");
        assert_eq!(storage.get_by_hash(&hash).await.unwrap(), b"hello");
        let raw = client
            .get_object("das", &format!("blobs/{}", hex::encode(hash)))
            .await
            .unwrap();
        assert_eq!(raw.as_deref(), Some(&b"hello"[..]));
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let client = Arc::new(InMemoryObjectStore::with_bucket("das"));
        let storage = ObjectStoreStorage::new(client, &config(""), false);

        assert!(storage.get_by_hash(&[3u8; 32]).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_discard_after_timeout_sets_object_expiry() {
        let client = Arc::new(InMemoryObjectStore::with_bucket("das"));
        let storage = ObjectStoreStorage::new(client, &config(""), true);

        storage.put(b"short lived", 1).await.unwrap();
        assert!(storage
            .get_by_hash(&keccak256(b"short lived"))
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_missing_bucket_is_backend_error_not_not_found() {
        let client = Arc::new(InMemoryObjectStore::default());
        let storage = ObjectStoreStorage::new(client, &config(""), false);

        let err = storage.get_by_hash(&[3u8; 32]).await.unwrap_err();
        assert!(matches!(err, StorageError::Backend { backend: "s3", .. }));
        assert!(storage.health_check().await.is_err());
    }

    #[tokio::test]
    async fn test_closed_rejects_calls() {
        let client = Arc::new(InMemoryObjectStore::with_bucket("das"));
        let storage = ObjectStoreStorage::new(client, &config(""), false);
        storage.close().await.unwrap();

        assert!(matches!(storage.put(b"x", 1).await, Err(StorageError::Closed)));
        assert!(matches!(storage.health_check().await, Err(StorageError::Closed)));
    }
}
