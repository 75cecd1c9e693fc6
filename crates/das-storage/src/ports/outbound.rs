//! # Outbound Ports (Driven Ports)
//!
//! Remote services the object store and distributed cache tiers talk to.
//! The host injects SDK-backed clients; `InMemoryObjectStore` and
//! `InMemoryCacheClient` implement them for development and tests.

use crate::domain::errors::ClientError;
use async_trait::async_trait;
use std::time::Duration;

/// Minimal S3-style object store client.
#[async_trait]
pub trait ObjectStoreClient: Send + Sync {
    /// Write an object. `expires_at` (seconds since epoch) asks the store to
    /// drop the object after that time.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        expires_at: Option<u64>,
    ) -> Result<(), ClientError>;

    /// Read an object; `Ok(None)` when it does not exist.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, ClientError>;

    /// Check the bucket exists and is reachable.
    async fn head_bucket(&self, bucket: &str) -> Result<(), ClientError>;
}

/// Minimal Redis-style key/value cache client.
#[async_trait]
pub trait CacheClient: Send + Sync {
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ClientError>;

    async fn set_with_ttl(&self, key: &[u8], value: &[u8], ttl: Duration)
        -> Result<(), ClientError>;

    async fn ping(&self) -> Result<(), ClientError>;
}
