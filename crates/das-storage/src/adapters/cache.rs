//! # Distributed Cache Storage
//!
//! Write-through cache tier for the `redis` chain.
//!
//! - `put` writes the inner tier first, then the cache.
//! - `get_by_hash` consults the cache, then the inner tier on a miss, and
//!   populates the cache with what it found.
//! - Cached values are re-hashed; a value that does not match its key is
//!   treated as a miss. Client failures are not misses and propagate.

use crate::domain::config::RedisConfig;
use crate::domain::errors::{ClientError, StorageError};
use crate::domain::lifecycle::CloseState;
use crate::domain::matches_hash;
use crate::ports::backend::StorageBackend;
use crate::ports::outbound::CacheClient;
use async_trait::async_trait;
use das_types::{keccak256, ExpirationPolicy, Hash};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct RedisStorage {
    client: Arc<dyn CacheClient>,
    inner: Arc<dyn StorageBackend>,
    expiration: Duration,
    closed: CloseState,
}

impl RedisStorage {
    pub fn new(
        client: Arc<dyn CacheClient>,
        config: &RedisConfig,
        inner: Arc<dyn StorageBackend>,
    ) -> Self {
        info!(
            "[das-storage] ⚡ Distributed cache over {} (expiration {:?})",
            inner, config.expiration
        );
        Self {
            client,
            inner,
            expiration: config.expiration,
            closed: CloseState::default(),
        }
    }

    async fn cache(&self, hash: &Hash, data: &[u8]) -> Result<(), StorageError> {
        self.client
            .set_with_ttl(hash, data, self.expiration)
            .await
            .map_err(|e| StorageError::backend("redis", e))
    }
}

#[async_trait]
impl StorageBackend for RedisStorage {
    async fn put(&self, data: &[u8], timeout: u64) -> Result<(), StorageError> {
        self.closed.ensure_open()?;
        self.inner.put(data, timeout).await?;
        self.cache(&keccak256(data), data).await
    }

    async fn get_by_hash(&self, hash: &Hash) -> Result<Vec<u8>, StorageError> {
        self.closed.ensure_open()?;

        let cached = self
            .client
            .get(hash)
            .await
            .map_err(|e| StorageError::backend("redis", e))?;
        match cached {
            Some(data) if matches_hash(&data, hash) => return Ok(data),
            Some(_) => warn!(
                "[das-storage] Cached value for {} failed integrity check, refetching",
                hex::encode(hash)
            ),
            None => debug!("[das-storage] Cache miss for {}", hex::encode(hash)),
        }

        let data = self.inner.get_by_hash(hash).await?;
        self.cache(hash, &data).await?;
        Ok(data)
    }

    async fn sync(&self) -> Result<(), StorageError> {
        self.closed.ensure_open()?;
        self.inner.sync().await
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        self.closed.ensure_open()?;
        self.client
            .ping()
            .await
            .map_err(|e| StorageError::backend("redis", e))?;
        self.inner.health_check().await
    }

    async fn close(&self) -> Result<(), StorageError> {
        if !self.closed.close() {
            return Ok(());
        }
        info!("[das-storage] Closed {}", self);
        self.inner.close().await
    }

    fn expiration_policy(&self) -> ExpirationPolicy {
        self.inner.expiration_policy()
    }
}

impl fmt::Display for RedisStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RedisStorage({})", self.inner)
    }
}

/// In-process cache client with per-key TTL, for development and tests.
#[derive(Default)]
pub struct InMemoryCacheClient {
    entries: Mutex<HashMap<Vec<u8>, (Vec<u8>, Instant)>>,
}

impl InMemoryCacheClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a key without TTL bookkeeping changes, as a misbehaving
    /// cache would.
    pub fn overwrite(&self, key: &[u8], value: &[u8]) {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get_mut(key) {
            entry.0 = value.to_vec();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheClient for InMemoryCacheClient {
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ClientError> {
        let mut entries = self.entries.lock();
        let expired = match entries.get(key) {
            Some((value, deadline)) if *deadline > Instant::now() => {
                return Ok(Some(value.clone()))
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set_with_ttl(
        &self,
        key: &[u8],
        value: &[u8],
        ttl: Duration,
    ) -> Result<(), ClientError> {
        self.entries
            .lock()
            .insert(key.to_vec(), (value.to_vec(), Instant::now() + ttl));
        Ok(())
    }

    async fn ping(&self) -> Result<(), ClientError> {
        Ok(())
    }
}
