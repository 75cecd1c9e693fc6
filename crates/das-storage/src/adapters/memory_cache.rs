//! # Memory Cache Storage
//!
//! Bounded in-process LRU tier for the `bigCache` chain. Entries expire after
//! the configured lifetime regardless of use; the least recently used entry is
//! evicted when the cache is full.

use crate::domain::config::BigCacheConfig;
use crate::domain::errors::{ConfigError, StorageError};
use crate::domain::lifecycle::CloseState;
use crate::ports::backend::StorageBackend;
use async_trait::async_trait;
use das_types::{keccak256, ExpirationPolicy, Hash};
use lru::LruCache;
use parking_lot::Mutex;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

struct CacheEntry {
    data: Vec<u8>,
    expires_at: Instant,
}

pub struct MemoryCacheStorage {
    cache: Mutex<LruCache<Hash, CacheEntry>>,
    inner: Arc<dyn StorageBackend>,
    expiration: Duration,
    closed: CloseState,
}

impl MemoryCacheStorage {
    pub fn new(config: &BigCacheConfig, inner: Arc<dyn StorageBackend>) -> Result<Self, ConfigError> {
        let capacity =
            NonZeroUsize::new(config.capacity).ok_or(ConfigError::ZeroValue("big cache capacity"))?;
        if config.expiration.is_zero() {
            return Err(ConfigError::ZeroValue("big cache expiration"));
        }

        info!(
            "[das-storage] 🧠 Memory cache of {} entries over {}",
            capacity, inner
        );
        Ok(Self {
            cache: Mutex::new(LruCache::new(capacity)),
            inner,
            expiration: config.expiration,
            closed: CloseState::default(),
        })
    }

    fn insert(&self, hash: Hash, data: Vec<u8>) {
        let entry = CacheEntry {
            data,
            expires_at: Instant::now() + self.expiration,
        };
        self.cache.lock().put(hash, entry);
    }

    fn lookup(&self, hash: &Hash) -> Option<Vec<u8>> {
        let mut cache = self.cache.lock();
        let fresh = cache.get(hash).map(|e| e.expires_at > Instant::now())?;
        if fresh {
            cache.get(hash).map(|e| e.data.clone())
        } else {
            cache.pop(hash);
            None
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StorageBackend for MemoryCacheStorage {
    async fn put(&self, data: &[u8], timeout: u64) -> Result<(), StorageError> {
        self.closed.ensure_open()?;
        self.inner.put(data, timeout).await?;
        self.insert(keccak256(data), data.to_vec());
        Ok(())
    }

    async fn get_by_hash(&self, hash: &Hash) -> Result<Vec<u8>, StorageError> {
        self.closed.ensure_open()?;
        if let Some(data) = self.lookup(hash) {
            return Ok(data);
        }

        let data = self.inner.get_by_hash(hash).await?;
        self.insert(*hash, data.clone());
        Ok(data)
    }

    async fn sync(&self) -> Result<(), StorageError> {
        self.closed.ensure_open()?;
        self.inner.sync().await
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        self.closed.ensure_open()?;
        self.inner.health_check().await
    }

    async fn close(&self) -> Result<(), StorageError> {
        if !self.closed.close() {
            return Ok(());
        }
        self.cache.lock().clear();
        info!("[das-storage] Closed {}", self);
        self.inner.close().await
    }

    fn expiration_policy(&self) -> ExpirationPolicy {
        self.inner.expiration_policy()
    }
}

impl fmt::Display for MemoryCacheStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemoryCacheStorage({})", self.inner)
    }
}
