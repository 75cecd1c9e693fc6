//! Storage test doubles, shared with dependent crates via the `test-utils` feature.

use crate::domain::errors::StorageError;
use crate::domain::lifecycle::CloseState;
use crate::ports::backend::StorageBackend;
use async_trait::async_trait;
use das_types::{keccak256, ExpirationPolicy, Hash};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Terminal in-memory tier.
#[derive(Default)]
pub struct MemoryBackend {
    blobs: RwLock<HashMap<Hash, Vec<u8>>>,
    closed: CloseState,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_closed()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn put(&self, data: &[u8], _timeout: u64) -> Result<(), StorageError> {
        self.closed.ensure_open()?;
        self.blobs.write().insert(keccak256(data), data.to_vec());
        Ok(())
    }

    async fn get_by_hash(&self, hash: &Hash) -> Result<Vec<u8>, StorageError> {
        self.closed.ensure_open()?;
        self.blobs
            .read()
            .get(hash)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn sync(&self) -> Result<(), StorageError> {
        self.closed.ensure_open()
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        self.closed.ensure_open()
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.closed.close();
        Ok(())
    }

    fn expiration_policy(&self) -> ExpirationPolicy {
        ExpirationPolicy::KeepForever
    }
}

impl fmt::Display for MemoryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MemoryBackend")
    }
}

/// Wraps a backend and counts calls reaching it.
pub struct CountingBackend<B> {
    inner: B,
    puts: AtomicUsize,
    gets: AtomicUsize,
    syncs: AtomicUsize,
    closes: AtomicUsize,
}

impl<B: StorageBackend> CountingBackend<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            puts: AtomicUsize::new(0),
            gets: AtomicUsize::new(0),
            syncs: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
        }
    }

    /// The wrapped backend; calls made on it directly are not counted.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn syncs(&self) -> usize {
        self.syncs.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<B: StorageBackend> StorageBackend for CountingBackend<B> {
    async fn put(&self, data: &[u8], timeout: u64) -> Result<(), StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(data, timeout).await
    }

    async fn get_by_hash(&self, hash: &Hash) -> Result<Vec<u8>, StorageError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get_by_hash(hash).await
    }

    async fn sync(&self) -> Result<(), StorageError> {
        self.syncs.fetch_add(1, Ordering::SeqCst);
        self.inner.sync().await
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        self.inner.health_check().await
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.inner.close().await
    }

    fn expiration_policy(&self) -> ExpirationPolicy {
        self.inner.expiration_policy()
    }
}

impl<B: StorageBackend> fmt::Display for CountingBackend<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CountingBackend({})", self.inner)
    }
}

/// Which operations a [`FailingBackend`] refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Put,
    Sync,
    Everything,
}

/// A backend whose selected operations fail with `StorageError::Backend`.
pub struct FailingBackend {
    fail_on: FailOn,
    store: MemoryBackend,
}

impl FailingBackend {
    pub fn new(fail_on: FailOn) -> Self {
        Self {
            fail_on,
            store: MemoryBackend::new(),
        }
    }

    /// Blobs accepted before the failure point.
    pub fn stored(&self) -> usize {
        self.store.len()
    }

    fn failure(&self, op: &str) -> StorageError {
        StorageError::Backend {
            backend: "failing",
            message: format!("injected {} failure", op),
        }
    }
}

impl Default for FailingBackend {
    fn default() -> Self {
        Self::new(FailOn::Everything)
    }
}

#[async_trait]
impl StorageBackend for FailingBackend {
    async fn put(&self, data: &[u8], timeout: u64) -> Result<(), StorageError> {
        match self.fail_on {
            FailOn::Put | FailOn::Everything => Err(self.failure("put")),
            FailOn::Sync => self.store.put(data, timeout).await,
        }
    }

    async fn get_by_hash(&self, hash: &Hash) -> Result<Vec<u8>, StorageError> {
        match self.fail_on {
            FailOn::Everything => Err(self.failure("get")),
            _ => self.store.get_by_hash(hash).await,
        }
    }

    async fn sync(&self) -> Result<(), StorageError> {
        match self.fail_on {
            FailOn::Sync | FailOn::Everything => Err(self.failure("sync")),
            FailOn::Put => self.store.sync().await,
        }
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        match self.fail_on {
            FailOn::Everything => Err(self.failure("health check")),
            _ => Ok(()),
        }
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.store.close().await
    }

    fn expiration_policy(&self) -> ExpirationPolicy {
        ExpirationPolicy::KeepForever
    }
}

impl fmt::Display for FailingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FailingBackend({:?})", self.fail_on)
    }
}

/// A backend whose `sync` never completes. Puts are stored.
#[derive(Default)]
pub struct StallingSyncBackend {
    store: MemoryBackend,
    syncs_started: AtomicUsize,
}

impl StallingSyncBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(&self) -> usize {
        self.store.len()
    }

    pub fn syncs_started(&self) -> usize {
        self.syncs_started.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageBackend for StallingSyncBackend {
    async fn put(&self, data: &[u8], timeout: u64) -> Result<(), StorageError> {
        self.store.put(data, timeout).await
    }

    async fn get_by_hash(&self, hash: &Hash) -> Result<Vec<u8>, StorageError> {
        self.store.get_by_hash(hash).await
    }

    async fn sync(&self) -> Result<(), StorageError> {
        self.syncs_started.fetch_add(1, Ordering::SeqCst);
        std::future::pending::<()>().await;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        self.store.health_check().await
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.store.close().await
    }

    fn expiration_policy(&self) -> ExpirationPolicy {
        ExpirationPolicy::KeepForever
    }
}

impl fmt::Display for StallingSyncBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StallingSyncBackend")
    }
}
