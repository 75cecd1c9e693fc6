//! # Storage Backend Port
//!
//! The capability set every tier and every composed chain satisfies.

use crate::domain::errors::StorageError;
use async_trait::async_trait;
use das_types::{ExpirationPolicy, Hash};
use std::fmt;

/// A content-addressed blob store.
///
/// Implementations must be safe for concurrent use from many tasks; each tier
/// guards its own state. Dropping a returned future cancels the operation.
#[async_trait]
pub trait StorageBackend: Send + Sync + fmt::Display {
    /// Persist `data` under `keccak256(data)`.
    ///
    /// `timeout` is the caller's retention deadline (seconds since epoch). It is
    /// only honoured by tiers whose expiration policy discards after the data
    /// timeout. The data is only guaranteed durable once [`sync`](Self::sync)
    /// returns.
    async fn put(&self, data: &[u8], timeout: u64) -> Result<(), StorageError>;

    /// Fetch the blob whose hash is `hash`, or `StorageError::NotFound`.
    async fn get_by_hash(&self, hash: &Hash) -> Result<Vec<u8>, StorageError>;

    /// Block until every prior `put` is durably flushed.
    async fn sync(&self) -> Result<(), StorageError>;

    /// Cheap liveness probe.
    async fn health_check(&self) -> Result<(), StorageError>;

    /// Shut down. Idempotent; every later call fails with `StorageError::Closed`.
    async fn close(&self) -> Result<(), StorageError>;

    fn expiration_policy(&self) -> ExpirationPolicy;
}
