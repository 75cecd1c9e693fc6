//! # DAS Storage
//!
//! Content-addressed blob storage for the data availability service.
//!
//! Every backend implements the same small capability set
//! ([`StorageBackend`]): put bytes, fetch them back by their keccak256 hash,
//! flush, probe health and close. Tiers are chained by wrapping: a cache tier
//! holds a reference to the next tier and falls through to it on a miss.
//!
//! ## Chains
//!
//! | Storage type | Chain |
//! |--------------|-------|
//! | `files` (or empty) | local disk |
//! | `db` | RocksDB (feature `rocksdb`) |
//! | `s3` | object store |
//! | `redis` | distributed cache → object store |
//! | `bigCache` | memory LRU → distributed cache → object store |
//!
//! The chain is fixed when [`build_storage_backend`] returns and is never
//! rebuilt at runtime.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - errors, storage configuration, close state
//! - `ports/` - `StorageBackend` plus the object store and cache client ports
//! - `adapters/` - the backend tiers and in-memory clients
//! - `service/` - chain composition and the shutdown hook

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::cache::{InMemoryCacheClient, RedisStorage};
pub use adapters::local_disk::LocalDiskStorage;
pub use adapters::memory_cache::MemoryCacheStorage;
pub use adapters::object_store::{InMemoryObjectStore, ObjectStoreStorage};
#[cfg(feature = "rocksdb")]
pub use adapters::rocksdb::RocksDbStorage;
pub use domain::config::{
    BigCacheConfig, LocalConfig, ObjectStoreConfig, RedisConfig, StorageConfig, StorageType,
};
pub use domain::errors::{ClientError, ConfigError, StorageError};
pub use ports::backend::StorageBackend;
pub use ports::outbound::{CacheClient, ObjectStoreClient};
pub use service::composer::{build_storage_backend, BackendClients};
pub use service::shutdown::spawn_shutdown_hook;
