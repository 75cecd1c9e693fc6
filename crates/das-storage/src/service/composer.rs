//! # Storage Chain Composer
//!
//! Turns a [`StorageConfig`] into one [`StorageBackend`] by wrapping tiers:
//!
//! ```text
//! files    → LocalDiskStorage
//! db       → RocksDbStorage
//! s3       → ObjectStoreStorage
//! redis    → RedisStorage → ObjectStoreStorage
//! bigCache → MemoryCacheStorage → RedisStorage → ObjectStoreStorage
//! ```
//!
//! Every failure here is a configuration error surfaced at startup.

use crate::adapters::cache::RedisStorage;
use crate::adapters::local_disk::LocalDiskStorage;
use crate::adapters::memory_cache::MemoryCacheStorage;
use crate::adapters::object_store::ObjectStoreStorage;
use crate::domain::config::{StorageConfig, StorageType};
use crate::domain::errors::ConfigError;
use crate::ports::backend::StorageBackend;
use crate::ports::outbound::{CacheClient, ObjectStoreClient};
use std::sync::Arc;
use tracing::info;

/// Remote clients injected by the host for the `s3`, `redis` and `bigCache` chains.
#[derive(Clone, Default)]
pub struct BackendClients {
    pub object_store: Option<Arc<dyn ObjectStoreClient>>,
    pub cache: Option<Arc<dyn CacheClient>>,
}

/// Build the storage chain named by `config.storage_type`.
pub fn build_storage_backend(
    config: &StorageConfig,
    clients: &BackendClients,
) -> Result<Arc<dyn StorageBackend>, ConfigError> {
    let storage_type = config.storage_type()?;

    let backend: Arc<dyn StorageBackend> = match storage_type {
        StorageType::Files => Arc::new(LocalDiskStorage::open(local_data_dir(config, storage_type)?)?),
        StorageType::Db => open_database(config)?,
        StorageType::ObjectStore => object_store(config, clients, storage_type)?,
        StorageType::Redis => {
            let inner = object_store(config, clients, storage_type)?;
            redis(config, clients, storage_type, inner)?
        }
        StorageType::BigCache => {
            let inner = object_store(config, clients, storage_type)?;
            let inner = redis(config, clients, storage_type, inner)?;
            Arc::new(MemoryCacheStorage::new(&config.big_cache, inner)?)
        }
    };

    info!(
        "[das-storage] Storage chain '{}' ready: {} ({})",
        storage_type,
        backend,
        backend.expiration_policy()
    );
    Ok(backend)
}

fn local_data_dir(
    config: &StorageConfig,
    storage_type: StorageType,
) -> Result<&std::path::Path, ConfigError> {
    if config.local.data_dir.as_os_str().is_empty() {
        return Err(ConfigError::MissingDataDir(storage_type));
    }
    Ok(&config.local.data_dir)
}

#[cfg(feature = "rocksdb")]
fn open_database(config: &StorageConfig) -> Result<Arc<dyn StorageBackend>, ConfigError> {
    let dir = local_data_dir(config, StorageType::Db)?;
    Ok(Arc::new(crate::adapters::rocksdb::RocksDbStorage::open(
        dir,
        config.discard_after_timeout,
    )?))
}

#[cfg(not(feature = "rocksdb"))]
fn open_database(_config: &StorageConfig) -> Result<Arc<dyn StorageBackend>, ConfigError> {
    Err(ConfigError::FeatureDisabled(StorageType::Db))
}

fn object_store(
    config: &StorageConfig,
    clients: &BackendClients,
    storage_type: StorageType,
) -> Result<Arc<dyn StorageBackend>, ConfigError> {
    let client = clients
        .object_store
        .clone()
        .ok_or(ConfigError::MissingClient {
            storage_type,
            client: "object store",
        })?;
    Ok(Arc::new(ObjectStoreStorage::new(
        client,
        &config.object_store,
        config.discard_after_timeout,
    )))
}

fn redis(
    config: &StorageConfig,
    clients: &BackendClients,
    storage_type: StorageType,
    inner: Arc<dyn StorageBackend>,
) -> Result<Arc<dyn StorageBackend>, ConfigError> {
    let client = clients.cache.clone().ok_or(ConfigError::MissingClient {
        storage_type,
        client: "cache",
    })?;
    if config.redis.expiration.is_zero() {
        return Err(ConfigError::ZeroValue("redis expiration"));
    }
    Ok(Arc::new(RedisStorage::new(client, &config.redis, inner)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::InMemoryCacheClient;
    use crate::adapters::object_store::InMemoryObjectStore;
    use crate::domain::config::{LocalConfig, ObjectStoreConfig};
    use das_types::{keccak256, ExpirationPolicy};

    fn remote_clients() -> BackendClients {
        BackendClients {
            object_store: Some(Arc::new(InMemoryObjectStore::with_bucket("das"))),
            cache: Some(Arc::new(InMemoryCacheClient::new())),
        }
    }

    fn config(storage_type: &str, data_dir: &std::path::Path) -> StorageConfig {
        StorageConfig {
            storage_type: storage_type.into(),
            local: LocalConfig {
                data_dir: data_dir.to_path_buf(),
            },
            object_store: ObjectStoreConfig {
                bucket: "das".into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    async fn assert_round_trip(backend: &dyn StorageBackend) {
        backend.put(b"composed", 9_999_999_999).await.unwrap();
        backend.sync().await.unwrap();
        assert_eq!(
            backend.get_by_hash(&keccak256(b"composed")).await.unwrap(),
            b"composed"
        );
        assert!(backend
            .get_by_hash(&[0xEE; 32])
            .await
            .unwrap_err()
            .is_not_found());
        backend.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn test_every_chain_round_trips_and_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut names = vec!["", "files", "s3", "redis", "bigCache"];
        if cfg!(feature = "rocksdb") {
            names.push("db");
        }

        for name in names {
            let data_dir = dir.path().join(if name.is_empty() { "default" } else { name });
            let backend = build_storage_backend(&config(name, &data_dir), &remote_clients())
                .unwrap_or_else(|e| panic!("chain '{}' failed: {}", name, e));
            assert_round_trip(backend.as_ref()).await;
        }
    }

    #[test]
    fn test_chain_shapes() {
        let dir = tempfile::tempdir().unwrap();
        let describe = |name: &str| {
            build_storage_backend(&config(name, dir.path()), &remote_clients())
                .unwrap()
                .to_string()
        };

        assert!(describe("files").starts_with("LocalDiskStorage("));
        assert_eq!(describe("s3"), "ObjectStoreStorage(das)");
        assert_eq!(describe("redis"), "RedisStorage(ObjectStoreStorage(das))");
        assert_eq!(
            describe("bigCache"),
            "MemoryCacheStorage(RedisStorage(ObjectStoreStorage(das)))"
        );
    }

    #[test]
    fn test_unknown_type_rejected_at_construction() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            build_storage_backend(&config("floppy", dir.path()), &remote_clients()),
            Err(ConfigError::UnknownStorageType(_))
        ));
    }

    #[test]
    fn test_remote_chain_without_client_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let only_object_store = BackendClients {
            cache: None,
            ..remote_clients()
        };

        assert!(matches!(
            build_storage_backend(&config("s3", dir.path()), &BackendClients::default()),
            Err(ConfigError::MissingClient { client: "object store", .. })
        ));
        assert!(matches!(
            build_storage_backend(&config("bigCache", dir.path()), &only_object_store),
            Err(ConfigError::MissingClient { client: "cache", .. })
        ));
    }

    #[test]
    fn test_files_without_data_dir_rejected() {
        let config = StorageConfig::default();
        assert!(matches!(
            build_storage_backend(&config, &BackendClients::default()),
            Err(ConfigError::MissingDataDir(StorageType::Files))
        ));
    }

    #[cfg(not(feature = "rocksdb"))]
    #[test]
    fn test_db_without_feature_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            build_storage_backend(&config("db", dir.path()), &BackendClients::default()),
            Err(ConfigError::FeatureDisabled(StorageType::Db))
        ));
    }

    #[test]
    fn test_discard_flag_reaches_terminal_tier() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config("bigCache", dir.path());
        cfg.discard_after_timeout = true;

        let backend = build_storage_backend(&cfg, &remote_clients()).unwrap();
        assert_eq!(
            backend.expiration_policy(),
            ExpirationPolicy::DiscardAfterDataTimeout
        );
    }
}
