//! # Storage Configuration
//!
//! Plain value structs. Loading them from the environment is the node's job.

use crate::domain::errors::ConfigError;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default lifetime of distributed cache entries.
pub const DEFAULT_REDIS_EXPIRATION: Duration = Duration::from_secs(60 * 60);
/// Default number of entries held by the memory cache.
pub const DEFAULT_BIG_CACHE_CAPACITY: usize = 1024;
/// Default lifetime of memory cache entries.
pub const DEFAULT_BIG_CACHE_EXPIRATION: Duration = Duration::from_secs(60 * 60);

/// Closed set of storage chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageType {
    /// One file per blob in the local data directory
    Files,
    /// Embedded RocksDB in the local data directory
    Db,
    /// Remote object store
    ObjectStore,
    /// Distributed cache over the object store
    Redis,
    /// Memory cache over the distributed cache over the object store
    BigCache,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Files => "files",
            StorageType::Db => "db",
            StorageType::ObjectStore => "s3",
            StorageType::Redis => "redis",
            StorageType::BigCache => "bigCache",
        }
    }
}

impl FromStr for StorageType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "files" => Ok(StorageType::Files),
            "db" => Ok(StorageType::Db),
            "s3" => Ok(StorageType::ObjectStore),
            "redis" => Ok(StorageType::Redis),
            "bigCache" => Ok(StorageType::BigCache),
            other => Err(ConfigError::UnknownStorageType(other.to_string())),
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct LocalConfig {
    /// Directory for the `files` and `db` backends
    pub data_dir: PathBuf,
}

/// Remote object store location and credentials.
#[derive(Clone, Default)]
pub struct ObjectStoreConfig {
    pub bucket: String,
    pub object_prefix: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
}

impl fmt::Debug for ObjectStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStoreConfig")
            .field("bucket", &self.bucket)
            .field("object_prefix", &self.object_prefix)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    /// Lifetime of cached entries
    pub expiration: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            expiration: DEFAULT_REDIS_EXPIRATION,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BigCacheConfig {
    /// Maximum number of cached blobs
    pub capacity: usize,
    /// Lifetime of cached entries
    pub expiration: Duration,
}

impl Default for BigCacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_BIG_CACHE_CAPACITY,
            expiration: DEFAULT_BIG_CACHE_EXPIRATION,
        }
    }
}

/// Everything needed to build the storage chain and load the signing key.
#[derive(Clone)]
pub struct StorageConfig {
    /// Directory holding the BLS key pair
    pub key_dir: PathBuf,
    /// Inline base64 BLS private key; wins over `key_dir`
    pub priv_key: Option<String>,
    pub local: LocalConfig,
    /// Discard data after its per-put timeout
    pub discard_after_timeout: bool,
    pub object_store: ObjectStoreConfig,
    pub redis: RedisConfig,
    pub big_cache: BigCacheConfig,
    /// Generate a key pair in `key_dir` if none exists
    pub allow_generate_keys: bool,
    /// One of `files`, `db`, `s3`, `redis`, `bigCache`; empty means `files`
    pub storage_type: String,
}

impl StorageConfig {
    /// Parse the configured storage type.
    pub fn storage_type(&self) -> Result<StorageType, ConfigError> {
        self.storage_type.parse()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key_dir: PathBuf::new(),
            priv_key: None,
            local: LocalConfig::default(),
            discard_after_timeout: false,
            object_store: ObjectStoreConfig::default(),
            redis: RedisConfig::default(),
            big_cache: BigCacheConfig::default(),
            allow_generate_keys: false,
            storage_type: StorageType::Files.as_str().to_string(),
        }
    }
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("key_dir", &self.key_dir)
            .field("priv_key", &self.priv_key.as_ref().map(|_| "<redacted>"))
            .field("local", &self.local)
            .field("discard_after_timeout", &self.discard_after_timeout)
            .field("object_store", &self.object_store)
            .field("redis", &self.redis)
            .field("big_cache", &self.big_cache)
            .field("allow_generate_keys", &self.allow_generate_keys)
            .field("storage_type", &self.storage_type)
            .finish()
    }
}
