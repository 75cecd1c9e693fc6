//! Node configuration from environment variables.

use das_signing::KeyConfig;
use das_storage::{StorageConfig, StorageType};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Value of `l1_node_url` that disables batch poster authorization.
pub const L1_DISABLED: &str = "none";

/// Top-level configuration of a data availability node.
#[derive(Debug, Clone)]
pub struct DataAvailabilityConfig {
    /// L1 JSON-RPC endpoint, or `"none"`
    pub l1_node_url: String,
    /// Sequencer inbox contract address; empty or `"none"` disables authorization
    pub sequencer_inbox_address: String,
    pub storage: StorageConfig,
    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,
    /// Interval between background health checks
    pub health_check_interval: Duration,
}

impl Default for DataAvailabilityConfig {
    fn default() -> Self {
        Self {
            l1_node_url: L1_DISABLED.to_string(),
            sequencer_inbox_address: String::new(),
            storage: StorageConfig::default(),
            log_level: "info".to_string(),
            health_check_interval: Duration::from_secs(30),
        }
    }
}

impl DataAvailabilityConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DAS_L1_NODE_URL`: L1 endpoint (default: none)
    /// - `DAS_SEQUENCER_INBOX_ADDRESS`: sequencer inbox contract (default: unset)
    /// - `DAS_STORAGE_TYPE`: files, db, s3, redis or bigCache (default: files)
    /// - `DAS_KEY_DIR`: BLS key pair directory
    /// - `DAS_PRIV_KEY`: inline base64 BLS private key
    /// - `DAS_DATA_DIR`: local data directory for files/db
    /// - `DAS_DISCARD_AFTER_TIMEOUT`: discard data after its timeout (default: false)
    /// - `DAS_ALLOW_GENERATE_KEYS`: generate a key pair if absent (default: false)
    /// - `DAS_S3_BUCKET`, `DAS_S3_OBJECT_PREFIX`, `DAS_S3_REGION`,
    ///   `DAS_S3_ACCESS_KEY`, `DAS_S3_SECRET_KEY`: object store settings
    /// - `DAS_REDIS_URL`, `DAS_REDIS_EXPIRATION_SECS`: distributed cache settings
    /// - `DAS_BIG_CACHE_CAPACITY`, `DAS_BIG_CACHE_EXPIRATION_SECS`: memory cache settings
    /// - `DAS_HEALTH_CHECK_INTERVAL_SECS`: background health check period (default: 30)
    /// - `DAS_LOG_LEVEL` or `RUST_LOG`: log level (default: info)
    pub fn from_env() -> Self {
        let mut config = Self::from_lookup(|name| env::var(name).ok());
        if let Ok(level) = env::var("DAS_LOG_LEVEL").or_else(|_| env::var("RUST_LOG")) {
            config.log_level = level;
        }
        config
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let storage = &mut config.storage;

        if let Some(url) = lookup("DAS_L1_NODE_URL") {
            config.l1_node_url = url;
        }
        if let Some(address) = lookup("DAS_SEQUENCER_INBOX_ADDRESS") {
            config.sequencer_inbox_address = address;
        }
        if let Some(storage_type) = lookup("DAS_STORAGE_TYPE") {
            storage.storage_type = storage_type;
        }
        if let Some(dir) = lookup("DAS_KEY_DIR") {
            storage.key_dir = PathBuf::from(dir);
        }
        storage.priv_key = lookup("DAS_PRIV_KEY").filter(|k| !k.is_empty());
        if let Some(dir) = lookup("DAS_DATA_DIR") {
            storage.local.data_dir = PathBuf::from(dir);
        }
        if let Some(flag) = lookup("DAS_DISCARD_AFTER_TIMEOUT") {
            storage.discard_after_timeout = parse_flag(&flag);
        }
        if let Some(flag) = lookup("DAS_ALLOW_GENERATE_KEYS") {
            storage.allow_generate_keys = parse_flag(&flag);
        }

        if let Some(bucket) = lookup("DAS_S3_BUCKET") {
            storage.object_store.bucket = bucket;
        }
        if let Some(prefix) = lookup("DAS_S3_OBJECT_PREFIX") {
            storage.object_store.object_prefix = prefix;
        }
        if let Some(region) = lookup("DAS_S3_REGION") {
            storage.object_store.region = region;
        }
        if let Some(key) = lookup("DAS_S3_ACCESS_KEY") {
            storage.object_store.access_key = key;
        }
        if let Some(secret) = lookup("DAS_S3_SECRET_KEY") {
            storage.object_store.secret_key = secret;
        }

        if let Some(url) = lookup("DAS_REDIS_URL") {
            storage.redis.url = url;
        }
        if let Some(secs) = lookup("DAS_REDIS_EXPIRATION_SECS").and_then(|v| v.parse().ok()) {
            storage.redis.expiration = Duration::from_secs(secs);
        }
        if let Some(capacity) = lookup("DAS_BIG_CACHE_CAPACITY").and_then(|v| v.parse().ok()) {
            storage.big_cache.capacity = capacity;
        }
        if let Some(secs) = lookup("DAS_BIG_CACHE_EXPIRATION_SECS").and_then(|v| v.parse().ok()) {
            storage.big_cache.expiration = Duration::from_secs(secs);
        }

        if let Some(secs) = lookup("DAS_HEALTH_CHECK_INTERVAL_SECS")
            .and_then(|v| v.parse().ok())
            .filter(|secs| *secs > 0)
        {
            config.health_check_interval = Duration::from_secs(secs);
        }

        config
    }

    /// Whether an L1 endpoint is configured at all.
    pub fn l1_enabled(&self) -> bool {
        !self.l1_node_url.is_empty() && self.l1_node_url != L1_DISABLED
    }

    /// Where the signing identity comes from.
    pub fn key_config(&self) -> KeyConfig {
        KeyConfig {
            priv_key: self.storage.priv_key.clone(),
            key_dir: self.storage.key_dir.clone(),
            allow_generate_keys: self.storage.allow_generate_keys,
        }
    }

    /// Whether the configured chain needs remote clients.
    pub fn needs_remote_clients(&self) -> bool {
        matches!(
            self.storage.storage_type(),
            Ok(StorageType::ObjectStore | StorageType::Redis | StorageType::BigCache)
        )
    }
}

fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}
