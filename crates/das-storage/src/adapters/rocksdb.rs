//! # RocksDB Storage
//!
//! Embedded key-value backend for the `db` storage type.
//!
//! ## Value Layout
//!
//! ```text
//! expiry (u64 BE, u64::MAX = never) ‖ blob bytes
//! ```
//!
//! With `discard_after_timeout` the expiry is the caller's put timeout, so a
//! zero timeout is already expired. An expired entry reads as `NotFound` and is
//! deleted on that read.

use crate::domain::errors::StorageError;
use crate::domain::lifecycle::CloseState;
use crate::domain::{matches_hash, unix_now};
use crate::ports::backend::StorageBackend;
use async_trait::async_trait;
use das_types::{keccak256, ExpirationPolicy, Hash};
use rocksdb::{Options, DB};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const EXPIRY_LEN: usize = 8;
const NEVER_EXPIRES: u64 = u64::MAX;

pub struct RocksDbStorage {
    db: DB,
    path: PathBuf,
    policy: ExpirationPolicy,
    closed: CloseState,
}

impl RocksDbStorage {
    /// Open or create the database under `path`.
    pub fn open(path: impl AsRef<Path>, discard_after_timeout: bool) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        opts.set_block_based_table_factory(&block_opts);

        let db = DB::open(&opts, &path)
            .map_err(|e| StorageError::backend("rocksdb", format!("failed to open: {}", e)))?;

        let policy = ExpirationPolicy::from_discard_flag(discard_after_timeout);
        info!(
            "[das-storage] 💾 RocksDB storage at {} ({})",
            path.display(),
            policy
        );

        Ok(Self {
            db,
            path,
            policy,
            closed: CloseState::default(),
        })
    }

    fn encode_value(expiry: u64, data: &[u8]) -> Vec<u8> {
        let mut value = Vec::with_capacity(EXPIRY_LEN + data.len());
        value.extend_from_slice(&expiry.to_be_bytes());
        value.extend_from_slice(data);
        value
    }

    fn decode_value(hash: &Hash, value: &[u8]) -> Result<(u64, Vec<u8>), StorageError> {
        if value.len() < EXPIRY_LEN {
            return Err(StorageError::Corruption {
                hash: hex::encode(hash),
            });
        }
        let (expiry, data) = value.split_at(EXPIRY_LEN);
        let mut expiry_bytes = [0u8; EXPIRY_LEN];
        expiry_bytes.copy_from_slice(expiry);
        Ok((u64::from_be_bytes(expiry_bytes), data.to_vec()))
    }
}

#[async_trait]
impl StorageBackend for RocksDbStorage {
    async fn put(&self, data: &[u8], timeout: u64) -> Result<(), StorageError> {
        self.closed.ensure_open()?;

        let hash = keccak256(data);
        let expiry = self.policy.expiry_for(timeout).unwrap_or(NEVER_EXPIRES);
        self.db
            .put(hash, Self::encode_value(expiry, data))
            .map_err(|e| StorageError::backend("rocksdb", e))?;

        debug!(
            "[das-storage] Stored {} bytes as {} (expiry {})",
            data.len(),
            hex::encode(hash),
            expiry
        );
        Ok(())
    }

    async fn get_by_hash(&self, hash: &Hash) -> Result<Vec<u8>, StorageError> {
        self.closed.ensure_open()?;

        let value = self
            .db
            .get(hash)
            .map_err(|e| StorageError::backend("rocksdb", e))?
            .ok_or(StorageError::NotFound)?;
        let (expiry, data) = Self::decode_value(hash, &value)?;

        if expiry != NEVER_EXPIRES && expiry <= unix_now() {
            self.db
                .delete(hash)
                .map_err(|e| StorageError::backend("rocksdb", e))?;
            debug!("[das-storage] Discarded expired {}", hex::encode(hash));
            return Err(StorageError::NotFound);
        }

        if !matches_hash(&data, hash) {
            return Err(StorageError::Corruption {
                hash: hex::encode(hash),
            });
        }
        Ok(data)
    }

    async fn sync(&self) -> Result<(), StorageError> {
        self.closed.ensure_open()?;
        self.db
            .flush_wal(true)
            .map_err(|e| StorageError::backend("rocksdb", e))
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        self.closed.ensure_open()?;
        self.db
            .get([0u8; 1])
            .map(|_| ())
            .map_err(|e| StorageError::backend("rocksdb", e))
    }

    async fn close(&self) -> Result<(), StorageError> {
        if !self.closed.close() {
            return Ok(());
        }
        self.db
            .flush()
            .map_err(|e| StorageError::backend("rocksdb", e))?;
        info!("[das-storage] Closed {}", self);
        Ok(())
    }

    fn expiration_policy(&self) -> ExpirationPolicy {
        self.policy
    }
}

impl fmt::Display for RocksDbStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RocksDbStorage({})", self.path.display())
    }
}
