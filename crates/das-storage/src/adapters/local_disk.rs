//! # Local Disk Storage
//!
//! One file per blob, named by the lowercase hex of its hash.
//!
//! ## Durability
//!
//! - Writes land in a temp file that is fsynced and then renamed into place,
//!   so a reader never observes a partial blob.
//! - `sync` fsyncs the data directory so the renames themselves survive a crash.
//! - Reads re-hash the file; content that no longer matches its name is
//!   reported as `Corruption` rather than returned.
//! - A put over a file that no longer matches its name rewrites it.

use crate::domain::errors::StorageError;
use crate::domain::lifecycle::CloseState;
use crate::domain::matches_hash;
use crate::ports::backend::StorageBackend;
use async_trait::async_trait;
use das_types::{keccak256, ExpirationPolicy, Hash};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

pub struct LocalDiskStorage {
    data_dir: PathBuf,
    closed: CloseState,
    tmp_seq: AtomicU64,
}

impl LocalDiskStorage {
    /// Open (creating if needed) a data directory.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir).map_err(|e| StorageError::io(&data_dir, e))?;
        info!("[das-storage] 💾 Local disk storage at {}", data_dir.display());

        Ok(Self {
            data_dir,
            closed: CloseState::default(),
            tmp_seq: AtomicU64::new(0),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, hash: &Hash) -> PathBuf {
        self.data_dir.join(hex::encode(hash))
    }

    /// Write `data` to a temp file and rename it onto `path`. The temp file is
    /// removed on any failure.
    async fn install(&self, hash: &Hash, path: &Path, data: &[u8]) -> Result<(), StorageError> {
        let seq = self.tmp_seq.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .data_dir
            .join(format!(".{}.{}.tmp", hex::encode(hash), seq));

        if let Err(e) = Self::write_durably(&tmp, data).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StorageError::io(path, e));
        }
        Ok(())
    }

    async fn write_durably(path: &Path, data: &[u8]) -> Result<(), StorageError> {
        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(|e| StorageError::io(path, e))?;
        file.write_all(data)
            .await
            .map_err(|e| StorageError::io(path, e))?;
        file.sync_all().await.map_err(|e| StorageError::io(path, e))
    }
}

#[async_trait]
impl StorageBackend for LocalDiskStorage {
    async fn put(&self, data: &[u8], _timeout: u64) -> Result<(), StorageError> {
        self.closed.ensure_open()?;

        let hash = keccak256(data);
        let path = self.path_for(&hash);
        match tokio::fs::read(&path).await {
            Ok(existing) if matches_hash(&existing, &hash) => {
                debug!("[das-storage] Blob {} already on disk", hex::encode(hash));
                return Ok(());
            }
            Ok(_) => warn!(
                "[das-storage] Blob {} on disk does not match its hash, rewriting",
                hex::encode(hash)
            ),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(StorageError::io(&path, e)),
        }

        self.install(&hash, &path, data).await?;

        debug!(
            "[das-storage] Stored {} bytes as {}",
            data.len(),
            hex::encode(hash)
        );
        Ok(())
    }

    async fn get_by_hash(&self, hash: &Hash) -> Result<Vec<u8>, StorageError> {
        self.closed.ensure_open()?;

        let path = self.path_for(hash);
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StorageError::NotFound),
            Err(e) => return Err(StorageError::io(&path, e)),
        };

        if !matches_hash(&data, hash) {
            return Err(StorageError::Corruption {
                hash: hex::encode(hash),
            });
        }
        Ok(data)
    }

    async fn sync(&self) -> Result<(), StorageError> {
        self.closed.ensure_open()?;

        #[cfg(unix)]
        {
            let dir = tokio::fs::File::open(&self.data_dir)
                .await
                .map_err(|e| StorageError::io(&self.data_dir, e))?;
            dir.sync_all()
                .await
                .map_err(|e| StorageError::io(&self.data_dir, e))?;
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        self.closed.ensure_open()?;

        let meta = tokio::fs::metadata(&self.data_dir)
            .await
            .map_err(|e| StorageError::io(&self.data_dir, e))?;
        if !meta.is_dir() {
            return Err(StorageError::io(
                &self.data_dir,
                std::io::Error::new(ErrorKind::Other, "data dir is not a directory"),
            ));
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), StorageError> {
        if self.closed.close() {
            info!("[das-storage] Closed {}", self);
        }
        Ok(())
    }

    fn expiration_policy(&self) -> ExpirationPolicy {
        ExpirationPolicy::KeepForever
    }
}

impl fmt::Display for LocalDiskStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalDiskStorage({})", self.data_dir.display())
    }
}
