//! # Domain Errors
//!
//! Error types for the storage subsystem.
//!
//! `NotFound` is an expected outcome and never the same condition as a
//! transport or backend failure. Cache tiers only swallow `NotFound` from their
//! own lookup; everything else propagates unchanged.

use crate::domain::config::StorageType;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by a storage backend or chain.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The hash is unknown to this tier (or the entry has expired)
    #[error("not found")]
    NotFound,

    /// Filesystem failure
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored bytes no longer hash to the key they are filed under
    #[error("corrupt entry {hash}: content does not match its hash")]
    Corruption { hash: String },

    /// The backend has been closed
    #[error("storage backend is closed")]
    Closed,

    /// A remote or embedded store reported a failure
    #[error("{backend} backend error: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound)
    }

    pub(crate) fn backend(backend: &'static str, err: impl std::fmt::Display) -> Self {
        StorageError::Backend {
            backend,
            message: err.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure reported by an object store or cache client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("request failed: {0}")]
    Request(String),
}

/// Errors while building a storage chain. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Storage service type not recognized: {0}")]
    UnknownStorageType(String),

    #[error("storage type '{0}' needs the `rocksdb` feature, which this build lacks")]
    FeatureDisabled(StorageType),

    #[error("storage type '{storage_type}' needs a {client} client")]
    MissingClient {
        storage_type: StorageType,
        client: &'static str,
    },

    #[error("storage type '{0}' needs a local data directory")]
    MissingDataDir(StorageType),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("failed to open storage: {0}")]
    Open(#[from] StorageError),
}
