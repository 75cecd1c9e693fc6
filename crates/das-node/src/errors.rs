//! # Service Errors
//!
//! | Variant | Meaning | Retried |
//! |---------|---------|---------|
//! | `Configuration` | bad selector, missing keys, bad address | never, fatal at startup |
//! | `Unauthorized` | signer recovery failed or not a batch poster | never |
//! | `Storage` | backend put/sync/get failure | caller's decision |
//! | `NotFound` | hash unknown to the backend | expected outcome |
//! | `UnknownKeyset` | keyset hash unknown locally and in storage | expected outcome |
//! | `Signing` | corrupted key or crypto library fault | never |

use crate::ports::LedgerError;
use das_signing::{KeyError, SigningError, UnknownKeyset};
use das_storage::{ConfigError, StorageError};
use das_types::Address;
use thiserror::Error;

/// Why a store request was refused.
#[derive(Debug, Error)]
pub enum Unauthorized {
    #[error("signer recovery failed: {0}")]
    Recovery(#[source] SigningError),

    #[error("0x{} is not a batch poster", hex::encode(.0))]
    NotBatchPoster(Address),

    #[error("batch poster check failed: {0}")]
    Ledger(#[source] LedgerError),
}

#[derive(Debug, Error)]
pub enum DasError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("store request not properly signed: {0}")]
    Unauthorized(#[from] Unauthorized),

    /// Backend failure other than not-found
    #[error("storage error: {0}")]
    Storage(#[source] StorageError),

    #[error("not found")]
    NotFound,

    #[error(transparent)]
    UnknownKeyset(#[from] UnknownKeyset),

    #[error("signing error: {0}")]
    Signing(#[from] SigningError),
}

impl DasError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DasError::NotFound | DasError::UnknownKeyset(_))
    }
}

impl From<StorageError> for DasError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => DasError::NotFound,
            other => DasError::Storage(other),
        }
    }
}

impl From<ConfigError> for DasError {
    fn from(err: ConfigError) -> Self {
        DasError::Configuration(err.to_string())
    }
}

impl From<KeyError> for DasError {
    fn from(err: KeyError) -> Self {
        DasError::Configuration(err.to_string())
    }
}
