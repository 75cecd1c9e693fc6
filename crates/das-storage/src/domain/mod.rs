//! # Domain Layer
//!
//! - `config`: storage chain selection and per-tier settings
//! - `errors`: `StorageError`, `ClientError`, `ConfigError`
//! - `lifecycle`: close state shared by all tiers

pub mod config;
pub mod errors;
pub mod lifecycle;

use das_types::{keccak256, Hash};

/// Seconds since the Unix epoch.
pub(crate) fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// True when `data` is the preimage of `hash`.
pub(crate) fn matches_hash(data: &[u8], hash: &Hash) -> bool {
    keccak256(data) == *hash
}
