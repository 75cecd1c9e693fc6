//! # Ports
//!
//! - `backend`: the `StorageBackend` capability (driving side of every tier)
//! - `outbound`: object store and cache clients the remote tiers depend on

pub mod backend;
pub mod outbound;
