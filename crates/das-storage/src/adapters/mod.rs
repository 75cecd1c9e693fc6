//! # Adapters
//!
//! - `local_disk`: one file per blob (`files`)
//! - `rocksdb`: embedded database (`db`, feature `rocksdb`)
//! - `object_store`: remote object store (`s3`) and an in-memory client
//! - `cache`: write-through distributed cache (`redis`) and an in-memory client
//! - `memory_cache`: in-process LRU (`bigCache`)

pub mod cache;
pub mod local_disk;
pub mod memory_cache;
pub mod object_store;
#[cfg(feature = "rocksdb")]
pub mod rocksdb;
