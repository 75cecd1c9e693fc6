//! # Adapters
//!
//! - `key_files`: BLS key pair persistence in a key directory

pub mod key_files;
