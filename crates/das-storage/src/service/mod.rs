//! # Service Layer
//!
//! - `composer`: builds the configured storage chain
//! - `shutdown`: closes the chain when the process shuts down

pub mod composer;
pub mod shutdown;
