//! # Domain Layer
//!
//! Pure cryptographic logic with no I/O dependencies.

pub mod bls;
pub mod ecdsa;
pub mod errors;
