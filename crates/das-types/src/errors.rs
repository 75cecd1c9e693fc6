//! # Error Types
//!
//! Failures while decoding the canonical encodings defined in this crate.

use thiserror::Error;

/// Errors produced when parsing certificates, keysets or hashes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodingError {
    /// Input ended before the structure was complete.
    #[error("Truncated input: needed {needed} more bytes at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    /// Input had bytes left over after a complete structure.
    #[error("Trailing bytes after structure: {0}")]
    TrailingBytes(usize),

    /// Certificate header byte was not the expected flag.
    #[error("Invalid certificate header: 0x{0:02x}")]
    InvalidHeader(u8),

    /// Keyset declared more keys than allowed.
    #[error("Keyset has too many keys: {0}")]
    TooManyKeys(u64),

    /// Honesty assumption is zero or larger than the committee.
    #[error("Invalid assumed-honest count {assumed_honest} for {keys} keys")]
    InvalidAssumedHonest { assumed_honest: u64, keys: usize },

    /// Public key entry had the wrong length.
    #[error("Invalid public key length: {0}")]
    InvalidKeyLength(usize),

    /// A hash was not exactly 32 bytes.
    #[error("Invalid hash length: {0}")]
    InvalidHashLength(usize),
}
