//! # Core Entities
//!
//! Primitive identifiers used across the service and the content hash that
//! addresses every stored blob.

use crate::errors::EncodingError;
use sha3::{Digest, Keccak256};

/// A 32-byte Keccak-256 content hash.
pub type Hash = [u8; 32];

/// A 20-byte Ethereum-style address.
pub type Address = [u8; 20];

/// Compressed BLS12-381 G1 signature length.
pub const BLS_SIGNATURE_LEN: usize = 48;

/// Compressed BLS12-381 G2 public key length.
pub const BLS_PUBLIC_KEY_LEN: usize = 96;

/// Raw BLS signature bytes (G1 point, compressed).
pub type BlsSignatureBytes = [u8; BLS_SIGNATURE_LEN];

/// Raw BLS public key bytes (G2 point, compressed).
pub type BlsPublicKeyBytes = [u8; BLS_PUBLIC_KEY_LEN];

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> Hash {
    Keccak256::digest(data).into()
}

/// Keccak-256 over the concatenation of `parts`, without allocating the
/// concatenated buffer.
pub fn keccak256_concat(parts: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Convert a caller-supplied byte slice into a `Hash`.
///
/// Used at the service boundary where hashes arrive as untyped bytes.
pub fn hash_from_slice(bytes: &[u8]) -> Result<Hash, EncodingError> {
    bytes
        .try_into()
        .map_err(|_| EncodingError::InvalidHashLength(bytes.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256_empty_vector() {
        // Well-known Keccak-256 of the empty string.
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_keccak256_concat_matches_single_buffer() {
        let joined = keccak256(b"hello world");
        let parts = keccak256_concat(&[b"hello", b" ", b"world"]);
        assert_eq!(joined, parts);
    }

    #[test]
    fn test_hash_from_slice_rejects_wrong_length() {
        assert!(hash_from_slice(&[0u8; 32]).is_ok());
        assert_eq!(
            hash_from_slice(&[0u8; 31]),
            Err(EncodingError::InvalidHashLength(31))
        );
    }
}
