//! # Signing Errors
//!
//! Error types for key handling, signing and signer recovery.

use das_types::Hash;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from signing, verification and signer recovery.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SigningError {
    /// Key or signature bytes could not be decoded
    #[error("Invalid {what} encoding")]
    InvalidFormat { what: &'static str },

    /// BLS signature did not verify
    #[error("BLS signature verification failed")]
    VerificationFailed,

    /// Certificate signers mask selects too few committee members
    #[error("Not enough signers: {non_signers} non-signers with assumed honest {assumed_honest}")]
    NotEnoughSigners {
        non_signers: u64,
        assumed_honest: u64,
    },

    /// Signature has high S value (EIP-2 malleability protection)
    #[error("Malleable signature (high S value)")]
    MalleableSignature,

    /// Invalid recovery ID (v must be 0, 1, 27, or 28)
    #[error("Invalid recovery ID: {0}")]
    InvalidRecoveryId(u8),

    /// Failed to recover public key from signature
    #[error("Failed to recover public key")]
    RecoveryFailed,

    /// Key generation or signing primitive failed
    #[error("Cryptographic failure: {0}")]
    Crypto(String),
}

/// Errors while loading or creating the node's key pair.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The key pair files do not exist in the key directory
    #[error("BLS key pair not found in {dir}")]
    NotFound { dir: PathBuf },

    /// Only one of the two key files exists
    #[error("BLS key pair in {dir} is incomplete: {missing} is missing")]
    Incomplete { dir: PathBuf, missing: &'static str },

    /// No key material and self-generation is not permitted
    #[error("Required BLS keypair did not exist at {dir} and key generation is disabled")]
    Missing { dir: PathBuf },

    /// The inline `priv-key` value could not be decoded
    #[error("'priv-key' was invalid: {0}")]
    InvalidInlineKey(SigningError),

    /// A key file held bytes that are not a valid key
    #[error("Invalid key file {path}: {source}")]
    InvalidKeyFile {
        path: PathBuf,
        #[source]
        source: SigningError,
    },

    /// Public key file does not match the private key
    #[error("Public key in {dir} does not match the private key")]
    MismatchedPublicKey { dir: PathBuf },

    /// Filesystem failure
    #[error("Key file I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Signing primitive failure during generation
    #[error(transparent)]
    Signing(#[from] SigningError),
}

/// A keyset hash that is not this node's own keyset.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("no such keyset")]
pub struct UnknownKeyset(pub Hash);

