//! # DAS Signing
//!
//! Cryptographic identity of a data availability committee member.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): BLS signing and verification, secp256k1 signer
//!   recovery for batch poster store requests. No I/O.
//! - **Adapters** (`adapters/`): reading and writing the BLS key pair in a key directory.
//! - **Service** (`service.rs`): `KeysetManager`, the process-wide signing identity.
//!
//! ## Security Notes
//!
//! - Private keys never appear in `Debug` output and are zeroized after encoding.
//! - High-S secp256k1 signatures are rejected (EIP-2).
//! - The keyset hash is computed once at construction and never changes.

pub mod adapters;
pub mod domain;
pub mod service;

pub use adapters::key_files::{
    decode_base64_private_key, generate_and_store_keys, read_keys_from_dir, KeyConfig,
    PRIVATE_KEY_FILENAME, PUBLIC_KEY_FILENAME,
};
pub use domain::bls::{
    generate_keypair, verify_certificate, verify_signature, BlsPrivateKey, BlsPublicKey,
};
pub use domain::ecdsa::{
    address_from_verifying_key, recover_store_signer, sign_store_request, store_request_hash,
    STORE_REQUEST_PREFIX, STORE_SIGNATURE_LEN,
};
pub use domain::errors::{KeyError, SigningError, UnknownKeyset};
pub use service::KeysetManager;
