//! # DAS Types Crate
//!
//! Value types shared by the Data Availability Service crates.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the canonical byte encodings of certificates and
//!   keysets live here and nowhere else. Signatures and keyset hashes are computed
//!   over these encodings, so every crate must agree on them.
//! - **Immutable Values**: a `Certificate` cannot be mutated once built; the only
//!   way to obtain one is to sign an `UnsignedCertificate`.
//! - **No Crypto Backends**: this crate only knows byte lengths. BLS and ECDSA
//!   live in `das-signing`.

pub mod certificate;
mod codec;
pub mod entities;
pub mod errors;
pub mod expiration;
pub mod keyset;

pub use certificate::{Certificate, UnsignedCertificate, CERTIFICATE_HEADER, SINGLE_SIGNER_MASK};
pub use entities::{
    hash_from_slice, keccak256, keccak256_concat, Address, BlsPublicKeyBytes, BlsSignatureBytes,
    Hash, BLS_PUBLIC_KEY_LEN, BLS_SIGNATURE_LEN,
};
pub use errors::EncodingError;
pub use expiration::ExpirationPolicy;
pub use keyset::{Keyset, MAX_KEYSET_KEYS};
