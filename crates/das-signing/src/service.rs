//! # Keyset Manager
//!
//! Owns the single signing identity of this process.
//!
//! ## Construction Order
//!
//! 1. Inline `priv_key` from configuration, if set
//! 2. Key pair files in `key_dir`; a lone file is an error, never regenerated
//! 3. A freshly generated pair, only if `allow_generate_keys` is set
//! 4. Otherwise construction fails: a node must never silently switch identity,
//!    or certificates issued before a restart become unverifiable
//!
//! The one-member keyset, its canonical bytes and its hash are derived once and
//! never change. The manager is immutable after construction and can be shared
//! across tasks behind an `Arc` without locking.

use crate::adapters::key_files::{
    decode_base64_private_key, generate_and_store_keys, read_keys_from_dir, KeyConfig,
};
use crate::domain::bls::{BlsPrivateKey, BlsPublicKey};
use crate::domain::errors::{KeyError, SigningError, UnknownKeyset};
use das_types::{BlsSignatureBytes, Hash, Keyset};
use std::fmt;
use tracing::info;

pub struct KeysetManager {
    private_key: BlsPrivateKey,
    public_key: BlsPublicKey,
    keyset: Keyset,
    keyset_bytes: Vec<u8>,
    keyset_hash: Hash,
}

impl KeysetManager {
    /// Build the manager around an already-loaded private key.
    pub fn new(private_key: BlsPrivateKey) -> Self {
        let public_key = private_key.public_key();
        let keyset = Keyset::single(public_key.to_bytes());
        let keyset_bytes = keyset.serialize();
        let keyset_hash = keyset.hash();

        Self {
            private_key,
            public_key,
            keyset,
            keyset_bytes,
            keyset_hash,
        }
    }

    /// Load or create the signing identity as described by `config`.
    pub fn from_config(config: &KeyConfig) -> Result<Self, KeyError> {
        let private_key = match config.priv_key.as_deref().filter(|k| !k.is_empty()) {
            Some(inline) => decode_base64_private_key(inline).map_err(KeyError::InvalidInlineKey)?,
            None => match read_keys_from_dir(&config.key_dir) {
                Ok((_, private_key)) => private_key,
                Err(KeyError::NotFound { dir }) if config.allow_generate_keys => {
                    generate_and_store_keys(&dir)?.1
                }
                Err(KeyError::NotFound { dir }) => return Err(KeyError::Missing { dir }),
                Err(e) => return Err(e),
            },
        };

        let manager = Self::new(private_key);
        info!(
            "[das-signing] Signing identity ready, keyset hash {:02x?}...",
            &manager.keyset_hash[..4]
        );
        Ok(manager)
    }

    /// Sign `payload` with the node's private key.
    ///
    /// The blst primitive cannot fail on a validated key; the `Result` keeps the
    /// signing seam uniform with the rest of the issuance pipeline.
    pub fn sign(&self, payload: &[u8]) -> Result<BlsSignatureBytes, SigningError> {
        Ok(self.private_key.sign(payload))
    }

    pub fn public_key(&self) -> &BlsPublicKey {
        &self.public_key
    }

    pub fn keyset(&self) -> &Keyset {
        &self.keyset
    }

    pub fn keyset_hash(&self) -> &Hash {
        &self.keyset_hash
    }

    /// Canonical serialization of the local keyset.
    pub fn keyset_bytes(&self) -> &[u8] {
        &self.keyset_bytes
    }

    /// Return the local keyset bytes if `hash` names the local keyset.
    ///
    /// Any other hash is unknown here; callers fall back to general storage,
    /// where peers' keysets may be kept as ordinary blobs.
    pub fn resolve_keyset(&self, hash: &[u8]) -> Result<&[u8], UnknownKeyset> {
        if hash == self.keyset_hash.as_slice() {
            Ok(&self.keyset_bytes)
        } else {
            let mut unknown = [0u8; 32];
            if hash.len() == 32 {
                unknown.copy_from_slice(hash);
            }
            Err(UnknownKeyset(unknown))
        }
    }
}

impl fmt::Debug for KeysetManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeysetManager")
            .field("public_key", &self.public_key)
            .field("keyset_hash", &format_args!("{:02x?}...", &self.keyset_hash[..4]))
            .finish_non_exhaustive()
    }
}
