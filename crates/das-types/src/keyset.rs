//! # Committee Keyset
//!
//! The public keys and honesty assumption needed to verify certificates.
//!
//! ## Canonical Serialization
//!
//! ```text
//! assumed_honest (u64 BE) ‖ num_keys (u64 BE) ‖ { key_len (u16 BE) ‖ key }*
//! ```
//!
//! The keyset hash is Keccak-256 of this serialization. It is the identifier
//! embedded in every certificate, so the encoding must never change.

use crate::codec::ByteReader;
use crate::entities::{keccak256, BlsPublicKeyBytes, Hash, BLS_PUBLIC_KEY_LEN};
use crate::errors::EncodingError;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

/// Upper bound on committee size (one bit per member in the signers mask).
pub const MAX_KEYSET_KEYS: u64 = 64;

/// A committee keyset.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyset {
    assumed_honest: u64,
    #[serde_as(as = "Vec<Bytes>")]
    public_keys: Vec<BlsPublicKeyBytes>,
}

impl Keyset {
    /// Build a keyset, validating the honesty assumption against the committee size.
    pub fn new(
        assumed_honest: u64,
        public_keys: Vec<BlsPublicKeyBytes>,
    ) -> Result<Self, EncodingError> {
        if public_keys.len() as u64 > MAX_KEYSET_KEYS {
            return Err(EncodingError::TooManyKeys(public_keys.len() as u64));
        }
        if assumed_honest == 0 || assumed_honest > public_keys.len() as u64 {
            return Err(EncodingError::InvalidAssumedHonest {
                assumed_honest,
                keys: public_keys.len(),
            });
        }
        Ok(Self {
            assumed_honest,
            public_keys,
        })
    }

    /// The one-member keyset of a standalone node.
    pub fn single(public_key: BlsPublicKeyBytes) -> Self {
        Self {
            assumed_honest: 1,
            public_keys: vec![public_key],
        }
    }

    pub fn assumed_honest(&self) -> u64 {
        self.assumed_honest
    }

    pub fn public_keys(&self) -> &[BlsPublicKeyBytes] {
        &self.public_keys
    }

    /// Canonical serialization.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(16 + self.public_keys.len() * (2 + BLS_PUBLIC_KEY_LEN));
        buf.extend_from_slice(&self.assumed_honest.to_be_bytes());
        buf.extend_from_slice(&(self.public_keys.len() as u64).to_be_bytes());
        for key in &self.public_keys {
            buf.extend_from_slice(&(key.len() as u16).to_be_bytes());
            buf.extend_from_slice(key);
        }
        buf
    }

    /// Parse a canonical serialization.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, EncodingError> {
        let mut reader = ByteReader::new(bytes);
        let assumed_honest = reader.u64_be()?;
        let num_keys = reader.u64_be()?;
        if num_keys > MAX_KEYSET_KEYS {
            return Err(EncodingError::TooManyKeys(num_keys));
        }

        let mut public_keys = Vec::with_capacity(num_keys as usize);
        for _ in 0..num_keys {
            let len = reader.u16_be()? as usize;
            if len != BLS_PUBLIC_KEY_LEN {
                return Err(EncodingError::InvalidKeyLength(len));
            }
            public_keys.push(reader.array()?);
        }
        reader.finish()?;

        Self::new(assumed_honest, public_keys)
    }

    /// Keccak-256 of the canonical serialization.
    pub fn hash(&self) -> Hash {
        keccak256(&self.serialize())
    }
}
