//! # Data Availability Certificate
//!
//! A certificate attests that the blob hashing to `data_hash` stays retrievable
//! until `timeout`.
//!
//! ## Signed Payload
//!
//! The committee signs exactly `data_hash ‖ timeout (u64 BE) ‖ signers_mask (u64 BE)`.
//! The `keyset_hash` travels next to the signature but is not covered by it.
//!
//! ## Wire Encoding
//!
//! ```text
//! 0x80 ‖ keyset_hash (32) ‖ data_hash (32) ‖ timeout (8) ‖ signers_mask (8) ‖ signature (48)
//! ```

use crate::codec::ByteReader;
use crate::entities::{BlsSignatureBytes, Hash, BLS_SIGNATURE_LEN};
use crate::errors::EncodingError;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

/// Header byte marking a serialized certificate.
pub const CERTIFICATE_HEADER: u8 = 0x80;

/// Signers mask of a certificate produced by a single committee member (bit 0).
pub const SINGLE_SIGNER_MASK: u64 = 1;

const SIGNABLE_LEN: usize = 32 + 8 + 8;
const SERIALIZED_LEN: usize = 1 + 32 + SIGNABLE_LEN + BLS_SIGNATURE_LEN;

/// Certificate fields before a signature is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsignedCertificate {
    data_hash: Hash,
    timeout: u64,
    signers_mask: u64,
}

impl UnsignedCertificate {
    pub fn new(data_hash: Hash, timeout: u64, signers_mask: u64) -> Self {
        Self {
            data_hash,
            timeout,
            signers_mask,
        }
    }

    /// Canonical bytes covered by the committee signature.
    pub fn signable_fields(&self) -> Vec<u8> {
        signable_fields(&self.data_hash, self.timeout, self.signers_mask)
    }

    /// Attach the signature and keyset identifier, producing the final certificate.
    pub fn into_certificate(self, signature: BlsSignatureBytes, keyset_hash: Hash) -> Certificate {
        Certificate {
            keyset_hash,
            data_hash: self.data_hash,
            timeout: self.timeout,
            signers_mask: self.signers_mask,
            signature,
        }
    }

    pub fn data_hash(&self) -> &Hash {
        &self.data_hash
    }
}

/// A signed availability certificate.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    keyset_hash: Hash,
    data_hash: Hash,
    timeout: u64,
    signers_mask: u64,
    #[serde_as(as = "Bytes")]
    signature: BlsSignatureBytes,
}

impl Certificate {
    pub fn keyset_hash(&self) -> &Hash {
        &self.keyset_hash
    }

    pub fn data_hash(&self) -> &Hash {
        &self.data_hash
    }

    pub fn timeout(&self) -> u64 {
        self.timeout
    }

    pub fn signers_mask(&self) -> u64 {
        self.signers_mask
    }

    pub fn signature(&self) -> &BlsSignatureBytes {
        &self.signature
    }

    /// Canonical bytes covered by `signature`.
    pub fn signable_fields(&self) -> Vec<u8> {
        signable_fields(&self.data_hash, self.timeout, self.signers_mask)
    }

    /// Encode the certificate for transport.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(SERIALIZED_LEN);
        buf.push(CERTIFICATE_HEADER);
        buf.extend_from_slice(&self.keyset_hash);
        buf.extend_from_slice(&self.signable_fields());
        buf.extend_from_slice(&self.signature);
        buf
    }

    /// Decode a certificate produced by [`Certificate::serialize`].
    pub fn deserialize(bytes: &[u8]) -> Result<Self, EncodingError> {
        let mut reader = ByteReader::new(bytes);
        let header = reader.u8()?;
        if header != CERTIFICATE_HEADER {
            return Err(EncodingError::InvalidHeader(header));
        }
        let keyset_hash = reader.array()?;
        let data_hash = reader.array()?;
        let timeout = reader.u64_be()?;
        let signers_mask = reader.u64_be()?;
        let signature = reader.array()?;
        reader.finish()?;

        Ok(Self {
            keyset_hash,
            data_hash,
            timeout,
            signers_mask,
            signature,
        })
    }
}

fn signable_fields(data_hash: &Hash, timeout: u64, signers_mask: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(SIGNABLE_LEN);
    buf.extend_from_slice(data_hash);
    buf.extend_from_slice(&timeout.to_be_bytes());
    buf.extend_from_slice(&signers_mask.to_be_bytes());
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Certificate {
        UnsignedCertificate::new([0xAA; 32], 9_999_999_999, SINGLE_SIGNER_MASK)
            .into_certificate([0x11; 48], [0xBB; 32])
    }

    #[test]
    fn test_signable_fields_layout() {
        let cert = sample();
        let fields = cert.signable_fields();

        assert_eq!(fields.len(), 48);
        assert_eq!(&fields[..32], &[0xAA; 32]);
        assert_eq!(&fields[32..40], &9_999_999_999u64.to_be_bytes());
        assert_eq!(&fields[40..], &1u64.to_be_bytes());
    }

    #[test]
    fn test_keyset_hash_not_covered_by_signature() {
        let a = UnsignedCertificate::new([1; 32], 5, 1).into_certificate([0; 48], [2; 32]);
        let b = UnsignedCertificate::new([1; 32], 5, 1).into_certificate([0; 48], [3; 32]);
        assert_eq!(a.signable_fields(), b.signable_fields());
    }

    #[test]
    fn test_serialize_layout_and_parse() {
        let cert = sample();
        let bytes = cert.serialize();

        assert_eq!(bytes.len(), SERIALIZED_LEN);
        assert_eq!(bytes[0], CERTIFICATE_HEADER);
        assert_eq!(&bytes[1..33], &[0xBB; 32]);
        assert_eq!(Certificate::deserialize(&bytes).unwrap(), cert);
    }

    #[test]
    fn test_deserialize_rejects_bad_header() {
        let mut bytes = sample().serialize();
        bytes[0] = 0x00;
        assert_eq!(
            Certificate::deserialize(&bytes),
            Err(EncodingError::InvalidHeader(0x00))
        );
    }

    #[test]
    fn test_deserialize_rejects_truncated_and_trailing() {
        let bytes = sample().serialize();
        assert!(matches!(
            Certificate::deserialize(&bytes[..bytes.len() - 1]),
            Err(EncodingError::Truncated { .. })
        ));

        let mut longer = bytes.clone();
        longer.push(0);
        assert_eq!(
            Certificate::deserialize(&longer),
            Err(EncodingError::TrailingBytes(1))
        );
    }

    #[test]
    fn test_json_encoding() {
        let cert = sample();
        let json = serde_json::to_string(&cert).unwrap();
        let back: Certificate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cert);
    }
}
