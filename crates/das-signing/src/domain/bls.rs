//! # BLS Signing (BLS12-381)
//!
//! Pure domain logic for the committee signature scheme.
//!
//! ## Implementation Details
//!
//! - Signatures are on G1 (48 bytes compressed)
//! - Public keys are on G2 (96 bytes compressed)
//!
//! This uses blst's `min_sig` variant for smaller signatures. Signing is
//! deterministic: the same key over the same payload always yields the same bytes.

use super::errors::SigningError;
use blst::min_sig::{AggregatePublicKey, PublicKey, SecretKey, Signature};
use blst::BLST_ERROR;
use das_types::{BlsPublicKeyBytes, BlsSignatureBytes, Certificate, Keyset};
use rand::RngCore;
use std::fmt;
use zeroize::Zeroizing;

/// Domain Separation Tag for G1 signatures with proof-of-possession.
const DST: &[u8] = b"BLS_SIG_BLS12381G1_XMD:SHA-256_SSWU_RO_POP_";

/// A BLS private key. Never printed.
#[derive(Clone)]
pub struct BlsPrivateKey(SecretKey);

/// A BLS public key.
#[derive(Clone)]
pub struct BlsPublicKey(PublicKey);

impl BlsPrivateKey {
    /// Decode a 32-byte big-endian scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SigningError> {
        SecretKey::from_bytes(bytes)
            .map(Self)
            .map_err(|_| SigningError::InvalidFormat {
                what: "BLS private key",
            })
    }

    /// Encode as a 32-byte scalar, wiped when dropped.
    pub fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.0.to_bytes())
    }

    pub fn public_key(&self) -> BlsPublicKey {
        BlsPublicKey(self.0.sk_to_pk())
    }

    /// Sign `message`.
    pub fn sign(&self, message: &[u8]) -> BlsSignatureBytes {
        self.0.sign(message, DST, &[]).to_bytes()
    }
}

impl fmt::Debug for BlsPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BlsPrivateKey(<redacted>)")
    }
}

impl BlsPublicKey {
    /// Decode and validate a compressed G2 point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SigningError> {
        let pk = PublicKey::key_validate(bytes).map_err(|_| SigningError::InvalidFormat {
            what: "BLS public key",
        })?;
        Ok(Self(pk))
    }

    pub fn to_bytes(&self) -> BlsPublicKeyBytes {
        self.0.to_bytes()
    }
}

impl PartialEq for BlsPublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for BlsPublicKey {}

impl fmt::Debug for BlsPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_bytes();
        write!(f, "BlsPublicKey({:02x?}...)", &bytes[..4])
    }
}

/// Generate a fresh key pair from OS randomness.
pub fn generate_keypair() -> Result<(BlsPublicKey, BlsPrivateKey), SigningError> {
    let mut ikm = Zeroizing::new([0u8; 32]);
    rand::rngs::OsRng.fill_bytes(&mut ikm[..]);
    let sk = SecretKey::key_gen(&ikm[..], &[])
        .map_err(|e| SigningError::Crypto(format!("BLS key generation failed: {:?}", e)))?;
    let private_key = BlsPrivateKey(sk);
    Ok((private_key.public_key(), private_key))
}

/// Verify a single BLS signature.
pub fn verify_signature(
    message: &[u8],
    signature: &BlsSignatureBytes,
    public_key: &BlsPublicKey,
) -> Result<(), SigningError> {
    let sig = Signature::from_bytes(signature).map_err(|_| SigningError::InvalidFormat {
        what: "BLS signature",
    })?;

    match sig.verify(true, message, DST, &[], &public_key.0, true) {
        BLST_ERROR::BLST_SUCCESS => Ok(()),
        _ => Err(SigningError::VerificationFailed),
    }
}

/// Verify a certificate against the keyset it names.
///
/// Members whose bit is set in the signers mask contributed to the aggregate
/// signature. The certificate is only acceptable if fewer than `assumed_honest`
/// members abstained, so at least one honest member signed.
pub fn verify_certificate(certificate: &Certificate, keyset: &Keyset) -> Result<(), SigningError> {
    let mut signers = Vec::new();
    let mut non_signers = 0u64;
    for (i, key) in keyset.public_keys().iter().enumerate() {
        if certificate.signers_mask() & (1u64 << i) != 0 {
            signers.push(BlsPublicKey::from_bytes(key)?.0);
        } else {
            non_signers += 1;
        }
    }

    if non_signers >= keyset.assumed_honest() || signers.is_empty() {
        return Err(SigningError::NotEnoughSigners {
            non_signers,
            assumed_honest: keyset.assumed_honest(),
        });
    }

    let refs: Vec<&PublicKey> = signers.iter().collect();
    let aggregate = AggregatePublicKey::aggregate(&refs, false)
        .map_err(|_| SigningError::VerificationFailed)?;

    verify_signature(
        &certificate.signable_fields(),
        certificate.signature(),
        &BlsPublicKey(aggregate.to_public_key()),
    )
}
