//! # Store Request Signatures (secp256k1)
//!
//! The batch poster signs each store request with its Ethereum key so the DAS
//! can check, against the sequencer inbox, that the request really came from an
//! authorized poster.
//!
//! ## Signed Digest
//!
//! ```text
//! keccak256(STORE_REQUEST_PREFIX ‖ timeout (u64 BE) ‖ message)
//! ```
//!
//! ## Security Notes
//!
//! - **Malleability Prevention (EIP-2)**: signatures with high S values are rejected
//! - Signatures are 65 bytes `r ‖ s ‖ v` with `v` in {0, 1, 27, 28}
//! - Uses k256 crate for cryptographic operations

use super::errors::SigningError;
use das_types::{keccak256, keccak256_concat, Address, Hash};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};

/// Domain separation prefix for store request digests.
pub const STORE_REQUEST_PREFIX: &[u8] = b"Data Availability Store Request:";

/// Length of a recoverable store request signature.
pub const STORE_SIGNATURE_LEN: usize = 65;

/// Digest the batch poster signs for a store request.
pub fn store_request_hash(message: &[u8], timeout: u64) -> Hash {
    keccak256_concat(&[STORE_REQUEST_PREFIX, &timeout.to_be_bytes(), message])
}

/// Recover the address that signed a store request.
pub fn recover_store_signer(
    message: &[u8],
    timeout: u64,
    signature: &[u8],
) -> Result<Address, SigningError> {
    if signature.len() != STORE_SIGNATURE_LEN {
        return Err(SigningError::InvalidFormat {
            what: "store request signature",
        });
    }

    let sig = Signature::from_slice(&signature[..64]).map_err(|_| SigningError::InvalidFormat {
        what: "store request signature",
    })?;

    // normalize_s() returns Some only when S is in the upper half
    if sig.normalize_s().is_some() {
        return Err(SigningError::MalleableSignature);
    }

    let recovery_id = parse_recovery_id(signature[64])?;
    let digest = store_request_hash(message, timeout);

    let recovered = VerifyingKey::recover_from_prehash(&digest, &sig, recovery_id)
        .map_err(|_| SigningError::RecoveryFailed)?;

    Ok(address_from_verifying_key(&recovered))
}

/// Sign a store request as a batch poster would.
///
/// Produces a low-S signature with `v` in {0, 1}.
pub fn sign_store_request(
    key: &SigningKey,
    message: &[u8],
    timeout: u64,
) -> Result<[u8; STORE_SIGNATURE_LEN], SigningError> {
    let digest = store_request_hash(message, timeout);
    let (mut sig, mut recovery_id) = key
        .sign_prehash_recoverable(&digest)
        .map_err(|e| SigningError::Crypto(format!("ECDSA signing failed: {}", e)))?;

    if let Some(normalized) = sig.normalize_s() {
        sig = normalized;
        recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
    }

    let mut out = [0u8; STORE_SIGNATURE_LEN];
    out[..64].copy_from_slice(&sig.to_bytes());
    out[64] = recovery_id.to_byte();
    Ok(out)
}

/// Derive the Ethereum address of a secp256k1 public key.
pub fn address_from_verifying_key(public_key: &VerifyingKey) -> Address {
    let pubkey_bytes = public_key.to_encoded_point(false);

    // Keccak256 hash of public key (without 0x04 prefix)
    let hash = keccak256(&pubkey_bytes.as_bytes()[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Parse recovery ID from v value.
///
/// Valid v values: 0, 1, 27, 28
fn parse_recovery_id(v: u8) -> Result<RecoveryId, SigningError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return Err(SigningError::InvalidRecoveryId(v)),
    };

    RecoveryId::try_from(id).map_err(|_| SigningError::InvalidRecoveryId(v))
}
