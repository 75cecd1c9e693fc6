//! # BLS Key Files
//!
//! The key directory holds two files of base64 text:
//!
//! - `das_bls.pub`: compressed public key (96 bytes)
//! - `das_bls`: private key scalar (32 bytes), owner-readable only on Unix

use crate::domain::bls::{generate_keypair, BlsPrivateKey, BlsPublicKey};
use crate::domain::errors::{KeyError, SigningError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use zeroize::Zeroizing;

pub const PUBLIC_KEY_FILENAME: &str = "das_bls.pub";
pub const PRIVATE_KEY_FILENAME: &str = "das_bls";

/// Where the node's signing identity comes from.
#[derive(Clone, Default)]
pub struct KeyConfig {
    /// Base64 private key given inline. Takes precedence over `key_dir`.
    pub priv_key: Option<String>,
    /// Directory holding the key pair files.
    pub key_dir: PathBuf,
    /// Generate and store a key pair in `key_dir` if none exists.
    pub allow_generate_keys: bool,
}

impl fmt::Debug for KeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyConfig")
            .field("priv_key", &self.priv_key.as_ref().map(|_| "<redacted>"))
            .field("key_dir", &self.key_dir)
            .field("allow_generate_keys", &self.allow_generate_keys)
            .finish()
    }
}

/// Decode an inline base64 private key.
pub fn decode_base64_private_key(text: &str) -> Result<BlsPrivateKey, SigningError> {
    let bytes = Zeroizing::new(STANDARD.decode(text.trim()).map_err(|_| {
        SigningError::InvalidFormat {
            what: "base64 private key",
        }
    })?);
    BlsPrivateKey::from_bytes(&bytes)
}

/// Read the key pair from `dir`.
///
/// Returns `KeyError::NotFound` only when both files are missing, so the
/// caller can decide whether to generate a new pair. A lone file is
/// `KeyError::Incomplete` and never a reason to generate.
pub fn read_keys_from_dir(dir: &Path) -> Result<(BlsPublicKey, BlsPrivateKey), KeyError> {
    let pub_path = dir.join(PUBLIC_KEY_FILENAME);
    let priv_path = dir.join(PRIVATE_KEY_FILENAME);

    let pub_text = read_key_file(&pub_path)?;
    let priv_text = read_key_file(&priv_path)?.map(Zeroizing::new);

    let (pub_text, priv_text) = match (pub_text, priv_text) {
        (Some(pub_text), Some(priv_text)) => (pub_text, priv_text),
        (None, None) => {
            return Err(KeyError::NotFound {
                dir: dir.to_path_buf(),
            })
        }
        (Some(_), None) => {
            return Err(KeyError::Incomplete {
                dir: dir.to_path_buf(),
                missing: PRIVATE_KEY_FILENAME,
            })
        }
        (None, Some(_)) => {
            return Err(KeyError::Incomplete {
                dir: dir.to_path_buf(),
                missing: PUBLIC_KEY_FILENAME,
            })
        }
    };

    let public_key = STANDARD
        .decode(pub_text.trim())
        .map_err(|_| SigningError::InvalidFormat {
            what: "base64 public key",
        })
        .and_then(|bytes| BlsPublicKey::from_bytes(&bytes))
        .map_err(|source| KeyError::InvalidKeyFile {
            path: pub_path.clone(),
            source,
        })?;

    let private_key =
        decode_base64_private_key(&priv_text).map_err(|source| KeyError::InvalidKeyFile {
            path: priv_path.clone(),
            source,
        })?;

    if private_key.public_key() != public_key {
        return Err(KeyError::MismatchedPublicKey {
            dir: dir.to_path_buf(),
        });
    }

    Ok((public_key, private_key))
}

/// Generate a fresh key pair and write it to `dir`, creating the directory.
///
/// Fails with `KeyError::Io` rather than replace a key file already present.
pub fn generate_and_store_keys(dir: &Path) -> Result<(BlsPublicKey, BlsPrivateKey), KeyError> {
    let (public_key, private_key) = generate_keypair()?;

    std::fs::create_dir_all(dir).map_err(|source| KeyError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let priv_text = Zeroizing::new(STANDARD.encode(&private_key.to_bytes()[..]));
    write_private_key_file(&dir.join(PRIVATE_KEY_FILENAME), priv_text.as_bytes())?;

    let pub_path = dir.join(PUBLIC_KEY_FILENAME);
    let pub_text = STANDARD.encode(public_key.to_bytes());
    std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&pub_path)
        .and_then(|mut file| file.write_all(pub_text.as_bytes()))
        .map_err(|source| KeyError::Io {
            path: pub_path.clone(),
            source,
        })?;

    info!("[das-signing] 🔑 Generated new BLS key pair in {}", dir.display());
    Ok((public_key, private_key))
}

/// `Ok(None)` when the file does not exist.
fn read_key_file(path: &Path) -> Result<Option<String>, KeyError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(source) if source.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(KeyError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(unix)]
fn write_private_key_file(path: &Path, contents: &[u8]) -> Result<(), KeyError> {
    use std::os::unix::fs::OpenOptionsExt;

    let io_err = |source| KeyError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
        .map_err(io_err)?;
    file.write_all(contents).map_err(io_err)?;
    file.sync_all().map_err(io_err)
}

#[cfg(not(unix))]
fn write_private_key_file(path: &Path, contents: &[u8]) -> Result<(), KeyError> {
    std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .and_then(|mut file| file.write_all(contents))
        .map_err(|source| KeyError::Io {
            path: path.to_path_buf(),
            source,
        })
}
