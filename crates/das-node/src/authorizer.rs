//! # Batch Poster Authorizer
//!
//! Gates store requests to addresses the sequencer inbox lists as batch posters.
//! Every check is a fresh read; there is no caching and no retry here. A failed
//! check rejects the request.

use crate::errors::{DasError, Unauthorized};
use crate::ports::SequencerInboxReader;
use das_signing::recover_store_signer;
use das_types::Address;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct BatchPosterVerifier {
    inbox: Arc<dyn SequencerInboxReader>,
}

impl BatchPosterVerifier {
    pub fn new(inbox: Arc<dyn SequencerInboxReader>) -> Self {
        Self { inbox }
    }

    pub async fn is_batch_poster(&self, address: Address) -> Result<bool, Unauthorized> {
        self.inbox
            .is_batch_poster(address)
            .await
            .map_err(Unauthorized::Ledger)
    }

    /// Recover the signer of a store request and require it to be a batch poster.
    pub async fn authorize_store(
        &self,
        message: &[u8],
        timeout: u64,
        signature: &[u8],
    ) -> Result<Address, Unauthorized> {
        let signer = recover_store_signer(message, timeout, signature).map_err(|e| {
            warn!("[das-node] Rejected store request: {}", e);
            Unauthorized::Recovery(e)
        })?;

        match self.is_batch_poster(signer).await {
            Ok(true) => {
                debug!("[das-node] Store request from batch poster 0x{}", hex::encode(signer));
                Ok(signer)
            }
            Ok(false) => {
                warn!(
                    "[das-node] Rejected store request from non batch poster 0x{}",
                    hex::encode(signer)
                );
                Err(Unauthorized::NotBatchPoster(signer))
            }
            Err(e) => {
                warn!("[das-node] Batch poster check failed: {}", e);
                Err(e)
            }
        }
    }
}

/// Parse an optional contract address.
///
/// Empty or `"none"` means absent; otherwise a `0x`-prefixed 40 hex digit address.
pub fn parse_optional_address(value: &str) -> Result<Option<Address>, DasError> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }

    let invalid = || DasError::Configuration(format!("invalid address: {}", value));
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(invalid)?;
    if digits.len() != 40 {
        return Err(invalid());
    }

    let mut address = [0u8; 20];
    hex::decode_to_slice(digits, &mut address).map_err(|_| invalid())?;
    Ok(Some(address))
}
