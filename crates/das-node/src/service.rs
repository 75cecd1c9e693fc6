//! # Data Availability Service
//!
//! Issues availability certificates over the composed storage chain.
//!
//! ## Store Flow
//!
//! ```text
//! authorize (optional) → hash → sign → put → sync → attach keyset hash
//! ```
//!
//! A certificate is only returned after both `put` and `sync` succeed. Signing
//! happens first, but an unreturned signature is never observable.
//!
//! ## Concurrency
//!
//! The signing identity and keyset are immutable; the storage chain guards its
//! own state. Any number of `store`/`get_by_hash` calls may run at once, and
//! dropping a call's future cancels it.

use crate::adapters::json_rpc::JsonRpcSequencerInbox;
use crate::authorizer::{parse_optional_address, BatchPosterVerifier};
use crate::config::DataAvailabilityConfig;
use crate::errors::DasError;
use das_signing::KeysetManager;
use das_storage::{build_storage_backend, spawn_shutdown_hook, BackendClients, StorageBackend};
use das_types::{
    hash_from_slice, keccak256, Certificate, ExpirationPolicy, Hash, UnsignedCertificate,
    SINGLE_SIGNER_MASK,
};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct DataAvailabilityService {
    keyset: Arc<KeysetManager>,
    storage: Arc<dyn StorageBackend>,
    authorizer: Option<BatchPosterVerifier>,
    shutdown_hook: Option<JoinHandle<()>>,
}

impl DataAvailabilityService {
    /// Assemble a service from already-built parts.
    ///
    /// Without an authorizer every store request is accepted.
    pub fn new(
        keyset: Arc<KeysetManager>,
        storage: Arc<dyn StorageBackend>,
        authorizer: Option<BatchPosterVerifier>,
    ) -> Self {
        Self {
            keyset,
            storage,
            authorizer,
            shutdown_hook: None,
        }
    }

    /// Build the full service from configuration.
    ///
    /// Loads (or generates) the signing identity, connects the batch poster
    /// authorizer when both an L1 endpoint and an inbox address are set, builds
    /// the storage chain and registers it to be closed when `shutdown` fires.
    /// Must be called inside a Tokio runtime.
    pub fn from_config(
        config: &DataAvailabilityConfig,
        clients: &BackendClients,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self, DasError> {
        let keyset = Arc::new(KeysetManager::from_config(&config.key_config())?);

        let authorizer = if config.l1_enabled() {
            match parse_optional_address(&config.sequencer_inbox_address)? {
                Some(inbox) => {
                    let reader = JsonRpcSequencerInbox::new(config.l1_node_url.clone(), inbox)
                        .map_err(|e| DasError::Configuration(e.to_string()))?;
                    info!(
                        "[das-node] Authorizing store requests against inbox 0x{}",
                        hex::encode(inbox)
                    );
                    Some(BatchPosterVerifier::new(Arc::new(reader)))
                }
                None => None,
            }
        } else {
            None
        };
        if authorizer.is_none() {
            info!("[das-node] No sequencer inbox configured, store requests are not authorized");
        }

        let storage = build_storage_backend(&config.storage, clients)?;
        let hook = spawn_shutdown_hook(storage.clone(), shutdown);

        let mut service = Self::new(keyset, storage, authorizer);
        service.shutdown_hook = Some(hook);
        Ok(service)
    }

    /// Take the task that closes storage on shutdown, to await it on exit.
    pub fn take_shutdown_hook(&mut self) -> Option<JoinHandle<()>> {
        self.shutdown_hook.take()
    }

    /// Store `message` and return a certificate for it.
    pub async fn store(
        &self,
        message: &[u8],
        timeout: u64,
        signature: &[u8],
    ) -> Result<Certificate, DasError> {
        if let Some(authorizer) = &self.authorizer {
            authorizer.authorize_store(message, timeout, signature).await?;
        }

        let unsigned = UnsignedCertificate::new(keccak256(message), timeout, SINGLE_SIGNER_MASK);
        let bls_signature = self.keyset.sign(&unsigned.signable_fields())?;

        self.storage.put(message, timeout).await.map_err(|e| {
            warn!("[das-node] Put failed, no certificate issued: {}", e);
            DasError::from(e)
        })?;
        self.storage.sync().await.map_err(|e| {
            warn!("[das-node] Sync failed, no certificate issued: {}", e);
            DasError::from(e)
        })?;

        let certificate = unsigned.into_certificate(bls_signature, *self.keyset.keyset_hash());
        debug!(
            "[das-node] Issued certificate for {} ({} bytes, timeout {})",
            hex::encode(certificate.data_hash()),
            message.len(),
            timeout
        );
        Ok(certificate)
    }

    /// Fetch a stored blob. Retrieval is public.
    pub async fn get_by_hash(&self, hash: &[u8]) -> Result<Vec<u8>, DasError> {
        let Ok(hash) = hash_from_slice(hash) else {
            debug!("[das-node] Lookup with {} byte hash", hash.len());
            return Err(DasError::NotFound);
        };
        Ok(self.storage.get_by_hash(&hash).await?)
    }

    /// Resolve a keyset by hash, answering for the local keyset without storage.
    pub async fn keyset_from_hash(&self, hash: &[u8]) -> Result<Vec<u8>, DasError> {
        let unknown = match self.keyset.resolve_keyset(hash) {
            Ok(bytes) => return Ok(bytes.to_vec()),
            Err(unknown) => unknown,
        };

        let Ok(hash) = hash_from_slice(hash) else {
            return Err(unknown.into());
        };
        match self.storage.get_by_hash(&hash).await {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                if !e.is_not_found() {
                    warn!("[das-node] Keyset lookup failed in storage: {}", e);
                }
                Err(unknown.into())
            }
        }
    }

    /// Serialized keyset of this node.
    pub fn current_keyset_bytes(&self) -> &[u8] {
        self.keyset.keyset_bytes()
    }

    pub fn keyset_hash(&self) -> &Hash {
        self.keyset.keyset_hash()
    }

    pub fn keyset_manager(&self) -> &KeysetManager {
        &self.keyset
    }

    pub fn expiration_policy(&self) -> ExpirationPolicy {
        self.storage.expiration_policy()
    }

    pub async fn health_check(&self) -> Result<(), DasError> {
        Ok(self.storage.health_check().await?)
    }
}

impl fmt::Display for DataAvailabilityService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DataAvailabilityService{{storage: {}, keyset: 0x{}}}",
            self.storage,
            hex::encode(self.keyset.keyset_hash())
        )
    }
}
