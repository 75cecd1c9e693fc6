//! Shared fixtures for the service integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use das_node::{
    BatchPosterVerifier, DataAvailabilityService, LedgerError, SequencerInboxReader,
};
use das_signing::{address_from_verifying_key, generate_keypair, KeysetManager};
use das_storage::StorageBackend;
use das_types::Address;
use k256::ecdsa::SigningKey;
use std::collections::HashSet;
use std::sync::Arc;

/// Sequencer inbox that lists a fixed set of batch posters.
pub struct FixedInbox {
    posters: HashSet<Address>,
}

impl FixedInbox {
    pub fn with_posters(posters: &[Address]) -> Self {
        Self {
            posters: posters.iter().copied().collect(),
        }
    }
}

#[async_trait]
impl SequencerInboxReader for FixedInbox {
    async fn is_batch_poster(&self, address: Address) -> Result<bool, LedgerError> {
        Ok(self.posters.contains(&address))
    }
}

/// Sequencer inbox whose L1 node is unreachable.
pub struct UnreachableInbox;

#[async_trait]
impl SequencerInboxReader for UnreachableInbox {
    async fn is_batch_poster(&self, _address: Address) -> Result<bool, LedgerError> {
        Err(LedgerError::Transport("connection refused".into()))
    }
}

pub fn poster_key() -> (SigningKey, Address) {
    let key = SigningKey::random(&mut rand::thread_rng());
    let address = address_from_verifying_key(key.verifying_key());
    (key, address)
}

pub fn keyset_manager() -> Arc<KeysetManager> {
    let (_, sk) = generate_keypair().unwrap();
    Arc::new(KeysetManager::new(sk))
}

pub fn service_over(storage: Arc<dyn StorageBackend>) -> DataAvailabilityService {
    DataAvailabilityService::new(keyset_manager(), storage, None)
}

pub fn authorized_service_over(
    storage: Arc<dyn StorageBackend>,
    inbox: Arc<dyn SequencerInboxReader>,
) -> DataAvailabilityService {
    DataAvailabilityService::new(
        keyset_manager(),
        storage,
        Some(BatchPosterVerifier::new(inbox)),
    )
}
