//! Certificate issuance and retrieval against injected storage doubles.

mod common;

use common::*;
use das_node::{DasError, Unauthorized};
use das_signing::{sign_store_request, verify_certificate};
use das_storage::test_utils::{
    CountingBackend, FailOn, FailingBackend, MemoryBackend, StallingSyncBackend,
};
use das_storage::StorageError;
use das_types::{keccak256, Keyset};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_store_round_trip_returns_original_bytes() {
    let das = service_over(Arc::new(MemoryBackend::new()));

    let payloads: [&[u8]; 4] = [b"", b"a", b"hello", &[0xFF; 4096]];
    for payload in payloads {
        let cert = das.store(payload, 1_000, &[]).await.unwrap();
        assert_eq!(das.get_by_hash(cert.data_hash()).await.unwrap(), payload);
    }
}

#[tokio::test]
async fn test_certificate_verifies_under_published_keyset() {
    let das = service_over(Arc::new(MemoryBackend::new()));
    let cert = das.store(b"blob", 77, &[]).await.unwrap();

    let keyset = Keyset::deserialize(das.current_keyset_bytes()).unwrap();
    assert_eq!(keyset.hash(), *cert.keyset_hash());
    assert_eq!(keyset.assumed_honest(), 1);
    assert!(verify_certificate(&cert, &keyset).is_ok());
}

#[tokio::test]
async fn test_failed_put_issues_no_certificate() {
    let das = service_over(Arc::new(FailingBackend::new(FailOn::Put)));

    assert!(matches!(
        das.store(b"blob", 1, &[]).await,
        Err(DasError::Storage(StorageError::Backend { .. }))
    ));
}

#[tokio::test]
async fn test_failed_sync_issues_no_certificate() {
    let backend = Arc::new(FailingBackend::new(FailOn::Sync));
    let das = service_over(backend.clone());

    assert!(matches!(
        das.store(b"blob", 1, &[]).await,
        Err(DasError::Storage(StorageError::Backend { .. }))
    ));
    assert_eq!(backend.stored(), 1);
}

#[tokio::test]
async fn test_store_stuck_in_sync_can_be_cancelled() {
    let backend = Arc::new(StallingSyncBackend::new());
    let das = Arc::new(service_over(backend.clone()));

    let timed_out = tokio::time::timeout(Duration::from_millis(50), das.store(b"blob", 1, &[])).await;
    assert!(timed_out.is_err());
    assert_eq!(backend.syncs_started(), 1);

    let task = {
        let das = das.clone();
        tokio::spawn(async move { das.store(b"other", 1, &[]).await })
    };
    while backend.syncs_started() < 2 {
        tokio::task::yield_now().await;
    }
    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());

    assert_eq!(backend.stored(), 2);
    assert_eq!(Arc::strong_count(&das), 1);
    assert_eq!(Arc::strong_count(&backend), 2);
}

#[tokio::test]
async fn test_non_batch_poster_rejected_before_any_write() {
    let (_, poster) = poster_key();
    let (stranger_key, _) = poster_key();
    let backend = Arc::new(CountingBackend::new(MemoryBackend::new()));
    let das = authorized_service_over(
        backend.clone(),
        Arc::new(FixedInbox::with_posters(&[poster])),
    );

    let sig = sign_store_request(&stranger_key, b"blob", 1).unwrap();
    assert!(matches!(
        das.store(b"blob", 1, &sig).await,
        Err(DasError::Unauthorized(Unauthorized::NotBatchPoster(_)))
    ));
    assert_eq!(backend.puts(), 0);
    assert_eq!(backend.syncs(), 0);
}

#[tokio::test]
async fn test_batch_poster_accepted() {
    let (key, poster) = poster_key();
    let das = authorized_service_over(
        Arc::new(MemoryBackend::new()),
        Arc::new(FixedInbox::with_posters(&[poster])),
    );

    let sig = sign_store_request(&key, b"blob", 1).unwrap();
    let cert = das.store(b"blob", 1, &sig).await.unwrap();
    assert_eq!(*cert.data_hash(), keccak256(b"blob"));
}

#[tokio::test]
async fn test_signature_for_other_timeout_rejected() {
    let (key, poster) = poster_key();
    let backend = Arc::new(CountingBackend::new(MemoryBackend::new()));
    let das = authorized_service_over(
        backend.clone(),
        Arc::new(FixedInbox::with_posters(&[poster])),
    );

    let sig = sign_store_request(&key, b"blob", 1).unwrap();
    assert!(matches!(
        das.store(b"blob", 2, &sig).await,
        Err(DasError::Unauthorized(_))
    ));
    assert_eq!(backend.puts(), 0);
}

#[tokio::test]
async fn test_unreachable_inbox_fails_closed() {
    let (key, _) = poster_key();
    let backend = Arc::new(CountingBackend::new(MemoryBackend::new()));
    let das = authorized_service_over(backend.clone(), Arc::new(UnreachableInbox));

    let sig = sign_store_request(&key, b"blob", 1).unwrap();
    assert!(matches!(
        das.store(b"blob", 1, &sig).await,
        Err(DasError::Unauthorized(Unauthorized::Ledger(_)))
    ));
    assert_eq!(backend.puts(), 0);
}

#[tokio::test]
async fn test_without_authorizer_any_signature_accepted() {
    let das = service_over(Arc::new(MemoryBackend::new()));
    let (stranger_key, _) = poster_key();
    let sig = sign_store_request(&stranger_key, b"blob", 1).unwrap();

    assert!(das.store(b"blob", 1, &sig).await.is_ok());
    assert!(das.store(b"blob", 1, b"not a signature").await.is_ok());
}

#[tokio::test]
async fn test_unknown_hash_is_not_found() {
    let das = service_over(Arc::new(MemoryBackend::new()));
    let err = das.get_by_hash(&[0x42; 32]).await.unwrap_err();
    assert!(matches!(err, DasError::NotFound));
}

#[tokio::test]
async fn test_local_keyset_resolved_without_storage() {
    let backend = Arc::new(CountingBackend::new(FailingBackend::default()));
    let das = service_over(backend.clone());

    let bytes = das.keyset_from_hash(das.keyset_hash()).await.unwrap();
    assert_eq!(bytes, das.current_keyset_bytes());
    assert_eq!(backend.gets(), 0);
}

#[tokio::test]
async fn test_peer_keyset_resolved_from_storage() {
    let das = service_over(Arc::new(MemoryBackend::new()));
    let peer = keyset_manager();

    das.store(peer.keyset_bytes(), 1, &[]).await.unwrap();
    let fetched = das.keyset_from_hash(peer.keyset_hash()).await.unwrap();
    assert_eq!(fetched, peer.keyset_bytes());
}

#[tokio::test]
async fn test_unknown_keyset_relabelled_whatever_the_backend_says() {
    let missing = service_over(Arc::new(MemoryBackend::new()));
    let broken = service_over(Arc::new(FailingBackend::default()));

    for das in [missing, broken] {
        let err = das.keyset_from_hash(&[0x11; 32]).await.unwrap_err();
        assert!(matches!(err, DasError::UnknownKeyset(_)));
        assert_eq!(err.to_string(), "no such keyset");
    }
}

#[tokio::test]
async fn test_concurrent_stores_of_same_payload() {
    let das = Arc::new(service_over(Arc::new(MemoryBackend::new())));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let das = das.clone();
            tokio::spawn(async move { das.store(b"shared", 5, &[]).await })
        })
        .collect();

    let mut certs = Vec::new();
    for handle in handles {
        certs.push(handle.await.unwrap().unwrap());
    }
    assert!(certs.windows(2).all(|w| w[0] == w[1]));
}

#[tokio::test]
async fn test_health_check_surfaces_backend_failure() {
    let healthy = service_over(Arc::new(MemoryBackend::new()));
    let broken = service_over(Arc::new(FailingBackend::default()));

    assert!(healthy.health_check().await.is_ok());
    assert!(matches!(
        broken.health_check().await,
        Err(DasError::Storage(_))
    ));
}
