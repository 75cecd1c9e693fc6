//! Service construction from configuration, including the concrete disk scenario.

use das_node::{DasError, DataAvailabilityConfig, DataAvailabilityService};
use das_signing::{
    sign_store_request, verify_certificate, PRIVATE_KEY_FILENAME, PUBLIC_KEY_FILENAME,
};
use das_storage::{
    BackendClients, InMemoryCacheClient, InMemoryObjectStore, StorageError,
};
use das_types::{keccak256, ExpirationPolicy, Keyset};
use k256::ecdsa::SigningKey;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;

fn disk_config(root: &Path) -> DataAvailabilityConfig {
    let mut config = DataAvailabilityConfig::default();
    config.storage.storage_type = "files".into();
    config.storage.key_dir = root.join("keys");
    config.storage.local.data_dir = root.join("data");
    config.storage.allow_generate_keys = true;
    config
}

fn in_memory_clients(bucket: &str) -> BackendClients {
    BackendClients {
        object_store: Some(Arc::new(InMemoryObjectStore::with_bucket(bucket))),
        cache: Some(Arc::new(InMemoryCacheClient::new())),
    }
}

#[tokio::test]
async fn test_disk_backend_with_generated_keys() {
    let root = tempfile::tempdir().unwrap();
    let (_tx, rx) = watch::channel(false);
    let das =
        DataAvailabilityService::from_config(&disk_config(root.path()), &BackendClients::default(), rx)
            .unwrap();

    let key = SigningKey::random(&mut rand::thread_rng());
    let sig = sign_store_request(&key, b"hello", 9_999_999_999).unwrap();
    let cert = das.store(b"hello", 9_999_999_999, &sig).await.unwrap();

    assert_eq!(*cert.data_hash(), keccak256(b"hello"));
    assert_eq!(cert.signers_mask(), 1);
    let keyset = Keyset::deserialize(das.current_keyset_bytes()).unwrap();
    assert!(verify_certificate(&cert, &keyset).is_ok());
    assert_eq!(das.get_by_hash(cert.data_hash()).await.unwrap(), b"hello");

    assert!(root.path().join("keys").join(PRIVATE_KEY_FILENAME).exists());
    assert!(root
        .path()
        .join("data")
        .join(hex::encode(keccak256(b"hello")))
        .exists());
}

#[tokio::test]
async fn test_restart_keeps_identity_and_data() {
    let root = tempfile::tempdir().unwrap();
    let config = disk_config(root.path());

    let (_tx1, rx1) = watch::channel(false);
    let first = DataAvailabilityService::from_config(&config, &BackendClients::default(), rx1).unwrap();
    let cert = first.store(b"durable", 1, &[]).await.unwrap();

    let (_tx2, rx2) = watch::channel(false);
    let second = DataAvailabilityService::from_config(&config, &BackendClients::default(), rx2).unwrap();

    assert_eq!(second.keyset_hash(), first.keyset_hash());
    assert_eq!(second.get_by_hash(cert.data_hash()).await.unwrap(), b"durable");
}

#[tokio::test]
async fn test_missing_keys_without_generation_is_configuration_error() {
    let root = tempfile::tempdir().unwrap();
    let mut config = disk_config(root.path());
    config.storage.allow_generate_keys = false;
    let (_tx, rx) = watch::channel(false);

    assert!(matches!(
        DataAvailabilityService::from_config(&config, &BackendClients::default(), rx),
        Err(DasError::Configuration(_))
    ));
}

#[tokio::test]
async fn test_lone_private_key_is_configuration_error_not_new_identity() {
    let root = tempfile::tempdir().unwrap();
    let config = disk_config(root.path());
    let (_tx1, rx1) = watch::channel(false);
    DataAvailabilityService::from_config(&config, &BackendClients::default(), rx1).unwrap();

    let priv_path = root.path().join("keys").join(PRIVATE_KEY_FILENAME);
    let before = std::fs::read(&priv_path).unwrap();
    std::fs::remove_file(root.path().join("keys").join(PUBLIC_KEY_FILENAME)).unwrap();

    let (_tx2, rx2) = watch::channel(false);
    assert!(matches!(
        DataAvailabilityService::from_config(&config, &BackendClients::default(), rx2),
        Err(DasError::Configuration(_))
    ));
    assert_eq!(std::fs::read(&priv_path).unwrap(), before);
}

#[tokio::test]
async fn test_store_repairs_damaged_blob_before_certifying() {
    let root = tempfile::tempdir().unwrap();
    let (_tx, rx) = watch::channel(false);
    let das =
        DataAvailabilityService::from_config(&disk_config(root.path()), &BackendClients::default(), rx)
            .unwrap();

    let blob_path = root.path().join("data").join(hex::encode(keccak256(b"hello")));
    std::fs::write(&blob_path, b"bitrot").unwrap();

    let cert = das.store(b"hello", 9_999_999_999, &[]).await.unwrap();
    assert_eq!(das.get_by_hash(cert.data_hash()).await.unwrap(), b"hello");
}

#[tokio::test]
async fn test_unknown_storage_type_is_configuration_error() {
    let root = tempfile::tempdir().unwrap();
    let mut config = disk_config(root.path());
    config.storage.storage_type = "tape".into();
    let (_tx, rx) = watch::channel(false);

    let err = DataAvailabilityService::from_config(&config, &BackendClients::default(), rx)
        .err()
        .unwrap();
    assert!(matches!(err, DasError::Configuration(ref msg) if msg.contains("tape")));
}

#[tokio::test]
async fn test_malformed_inbox_address_is_configuration_error() {
    let root = tempfile::tempdir().unwrap();
    let mut config = disk_config(root.path());
    config.l1_node_url = "http://127.0.0.1:8545".into();
    config.sequencer_inbox_address = "0x1234".into();
    let (_tx, rx) = watch::channel(false);

    assert!(matches!(
        DataAvailabilityService::from_config(&config, &BackendClients::default(), rx),
        Err(DasError::Configuration(_))
    ));
}

#[tokio::test]
async fn test_l1_without_inbox_address_runs_unauthorized() {
    let root = tempfile::tempdir().unwrap();
    let mut config = disk_config(root.path());
    config.l1_node_url = "http://127.0.0.1:8545".into();
    config.sequencer_inbox_address = "none".into();
    let (_tx, rx) = watch::channel(false);

    let das = DataAvailabilityService::from_config(&config, &BackendClients::default(), rx).unwrap();
    assert!(das.store(b"blob", 1, &[]).await.is_ok());
}

#[tokio::test]
async fn test_big_cache_chain_from_config() {
    let root = tempfile::tempdir().unwrap();
    let mut config = disk_config(root.path());
    config.storage.storage_type = "bigCache".into();
    config.storage.object_store.bucket = "das".into();
    config.storage.discard_after_timeout = true;
    let (_tx, rx) = watch::channel(false);

    let das = DataAvailabilityService::from_config(&config, &in_memory_clients("das"), rx).unwrap();
    assert_eq!(das.expiration_policy(), ExpirationPolicy::DiscardAfterDataTimeout);

    let cert = das.store(b"cached", 9_999_999_999, &[]).await.unwrap();
    assert_eq!(das.get_by_hash(cert.data_hash()).await.unwrap(), b"cached");
    assert!(das.health_check().await.is_ok());
    assert!(das.to_string().starts_with("DataAvailabilityService{storage: MemoryCacheStorage("));
}

#[tokio::test]
async fn test_shutdown_signal_closes_storage() {
    let root = tempfile::tempdir().unwrap();
    let (tx, rx) = watch::channel(false);
    let mut das =
        DataAvailabilityService::from_config(&disk_config(root.path()), &BackendClients::default(), rx)
            .unwrap();
    let hook = das.take_shutdown_hook().unwrap();

    tx.send(true).unwrap();
    hook.await.unwrap();

    assert!(matches!(
        das.store(b"late", 1, &[]).await,
        Err(DasError::Storage(StorageError::Closed))
    ));
    assert!(matches!(
        das.get_by_hash(&[0u8; 32]).await,
        Err(DasError::Storage(StorageError::Closed))
    ));
    let keyset = das.keyset_from_hash(das.keyset_hash()).await.unwrap();
    assert_eq!(keyset, das.current_keyset_bytes());
}
