//! # DAS Node Binary
//!
//! Runs one data availability committee member.
//!
//! ## Startup Sequence
//!
//! 1. Install logging
//! 2. Load configuration from the environment
//! 3. Build the service (signing identity, authorizer, storage chain)
//! 4. Run periodic health checks until Ctrl+C
//! 5. Signal shutdown so the storage chain is closed exactly once

use anyhow::{Context, Result};
use das_node::{DataAvailabilityConfig, DataAvailabilityService};
use das_storage::{BackendClients, InMemoryCacheClient, InMemoryObjectStore};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Remote clients for the `s3`, `redis` and `bigCache` chains.
///
/// This binary links no object store or cache SDK, so those chains run against
/// in-process stand-ins and lose their data on exit.
fn backend_clients(config: &DataAvailabilityConfig) -> BackendClients {
    if !config.needs_remote_clients() {
        return BackendClients::default();
    }

    warn!(
        "[das-node] Storage type '{}' uses in-process object store and cache clients; data is not persisted",
        config.storage.storage_type
    );
    BackendClients {
        object_store: Some(Arc::new(InMemoryObjectStore::with_bucket(
            config.storage.object_store.bucket.clone(),
        ))),
        cache: Some(Arc::new(InMemoryCacheClient::new())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = DataAvailabilityConfig::from_env();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("[das-node] Starting with {:?}", config.storage);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let clients = backend_clients(&config);
    let mut service = DataAvailabilityService::from_config(&config, &clients, shutdown_rx)
        .context("failed to build data availability service")?;
    let shutdown_hook = service.take_shutdown_hook();
    let service = Arc::new(service);

    info!(
        "[das-node] {} ready, keyset hash 0x{}, expiration policy {}",
        service,
        hex::encode(service.keyset_hash()),
        service.expiration_policy()
    );

    let health_service = Arc::clone(&service);
    let interval = config.health_check_interval;
    let health_task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(e) = health_service.health_check().await {
                error!("[das-node] Health check failed: {}", e);
            }
        }
    });

    info!("[das-node] Running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    info!("[das-node] Initiating graceful shutdown...");
    health_task.abort();
    if let Err(e) = shutdown_tx.send(true) {
        error!("[das-node] Failed to send shutdown signal: {}", e);
    }
    if let Some(hook) = shutdown_hook {
        hook.await.context("storage shutdown task failed")?;
    }

    info!("[das-node] Shutdown complete");
    Ok(())
}
