//! Close a backend when the process-wide shutdown signal fires.

use crate::ports::backend::StorageBackend;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Spawn a task that closes `backend` once `shutdown` becomes `true` or its
/// sender is dropped.
pub fn spawn_shutdown_hook(
    backend: Arc<dyn StorageBackend>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while !*shutdown.borrow_and_update() {
            if shutdown.changed().await.is_err() {
                break;
            }
        }

        info!("[das-storage] Shutdown signalled, closing {}", backend);
        if let Err(e) = backend.close().await {
            warn!("[das-storage] Failed to close {}: {}", backend, e);
        }
    })
}
