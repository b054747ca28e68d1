//! Process lifecycle: storage readiness at start, optional retention sweeps
//! while running, full purge after shutdown drain.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::RetentionConfig;
use crate::observability::Metrics;
use crate::store::ArtifactStore;

/// Makes sure the artifact root exists before the listener opens.
/// Best-effort: a failure is logged, not fatal, and individual requests
/// will surface storage errors on their own.
pub fn on_start(store: &ArtifactStore) {
    match store.ensure_ready() {
        Ok(()) => info!(root = %store.root().display(), "artifact store ready"),
        Err(err) => warn!(error = %err, "artifact store not ready at startup"),
    }
}

/// Purges every artifact once the server has drained. Best-effort; a stuck
/// file must not block process exit.
pub fn on_stop(store: &ArtifactStore, metrics: &Metrics) {
    match store.purge_all() {
        Ok(stats) => {
            metrics.artifacts_purged(stats.removed as u64);
            info!(
                removed = stats.removed,
                failed = stats.failed,
                bytes_reclaimed = stats.bytes_reclaimed,
                "shutdown purge finished"
            );
        }
        Err(err) => warn!(error = %err, "shutdown purge failed"),
    }

    let snapshot = metrics.snapshot();
    info!(
        retrievals_completed = snapshot.retrievals_completed,
        retrievals_failed = snapshot.retrievals_failed,
        direct_rejections = snapshot.direct_rejections,
        artifacts_purged = snapshot.artifacts_purged,
        "final metrics"
    );
}

/// Spawns the age-based retention sweeper when enabled. Returns the task
/// handle so shutdown can abort it before the final purge.
pub fn spawn_retention_sweep(
    retention: &RetentionConfig,
    store: Arc<ArtifactStore>,
    metrics: Arc<Metrics>,
) -> Option<JoinHandle<()>> {
    if !retention.enabled {
        return None;
    }

    let max_age = retention.max_age();
    let interval = retention.sweep_interval();
    info!(?max_age, ?interval, "retention sweeper enabled");

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it so a fresh start does
        // not sweep before anything can age.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match store.sweep_older_than(max_age) {
                Ok(stats) if stats.removed > 0 => {
                    metrics.artifacts_purged(stats.removed as u64);
                    info!(
                        removed = stats.removed,
                        bytes_reclaimed = stats.bytes_reclaimed,
                        "retention sweep"
                    );
                }
                Ok(_) => {}
                Err(err) => warn!(error = %err, "retention sweep failed"),
            }
        }
    }))
}
