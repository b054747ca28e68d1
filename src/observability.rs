//! Process-wide counters for request outcomes

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics handle shared across handlers and lifecycle hooks
#[derive(Debug, Default)]
pub struct Metrics {
    retrievals_completed: AtomicU64,
    retrievals_failed: AtomicU64,
    direct_rejections: AtomicU64,
    artifacts_purged: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retrieval_completed(&self) {
        self.retrievals_completed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "retrievals_completed", "Metric incremented");
    }

    pub fn retrieval_failed(&self) {
        self.retrievals_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "retrievals_failed", "Metric incremented");
    }

    pub fn direct_rejected(&self) {
        self.direct_rejections.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "direct_rejections", "Metric incremented");
    }

    pub fn artifacts_purged(&self, count: u64) {
        self.artifacts_purged.fetch_add(count, Ordering::Relaxed);
        tracing::debug!(counter = "artifacts_purged", count, "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            retrievals_completed: self.retrievals_completed.load(Ordering::Relaxed),
            retrievals_failed: self.retrievals_failed.load(Ordering::Relaxed),
            direct_rejections: self.direct_rejections.load(Ordering::Relaxed),
            artifacts_purged: self.artifacts_purged.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub retrievals_completed: u64,
    pub retrievals_failed: u64,
    pub direct_rejections: u64,
    pub artifacts_purged: u64,
}
