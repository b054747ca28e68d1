use std::sync::Arc;

use crate::config::Config;
use crate::engine::RetrievalEngine;
use crate::observability::Metrics;
use crate::store::ArtifactStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<ArtifactStore>,
    /// Trait object so tests can substitute a stub engine.
    pub engine: Arc<dyn RetrievalEngine>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: Config, store: ArtifactStore, engine: Arc<dyn RetrievalEngine>) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            engine,
            metrics: Arc::new(Metrics::new()),
        }
    }
}
