use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get, routing::post};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{
    services::{fetch_song, fetch_song_direct, fetch_video, fetch_video_direct, health},
    state::AppState,
};
use crate::config::Config;
use crate::engine::YtDlpEngine;
use crate::lifecycle;
use crate::store::ArtifactStore;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Builds the service router. Shared by [`run`] and the integration tests
/// so both exercise identical routing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/song", post(fetch_song).get(fetch_song_direct))
        .route("/video", post(fetch_video).get(fetch_video_direct))
        .route("/audio", post(fetch_song))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(address_override: Option<SocketAddr>) -> Result<(), AnyError> {
    // Load config
    info!("Loading configuration");
    let config = Config::load().map_err(|e| format!("Failed to load config: {}", e))?;

    let address = address_override.unwrap_or(config.server.bind_addr);

    let store = ArtifactStore::new(config.storage.root.clone());
    lifecycle::on_start(&store);

    let engine = Arc::new(YtDlpEngine::new(config.engine.clone(), store.clone()));
    let state = AppState::new(config, store, engine);

    let sweeper = lifecycle::spawn_retention_sweep(
        &state.config.retention,
        state.store.clone(),
        state.metrics.clone(),
    );

    let app = router(state.clone());

    let listener = TcpListener::bind(address).await?;
    info!(%address, "TubeFetch API listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The listener is closed and in-flight requests have drained; stop
    // sweeping before the final purge so the two never race.
    if let Some(handle) = sweeper {
        handle.abort();
    }
    lifecycle::on_stop(&state.store, &state.metrics);

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
