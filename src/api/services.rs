use std::collections::HashMap;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http_body_util::BodyExt;
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

use super::models::{HealthResponse, MediaQuery, MediaRequest};
use super::state::AppState;
use crate::api::error::ApiError;
use crate::format::{FormatPolicy, MediaKind};
use crate::store::{ArtifactDescriptor, RequestKey};

/// Request bodies carry a single URL; anything bigger than this is noise.
const MAX_REQUEST_BODY: usize = 64 * 1024;

/// How a route serves the artifact: direct (browser link, size-capped) or
/// programmatic (API client, uncapped).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AccessMode {
    Direct,
    Programmatic,
}

/// Programmatic audio retrieval (POST /song, aliased as POST /audio)
///
/// The main audio entry point. It handles:
/// - Content-Type and body validation
/// - Source URL validation (present, parseable, http/https)
/// - Engine invocation under the audio format policy
/// - Streaming the finished MP3 back with its stored filename
///
/// ## Flow:
/// 1. Validate Content-Type, read and bound the body, deserialize `{url}`
/// 2. Validate the URL before anything is spawned
/// 3. Draw a request key and fetch under the audio policy
/// 4. Stream the verified artifact; no size gate on this route
pub async fn fetch_song(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, ApiError> {
    let request = read_request(&headers, body).await?;
    retrieve(&state, &request.url, MediaKind::Audio, AccessMode::Programmatic).await
}

/// Direct audio retrieval (GET /song)
///
/// Same pipeline as [`fetch_song`] but intended for pasted browser links:
/// the URL arrives as a query parameter and the response is rejected with
/// 413 when the artifact exceeds the configured direct-download cap. The
/// artifact itself is kept; a programmatic retry is not penalized.
pub async fn fetch_song_direct(
    State(state): State<AppState>,
    Query(query): Query<MediaQuery>,
) -> Result<Response, ApiError> {
    retrieve(&state, &query.url, MediaKind::Audio, AccessMode::Direct).await
}

/// Programmatic video retrieval (POST /video)
pub async fn fetch_video(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, ApiError> {
    let request = read_request(&headers, body).await?;
    retrieve(&state, &request.url, MediaKind::Video, AccessMode::Programmatic).await
}

/// Direct video retrieval (GET /video), size-gated like [`fetch_song_direct`]
pub async fn fetch_video_direct(
    State(state): State<AppState>,
    Query(query): Query<MediaQuery>,
) -> Result<Response, ApiError> {
    retrieve(&state, &query.url, MediaKind::Video, AccessMode::Direct).await
}

/// Shared retrieval pipeline behind all four routes.
async fn retrieve(
    state: &AppState,
    url: &str,
    kind: MediaKind,
    mode: AccessMode,
) -> Result<Response, ApiError> {
    let url = super::validation::validate_source_url(url)
        .map_err(|err| ApiError::InvalidRequest(err.to_string()))?;

    let policy = FormatPolicy::for_kind(kind);
    let key = RequestKey::new();
    info!(%kind, ?mode, %key, "retrieval started");

    let artifact = match state.engine.fetch(url, &policy, &key).await {
        Ok(artifact) => artifact,
        Err(err) => {
            state.metrics.retrieval_failed();
            warn!(%kind, %key, error = %err, "retrieval failed");
            return Err(err.into());
        }
    };

    state.metrics.retrieval_completed();
    info!(
        %key,
        name = %artifact.display_name,
        size = artifact.size_bytes,
        "retrieval succeeded"
    );

    if mode == AccessMode::Direct {
        let limit = state.config.api.max_direct_bytes.as_u64();
        if artifact.size_bytes > limit {
            // The artifact stays on disk for a programmatic follow-up
            state.metrics.direct_rejected();
            info!(%key, size = artifact.size_bytes, limit, "direct download rejected");
            return Err(ApiError::PayloadTooLarge {
                size: artifact.size_bytes,
                limit,
            });
        }
    }

    stream_artifact(&artifact).await
}

/// Validates headers, bounds the body, and deserializes the request payload.
async fn read_request(headers: &HeaderMap, body: Body) -> Result<MediaRequest, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::InvalidRequest("missing Content-Type header".to_string()))?;

    super::utils::parse_content_type(content_type)?;

    let data = body
        .collect()
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?
        .to_bytes();

    super::utils::validate_body_size(&data, MAX_REQUEST_BODY)?;

    let request: MediaRequest = serde_json::from_slice(&data)?;
    Ok(request)
}

/// Streams the artifact off disk with its media type, length, and
/// client-facing filename.
async fn stream_artifact(artifact: &ArtifactDescriptor) -> Result<Response, ApiError> {
    let file = tokio::fs::File::open(&artifact.path).await.map_err(|err| {
        ApiError::ArtifactMissing(format!("{}: {}", artifact.path.display(), err))
    })?;

    let stream = ReaderStream::new(file);
    let mut response = Body::from_stream(stream).into_response();

    let headers = response.headers_mut();
    if let Ok(value) = artifact.media_type.to_string().parse() {
        headers.insert(header::CONTENT_TYPE, value);
    }
    if let Ok(value) = super::utils::content_disposition(&artifact.display_name).parse() {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(artifact.size_bytes));

    Ok(response)
}

/// Health check endpoint (GET /health)
///
/// Reports per-component status: `api` (trivially healthy if responding)
/// and `storage` (the artifact root must be creatable/writable).
/// Returns 503 Service Unavailable if any component is unhealthy.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let mut components = HashMap::new();

    components.insert("api".to_string(), "healthy".to_string());

    let storage_status = match state.store.ensure_ready() {
        Ok(()) => "healthy",
        Err(err) => {
            warn!(error = %err, "storage health check failed");
            "unhealthy"
        }
    };
    components.insert("storage".to_string(), storage_status.to_string());

    let all_healthy = components.values().all(|status| status == "healthy");
    let overall_status = if all_healthy { "healthy" } else { "unhealthy" };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: overall_status.to_string(),
        components,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (status_code, Json(response))
}
