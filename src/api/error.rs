use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use thiserror::Error;

use super::models::ErrorResponse;
use crate::engine::EngineError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("invalid source: {0}")]
    InvalidSource(String),
    #[error("no matching format: {0}")]
    NoMatchingFormat(String),
    #[error("transcode failed: {0}")]
    TranscodeFailed(String),
    #[error("artifact missing: {0}")]
    ArtifactMissing(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("artifact is {size} bytes, direct download limit is {limit} bytes")]
    PayloadTooLarge { size: u64, limit: u64 },
    #[error("retrieval timed out after {0}s")]
    RetrievalTimeout(u64),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidSource(_) | ApiError::NoMatchingFormat(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::RetrievalTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::TranscodeFailed(_)
            | ApiError::ArtifactMissing(_)
            | ApiError::StorageUnavailable(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "INVALID_REQUEST",
            ApiError::InvalidSource(_) => "INVALID_SOURCE",
            ApiError::NoMatchingFormat(_) => "NO_MATCHING_FORMAT",
            ApiError::TranscodeFailed(_) => "TRANSCODE_FAILED",
            ApiError::ArtifactMissing(_) => "ARTIFACT_MISSING",
            ApiError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            ApiError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            ApiError::RetrievalTimeout(_) => "RETRIEVAL_TIMEOUT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.code(),
            message: self.to_string(),
        };

        (status, Json(json!(body))).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        ApiError::InvalidRequest(value.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Unavailable { path, source } => {
                ApiError::StorageUnavailable(format!("{}: {}", path.display(), source))
            }
            StoreError::ArtifactMissing(path) => {
                ApiError::ArtifactMissing(format!("no file at {}", path.display()))
            }
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(value: EngineError) -> Self {
        match value {
            EngineError::InvalidSource(detail) => ApiError::InvalidSource(detail),
            EngineError::NoMatchingFormat(detail) => ApiError::NoMatchingFormat(detail),
            EngineError::TranscodeFailed(detail) => ApiError::TranscodeFailed(detail),
            EngineError::Timeout(elapsed) => ApiError::RetrievalTimeout(elapsed.as_secs()),
            EngineError::Spawn { binary, source } => {
                ApiError::Internal(format!("failed to launch retrieval engine {binary}: {source}"))
            }
            EngineError::Storage(err) => err.into(),
            EngineError::Failed(detail) => ApiError::Internal(detail),
        }
    }
}
