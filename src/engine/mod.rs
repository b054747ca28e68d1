//! Retrieval engine: hands a source URL to an external downloader process
//! and verifies what it produced. The trait seam exists so request handling
//! can be tested without a real engine binary on the path.

mod diagnostics;
mod ytdlp;

pub use ytdlp::YtDlpEngine;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::format::FormatPolicy;
use crate::store::{ArtifactDescriptor, RequestKey, StoreError};

#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine rejected the URL itself or could not reach the source.
    #[error("source rejected: {0}")]
    InvalidSource(String),

    /// No available format satisfies the policy's selector.
    #[error("no format satisfies the requested selector: {0}")]
    NoMatchingFormat(String),

    /// Extraction or merge step failed after the media itself downloaded.
    #[error("post-processing failed: {0}")]
    TranscodeFailed(String),

    #[error("retrieval timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("failed to launch retrieval engine {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Storage(#[from] StoreError),

    /// Engine failed in a way none of the known patterns explain.
    #[error("retrieval failed: {0}")]
    Failed(String),
}

/// Fetches a source into the artifact store.
#[async_trait]
pub trait RetrievalEngine: Send + Sync {
    /// Downloads `url` under the request key's namespace, applying the
    /// policy's selector and post-processing, and returns the artifact
    /// verified against the filesystem.
    async fn fetch(
        &self,
        url: &str,
        policy: &FormatPolicy,
        key: &RequestKey,
    ) -> Result<ArtifactDescriptor, EngineError>;
}
