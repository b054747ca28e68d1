//! Per-kind extraction and post-processing policies.
//!
//! The mapping is fixed: routes choose a [`MediaKind`], never the client,
//! and each kind resolves to exactly one policy. Selector expressions use
//! the engine's format-selector syntax, with fallback alternatives joined
//! by `/` so the chain always resolves to some stream.

use mime::Mime;
use serde::Serialize;
use std::fmt;

const AUDIO_SELECTOR: &str = "bestaudio/best";
const VIDEO_SELECTOR: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";

const AUDIO_CODEC: &str = "mp3";
const AUDIO_BITRATE: &str = "192K";
const VIDEO_CONTAINER: &str = "mp4";

const AUDIO_MEDIA_TYPE: &str = "audio/mpeg";
const VIDEO_MEDIA_TYPE: &str = "video/mp4";

/// Which representation of the source a route retrieves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transcode or merge step the engine applies after the raw download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostProcessing {
    /// Extract the audio track and re-encode it to a fixed codec/bitrate.
    ExtractAudio {
        codec: &'static str,
        quality: &'static str,
    },
    /// Force the final output into a single container, merging separate
    /// video and audio streams when the selector picked a pair.
    MergeContainer { container: &'static str },
}

/// Immutable retrieval policy for one [`MediaKind`].
#[derive(Debug, Clone)]
pub struct FormatPolicy {
    pub kind: MediaKind,
    pub selector: &'static str,
    pub post_processing: Option<PostProcessing>,
}

impl FormatPolicy {
    /// Pure lookup from kind to policy; total over [`MediaKind`].
    pub fn for_kind(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Audio => Self {
                kind,
                selector: AUDIO_SELECTOR,
                post_processing: Some(PostProcessing::ExtractAudio {
                    codec: AUDIO_CODEC,
                    quality: AUDIO_BITRATE,
                }),
            },
            MediaKind::Video => Self {
                kind,
                selector: VIDEO_SELECTOR,
                post_processing: Some(PostProcessing::MergeContainer {
                    container: VIDEO_CONTAINER,
                }),
            },
        }
    }

    /// Media type of the finished artifact.
    pub fn media_type(&self) -> Mime {
        let literal = match self.kind {
            MediaKind::Audio => AUDIO_MEDIA_TYPE,
            MediaKind::Video => VIDEO_MEDIA_TYPE,
        };
        literal.parse().unwrap()
    }

    /// Extension the artifact carries after post-processing, when it
    /// differs from the engine's predicted one. Audio extraction rewrites
    /// the container extension; the video merge target is already part of
    /// the engine's prediction.
    pub fn final_extension(&self) -> Option<&'static str> {
        match self.post_processing {
            Some(PostProcessing::ExtractAudio { codec, .. }) => Some(codec),
            _ => None,
        }
    }
}
