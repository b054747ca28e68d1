//! Artifact storage: one shared directory where finished downloads land.
//!
//! All artifacts are regular files directly under the root; the store never
//! creates subdirectories, and bulk operations (purge, retention sweep)
//! deliberately skip any that appear. Every request tags its output files
//! with a [`RequestKey`] so concurrent requests for identically-titled
//! sources cannot collide.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use mime::Mime;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::format::FormatPolicy;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable at {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact missing: no file at {0}")]
    ArtifactMissing(PathBuf),
}

/// Unique per-request filename suffix, placed between the title and the
/// extension (`<title>.<key>.<ext>`). Time-ordered so directory listings
/// roughly follow request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestKey(String);

impl RequestKey {
    pub fn new() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestKey {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A finished artifact, verified against the filesystem.
#[derive(Debug, Clone)]
pub struct ArtifactDescriptor {
    pub path: PathBuf,
    pub media_type: Mime,
    pub size_bytes: u64,
    /// Basename with the request key stripped; what the client sees.
    pub display_name: String,
}

/// Counters for bulk removal passes.
#[derive(Debug, Default, Clone, Copy)]
pub struct PurgeStats {
    pub removed: usize,
    pub failed: usize,
    pub bytes_reclaimed: u64,
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Makes sure the storage directory exists. Idempotent; called at
    /// startup and again before every engine write.
    pub fn ensure_ready(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Unavailable {
            path: self.root.clone(),
            source,
        })
    }

    /// Output template handed to the engine: the configured title template
    /// plus the request key, with the extension left for the engine to fill.
    pub fn output_template(&self, title_template: &str, key: &RequestKey) -> String {
        self.root
            .join(format!("{title_template}.{key}.%(ext)s"))
            .to_string_lossy()
            .into_owned()
    }

    /// Turns the engine's predicted output path into a verified descriptor.
    ///
    /// The prediction reflects the source container; audio post-processing
    /// re-encodes to a different extension, so the predicted name is only a
    /// hint. The policy's final extension is applied first, then the result
    /// must exist as a regular file.
    pub fn resolve(
        &self,
        predicted: &Path,
        policy: &FormatPolicy,
        key: &RequestKey,
    ) -> Result<ArtifactDescriptor, StoreError> {
        let path = match policy.final_extension() {
            Some(extension) => predicted.with_extension(extension),
            None => predicted.to_path_buf(),
        };

        let metadata =
            fs::metadata(&path).map_err(|_| StoreError::ArtifactMissing(path.clone()))?;
        if !metadata.is_file() {
            return Err(StoreError::ArtifactMissing(path));
        }

        debug!(path = %path.display(), size = metadata.len(), "artifact resolved");

        Ok(ArtifactDescriptor {
            display_name: display_name(&path, key),
            media_type: policy.media_type(),
            size_bytes: metadata.len(),
            path,
        })
    }

    /// Removes every regular file directly under the root. Subdirectories
    /// are left alone, and individual removal failures are logged and
    /// counted rather than aborting the pass.
    pub fn purge_all(&self) -> Result<PurgeStats, StoreError> {
        let entries = fs::read_dir(&self.root).map_err(|source| StoreError::Unavailable {
            path: self.root.clone(),
            source,
        })?;

        let mut stats = PurgeStats::default();
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(metadata) = entry.metadata() else {
                stats.failed += 1;
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => {
                    stats.removed += 1;
                    stats.bytes_reclaimed += metadata.len();
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to remove artifact");
                    stats.failed += 1;
                }
            }
        }
        Ok(stats)
    }

    /// Best-effort removal of everything a request left behind, including
    /// `.part` partials. Used when a fetch is cancelled or fails midway.
    pub fn remove_keyed(&self, key: &RequestKey) -> usize {
        let marker = format!(".{}.", key.as_str());
        let Ok(entries) = fs::read_dir(&self.root) else {
            return 0;
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let name = entry.file_name();
            if !name.to_string_lossy().contains(&marker) {
                continue;
            }
            let path = entry.path();
            if entry.metadata().map(|m| m.is_file()).unwrap_or(false)
                && fs::remove_file(&path).is_ok()
            {
                debug!(path = %path.display(), "removed keyed leftover");
                removed += 1;
            }
        }
        removed
    }

    /// Removes regular files whose modification time is older than
    /// `max_age`. Same tolerance rules as [`ArtifactStore::purge_all`].
    pub fn sweep_older_than(&self, max_age: Duration) -> Result<PurgeStats, StoreError> {
        let entries = fs::read_dir(&self.root).map_err(|source| StoreError::Unavailable {
            path: self.root.clone(),
            source,
        })?;

        let now = SystemTime::now();
        let mut stats = PurgeStats::default();
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(metadata) = entry.metadata() else {
                stats.failed += 1;
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let age = metadata
                .modified()
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .unwrap_or(Duration::ZERO);
            if age < max_age {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => {
                    stats.removed += 1;
                    stats.bytes_reclaimed += metadata.len();
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to sweep artifact");
                    stats.failed += 1;
                }
            }
        }
        Ok(stats)
    }
}

/// Client-facing filename: the artifact basename with the key segment
/// removed, so `Title.<key>.mp3` downloads as `Title.mp3`.
fn display_name(path: &Path, key: &RequestKey) -> String {
    let basename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("artifact"));
    basename.replace(&format!(".{}", key.as_str()), "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::MediaKind;
    use tempfile::TempDir;

    fn audio() -> FormatPolicy {
        FormatPolicy::for_kind(MediaKind::Audio)
    }

    fn video() -> FormatPolicy {
        FormatPolicy::for_kind(MediaKind::Video)
    }

    #[test]
    fn ensure_ready_creates_and_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp.path().join("artifacts"));

        assert!(!store.root().exists());
        store.ensure_ready().unwrap();
        assert!(store.root().is_dir());
        store.ensure_ready().unwrap();
    }

    #[test]
    fn ensure_ready_reports_unavailable_root() {
        let temp = TempDir::new().unwrap();
        // A file where the directory should go makes creation impossible
        let blocker = temp.path().join("blocked");
        fs::write(&blocker, b"x").unwrap();

        let store = ArtifactStore::new(blocker.join("artifacts"));
        assert!(matches!(
            store.ensure_ready(),
            Err(StoreError::Unavailable { .. })
        ));
    }

    #[test]
    fn output_template_places_key_before_extension() {
        let store = ArtifactStore::new("downloads");
        let key = RequestKey::new();
        let template = store.output_template("%(title)s", &key);

        assert!(template.starts_with("downloads"));
        assert!(template.ends_with(&format!("%(title)s.{key}.%(ext)s")));
    }

    #[test]
    fn resolve_rewrites_audio_extension() {
        let temp = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp.path());
        let key = RequestKey::new();

        // Engine predicted the source container, post-processing produced mp3
        let predicted = temp.path().join(format!("Some Track.{key}.webm"));
        let actual = temp.path().join(format!("Some Track.{key}.mp3"));
        fs::write(&actual, b"audio-bytes").unwrap();

        let artifact = store.resolve(&predicted, &audio(), &key).unwrap();
        assert_eq!(artifact.path, actual);
        assert_eq!(artifact.size_bytes, 11);
        assert_eq!(artifact.media_type.essence_str(), "audio/mpeg");
        assert_eq!(artifact.display_name, "Some Track.mp3");
    }

    #[test]
    fn resolve_keeps_video_prediction() {
        let temp = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp.path());
        let key = RequestKey::new();

        let predicted = temp.path().join(format!("Clip.{key}.mp4"));
        fs::write(&predicted, b"video").unwrap();

        let artifact = store.resolve(&predicted, &video(), &key).unwrap();
        assert_eq!(artifact.path, predicted);
        assert_eq!(artifact.media_type.essence_str(), "video/mp4");
        assert_eq!(artifact.display_name, "Clip.mp4");
    }

    #[test]
    fn resolve_missing_artifact_fails() {
        let temp = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp.path());
        let key = RequestKey::new();

        let predicted = temp.path().join(format!("Ghost.{key}.webm"));
        let result = store.resolve(&predicted, &audio(), &key);
        assert!(matches!(result, Err(StoreError::ArtifactMissing(_))));
    }

    #[test]
    fn purge_removes_files_and_skips_subdirectories() {
        let temp = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp.path());

        fs::write(temp.path().join("a.mp3"), b"aaa").unwrap();
        fs::write(temp.path().join("b.mp4"), b"bbbb").unwrap();
        fs::create_dir(temp.path().join("keep")).unwrap();
        fs::write(temp.path().join("keep").join("inner.mp3"), b"c").unwrap();

        let stats = store.purge_all().unwrap();
        assert_eq!(stats.removed, 2);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.bytes_reclaimed, 7);
        assert!(temp.path().join("keep").join("inner.mp3").exists());
    }

    #[test]
    fn purge_on_empty_directory_is_a_noop() {
        let temp = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp.path());

        let stats = store.purge_all().unwrap();
        assert_eq!(stats.removed, 0);
        assert_eq!(stats.failed, 0);
    }

    #[test]
    fn remove_keyed_targets_only_one_request() {
        let temp = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp.path());
        let mine = RequestKey::new();
        let other = RequestKey::new();

        fs::write(temp.path().join(format!("Song.{mine}.webm.part")), b"p").unwrap();
        fs::write(temp.path().join(format!("Song.{mine}.webm")), b"w").unwrap();
        fs::write(temp.path().join(format!("Song.{other}.mp3")), b"keep").unwrap();

        assert_eq!(store.remove_keyed(&mine), 2);
        assert!(temp.path().join(format!("Song.{other}.mp3")).exists());
    }

    #[test]
    fn sweep_honors_max_age() {
        let temp = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp.path());

        fs::write(temp.path().join("fresh.mp3"), b"xx").unwrap();

        // Nothing is older than an hour
        let stats = store.sweep_older_than(Duration::from_secs(3600)).unwrap();
        assert_eq!(stats.removed, 0);
        assert!(temp.path().join("fresh.mp3").exists());

        // Zero max age removes everything eligible
        let stats = store.sweep_older_than(Duration::ZERO).unwrap();
        assert_eq!(stats.removed, 1);
        assert!(!temp.path().join("fresh.mp3").exists());
    }

    #[test]
    fn request_keys_are_unique_and_hyphenless() {
        let a = RequestKey::new();
        let b = RequestKey::new();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
        assert!(!a.as_str().contains('-'));
    }
}
