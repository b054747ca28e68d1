//! yt-dlp subprocess driver.
//!
//! One invocation per request: the store's keyed output template keeps
//! concurrent downloads apart, `--print filename` makes the engine report
//! where it wrote (with the pre-postprocessing extension), and the child is
//! spawned with `kill_on_drop` so dropping the in-flight future, either on
//! timeout or because the client disconnected, also stops the download.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::config::EngineConfig;
use crate::format::{FormatPolicy, PostProcessing};
use crate::store::{ArtifactDescriptor, ArtifactStore, RequestKey};

use super::diagnostics;
use super::{EngineError, RetrievalEngine};

pub struct YtDlpEngine {
    config: EngineConfig,
    store: ArtifactStore,
}

impl YtDlpEngine {
    pub fn new(config: EngineConfig, store: ArtifactStore) -> Self {
        Self { config, store }
    }

    fn build_args(&self, url: &str, policy: &FormatPolicy, output_template: &str) -> Vec<String> {
        let mut args: Vec<String> = [
            "--no-playlist",
            "--no-warnings",
            "--quiet",
            "--no-simulate",
            "--print",
            "filename",
            "-o",
            output_template,
            "-f",
            policy.selector,
        ]
        .iter()
        .map(|arg| (*arg).to_string())
        .collect();

        if let Some(cookies) = &self.config.cookies_file {
            args.push("--cookies".to_string());
            args.push(cookies.to_string_lossy().into_owned());
        }

        match &policy.post_processing {
            Some(PostProcessing::ExtractAudio { codec, quality }) => {
                args.extend(
                    ["-x", "--audio-format", codec, "--audio-quality", quality]
                        .iter()
                        .map(|arg| (*arg).to_string()),
                );
            }
            Some(PostProcessing::MergeContainer { container }) => {
                args.push("--merge-output-format".to_string());
                args.push((*container).to_string());
            }
            None => {}
        }

        args.push(url.to_string());
        args
    }
}

#[async_trait]
impl RetrievalEngine for YtDlpEngine {
    async fn fetch(
        &self,
        url: &str,
        policy: &FormatPolicy,
        key: &RequestKey,
    ) -> Result<ArtifactDescriptor, EngineError> {
        self.store.ensure_ready()?;

        let output_template = self.store.output_template(&self.config.title_template, key);
        let args = self.build_args(url, policy, &output_template);
        debug!(binary = %self.config.binary, kind = %policy.kind, %key, "spawning retrieval engine");

        let mut command = Command::new(&self.config.binary);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Removes keyed partials on every exit path except a verified
        // artifact; disarmed below once resolve succeeds.
        let guard = CleanupGuard::new(&self.store, key);

        let output = match timeout(self.config.fetch_timeout(), command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(EngineError::Spawn {
                    binary: self.config.binary.clone(),
                    source,
                });
            }
            Err(_) => return Err(EngineError::Timeout(self.config.fetch_timeout())),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(diagnostics::classify_failure(&stderr, output.status));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let predicted = predicted_path(&stdout)
            .ok_or_else(|| EngineError::Failed("engine reported no output filename".to_string()))?;

        let artifact = self.store.resolve(Path::new(predicted), policy, key)?;
        guard.disarm();
        Ok(artifact)
    }
}

/// The engine prints the expanded output filename as its last line; earlier
/// lines can be playlist notices or other stray output even under --quiet.
fn predicted_path(stdout: &str) -> Option<&str> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .next_back()
}

struct CleanupGuard<'a> {
    store: &'a ArtifactStore,
    key: &'a RequestKey,
    armed: bool,
}

impl<'a> CleanupGuard<'a> {
    fn new(store: &'a ArtifactStore, key: &'a RequestKey) -> Self {
        Self {
            store,
            key,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for CleanupGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let removed = self.store.remove_keyed(self.key);
        if removed > 0 {
            debug!(key = %self.key, removed, "removed leftovers of failed fetch");
        }
    }
}
