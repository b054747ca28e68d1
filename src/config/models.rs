use crate::humanize::ByteSize;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level service configuration, one field per TOML section
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub api: ApiLimits,
    #[serde(default)]
    pub retention: RetentionConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().unwrap()
}

/// Artifact storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory finished downloads land in. Created at startup if absent.
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("downloads")
}

/// External retrieval engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Engine executable; resolved via PATH unless absolute.
    #[serde(default = "default_engine_binary")]
    pub binary: String,
    /// Cookies file forwarded to the engine for age/region-gated sources.
    /// Only passed when set, so a missing file cannot break every request.
    pub cookies_file: Option<PathBuf>,
    /// Output filename template, engine placeholder syntax. The request key
    /// and extension are appended outside of it.
    #[serde(default = "default_title_template")]
    pub title_template: String,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl EngineConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: default_engine_binary(),
            cookies_file: None,
            title_template: default_title_template(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

fn default_engine_binary() -> String {
    "yt-dlp".to_string()
}

fn default_title_template() -> String {
    "%(title)s".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    600
}

/// API request limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiLimits {
    /// Largest artifact the direct (inline download) routes will serve.
    /// The programmatic routes are not limited.
    #[serde(default = "default_max_direct_bytes")]
    pub max_direct_bytes: ByteSize,
}

impl Default for ApiLimits {
    fn default() -> Self {
        Self {
            max_direct_bytes: default_max_direct_bytes(),
        }
    }
}

fn default_max_direct_bytes() -> ByteSize {
    ByteSize(50 * 1024 * 1024) // 50 MB
}

/// Age-based artifact retention. Disabled by default: artifacts normally
/// live until shutdown purges them.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetentionConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl RetentionConfig {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_age_secs: default_max_age_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_max_age_secs() -> u64 {
    86_400 // one day
}

fn default_sweep_interval_secs() -> u64 {
    3_600
}
