//! Layered configuration for the TubeFetch service.
//!
//! Settings come from struct defaults, then an optional TOML file
//! (`config/tubefetch.toml`, or the path in `TUBEFETCH_CONFIG`), then
//! `TUBEFETCH__<section>__<key>` environment variables, which win:
//!
//! - `TUBEFETCH__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `TUBEFETCH__ENGINE__BINARY=/opt/yt-dlp/yt-dlp`
//! - `TUBEFETCH__API__MAX_DIRECT_BYTES=100MB`
//!
//! The cookies file used for gated sources is credential material and has
//! its own variable, `TUBEFETCH_COOKIES_FILE`, with the engine-conventional
//! `YTDLP_COOKIES` honored as a fallback. Credentials belong in the
//! environment, not in TOML files.
//!
//! ```no_run
//! use tubefetch::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Server listening on: {}", config.server.bind_addr);
//! println!("Artifacts stored in: {}", config.storage.root.display());
//! ```
//!
//! Every load runs a validation pass; a config that parses but cannot work
//! (empty storage root, zero byte cap, broken title template) is rejected
//! up front instead of failing on the first request.

mod models;
mod sources;
mod validation;

// Re-export public types
pub use crate::humanize::ByteSize;
pub use models::{ApiLimits, Config, EngineConfig, RetentionConfig, ServerConfig, StorageConfig};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`TUBEFETCH__*`)
    /// 2. TOML file (default: `config/tubefetch.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or validation
    /// rejects a value.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
