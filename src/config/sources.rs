use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "TUBEFETCH_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/tubefetch.toml";
const ENV_PREFIX: &str = "TUBEFETCH";
const ENV_SEPARATOR: &str = "__";

/// Dedicated variables for the source-platform credential file. Cookies
/// grant account access and are never stored in TOML, only in the
/// environment.
const COOKIES_ENV_VAR: &str = "TUBEFETCH_COOKIES_FILE";
const ENGINE_COOKIES_ENV_VAR: &str = "YTDLP_COOKIES";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
/// 5. Dedicated credential variables (cookies file)
pub fn load() -> Result<Config, ConfigError> {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = load_from_sources(config_path)?;

    load_credentials(&mut config);

    Ok(config)
}

/// Pulls the cookies file path from its dedicated environment variables.
/// `TUBEFETCH_COOKIES_FILE` wins; the engine's conventional `YTDLP_COOKIES`
/// is honored when nothing else set one.
fn load_credentials(config: &mut Config) {
    if let Ok(path) = env::var(COOKIES_ENV_VAR) {
        config.engine.cookies_file = Some(PathBuf::from(path));
    }

    if config.engine.cookies_file.is_none() {
        if let Ok(path) = env::var(ENGINE_COOKIES_ENV_VAR) {
            config.engine.cookies_file = Some(PathBuf::from(path));
        }
    }
}

/// Load configuration from a specific path and environment
/// Useful for testing with custom config files
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    // Start with defaults (handled by struct Default implementations)
    // Add TOML file if it exists (optional)
    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // Add environment variable overrides
    // TUBEFETCH__SERVER__BIND_ADDR -> server.bind_addr
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.engine.binary, "yt-dlp");
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[server]
bind_addr = "127.0.0.1:9000"

[engine]
binary = "/opt/yt-dlp/yt-dlp"
cookies_file = "secrets/cookies.txt"
fetch_timeout_secs = 120

[api]
max_direct_bytes = "10MB"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.engine.binary, "/opt/yt-dlp/yt-dlp");
        assert_eq!(
            config.engine.cookies_file,
            Some(PathBuf::from("secrets/cookies.txt"))
        );
        assert_eq!(config.engine.fetch_timeout_secs, 120);
        assert_eq!(config.api.max_direct_bytes.as_u64(), 10 * 1024 * 1024);
    }

    // Note: env override and credential-variable tests are omitted due to
    // unsafe env::set_var usage; the prefix/separator wiring matches the
    // documented TUBEFETCH__ scheme.

    #[test]
    fn test_credentials_keep_configured_value_without_env() {
        let mut config = Config::default();
        config.engine.cookies_file = Some(PathBuf::from("from-toml.txt"));

        // Neither credential variable is set in the test environment, so
        // the configured value must survive untouched.
        load_credentials(&mut config);
        assert_eq!(
            config.engine.cookies_file,
            Some(PathBuf::from("from-toml.txt"))
        );
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[storage]
root = "/var/lib/tubefetch/media"

[retention]
enabled = true
max_age_secs = 7200
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(
            config.storage.root,
            PathBuf::from("/var/lib/tubefetch/media")
        );
        assert!(config.retention.enabled);
        assert_eq!(config.retention.max_age_secs, 7200);
        // Untouched sections fall back to defaults
        assert_eq!(config.retention.sweep_interval_secs, 3600);
        assert_eq!(config.engine.title_template, "%(title)s");
        assert_eq!(config.api.max_direct_bytes.as_u64(), 50 * 1024 * 1024);
    }
}
