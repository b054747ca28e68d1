use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("storage.root must not be empty")]
    EmptyStorageRoot,

    #[error("engine.binary must not be empty")]
    EmptyEngineBinary,

    #[error("engine.title_template is invalid: {reason}")]
    InvalidTitleTemplate { reason: String },

    #[error("engine.fetch_timeout_secs must be positive")]
    ZeroFetchTimeout,

    #[error("api.max_direct_bytes must be positive")]
    ZeroDirectLimit,

    #[error("retention is enabled but {field} is zero")]
    ZeroRetentionPeriod { field: &'static str },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_storage(config)?;
    validate_engine(config)?;
    validate_api(config)?;
    validate_retention(config)?;
    Ok(())
}

fn validate_storage(config: &Config) -> Result<(), ValidationError> {
    if config.storage.root.as_os_str().is_empty() {
        return Err(ValidationError::EmptyStorageRoot);
    }
    Ok(())
}

/// The title template becomes one path segment of the output template, with
/// the request key and `%(ext)s` appended around it. Separators would move
/// artifacts out of the storage root, and an embedded extension placeholder
/// would break the post-processing extension rewrite.
fn validate_engine(config: &Config) -> Result<(), ValidationError> {
    if config.engine.binary.trim().is_empty() {
        return Err(ValidationError::EmptyEngineBinary);
    }

    let template = &config.engine.title_template;
    if template.is_empty() {
        return Err(ValidationError::InvalidTitleTemplate {
            reason: "must not be empty".to_string(),
        });
    }
    if template.contains('/') || template.contains('\\') {
        return Err(ValidationError::InvalidTitleTemplate {
            reason: "must not contain path separators".to_string(),
        });
    }
    if template.contains("%(ext)s") {
        return Err(ValidationError::InvalidTitleTemplate {
            reason: "extension placeholder is appended automatically".to_string(),
        });
    }
    if !template.contains("%(") {
        return Err(ValidationError::InvalidTitleTemplate {
            reason: "must contain at least one engine placeholder".to_string(),
        });
    }

    if config.engine.fetch_timeout_secs == 0 {
        return Err(ValidationError::ZeroFetchTimeout);
    }

    Ok(())
}

fn validate_api(config: &Config) -> Result<(), ValidationError> {
    if config.api.max_direct_bytes.as_u64() == 0 {
        return Err(ValidationError::ZeroDirectLimit);
    }
    Ok(())
}

fn validate_retention(config: &Config) -> Result<(), ValidationError> {
    if !config.retention.enabled {
        return Ok(());
    }
    if config.retention.max_age_secs == 0 {
        return Err(ValidationError::ZeroRetentionPeriod {
            field: "max_age_secs",
        });
    }
    if config.retention.sweep_interval_secs == 0 {
        return Err(ValidationError::ZeroRetentionPeriod {
            field: "sweep_interval_secs",
        });
    }
    Ok(())
}
