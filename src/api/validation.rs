use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum RequestValidationError {
    #[error("url must not be empty")]
    EmptyUrl,
    #[error("url is not parseable: {0}")]
    MalformedUrl(String),
    #[error("url scheme '{0}' is not supported, expected http or https")]
    UnsupportedScheme(String),
}

/// Checks the source URL before any engine invocation: present, parseable,
/// and an http(s) scheme. Returns the trimmed URL actually handed to the
/// engine. Whether the source behind it exists is the engine's call.
pub fn validate_source_url(raw: &str) -> Result<&str, RequestValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RequestValidationError::EmptyUrl);
    }

    let parsed = Url::parse(trimmed)
        .map_err(|err| RequestValidationError::MalformedUrl(err.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(trimmed),
        other => Err(RequestValidationError::UnsupportedScheme(other.to_string())),
    }
}
