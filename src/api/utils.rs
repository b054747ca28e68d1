//! Stateless helpers shared by the request handlers: inbound payload
//! checks and outbound download-header construction.

use crate::api::error::ApiError;

/// Requires an `application/json` Content-Type; parameters are allowed
/// (`application/json; charset=utf-8`). Structured-syntax relatives such
/// as `application/json-patch+json` do not qualify.
pub fn parse_content_type(content_type: &str) -> Result<mime::Mime, ApiError> {
    let media_type: mime::Mime = content_type
        .parse()
        .map_err(|_| ApiError::InvalidRequest(format!("invalid Content-Type: {content_type}")))?;

    if media_type.essence_str() != mime::APPLICATION_JSON.essence_str() {
        return Err(ApiError::InvalidRequest(format!(
            "Content-Type must be application/json, got: {}",
            media_type.essence_str()
        )));
    }

    Ok(media_type)
}

/// Caps the request body before deserialization.
pub fn validate_body_size(data: &[u8], max_size: usize) -> Result<(), ApiError> {
    if data.len() > max_size {
        return Err(ApiError::InvalidRequest(format!(
            "request body is {} bytes, limit is {} bytes",
            data.len(),
            max_size
        )));
    }
    Ok(())
}

/// Builds an attachment `Content-Disposition` for the client-facing
/// filename: a sanitized plain `filename` for simple clients plus the
/// RFC 5987 `filename*` form that preserves non-ASCII titles.
pub fn content_disposition(display_name: &str) -> String {
    let fallback: String = display_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();
    let encoded = urlencoding::encode(display_name);
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_type_valid() {
        assert!(parse_content_type("application/json").is_ok());
        assert!(parse_content_type("application/json; charset=utf-8").is_ok());
        assert!(parse_content_type("application/json; charset=UTF-8").is_ok());
    }

    #[test]
    fn test_parse_content_type_invalid() {
        assert!(parse_content_type("application/jsonp").is_err());
        assert!(parse_content_type("application/json-patch+json").is_err());
        assert!(parse_content_type("text/json").is_err());
        assert!(parse_content_type("text/plain").is_err());
        assert!(parse_content_type("invalid").is_err());
        assert!(parse_content_type("").is_err());
    }

    #[test]
    fn test_validate_body_size_ok() {
        let data = vec![0u8; 1000];
        assert!(validate_body_size(&data, 1000).is_ok());
        assert!(validate_body_size(&data, 2000).is_ok());
        assert!(validate_body_size(&[], 100).is_ok());
    }

    #[test]
    fn test_validate_body_size_too_large() {
        let data = vec![0u8; 1000];
        let result = validate_body_size(&data, 999);
        match result {
            Err(ApiError::InvalidRequest(message)) => {
                assert!(message.contains("1000 bytes"));
            }
            _ => panic!("Expected InvalidRequest error"),
        }
    }

    #[test]
    fn test_content_disposition_ascii() {
        let header = content_disposition("My Track.mp3");
        assert_eq!(
            header,
            "attachment; filename=\"My Track.mp3\"; filename*=UTF-8''My%20Track.mp3"
        );
    }

    #[test]
    fn test_content_disposition_sanitizes_fallback() {
        let header = content_disposition("Träck \"live\".mp3");
        assert!(header.contains("filename=\"Tr_ck _live_.mp3\""));
        assert!(header.contains("filename*=UTF-8''Tr%C3%A4ck%20%22live%22.mp3"));
    }
}
