//! API models for TubeFetch retrieval endpoints.
//!
//! This module defines the data structures of the external API contract:
//! - POST retrieval routes accept a [`MediaRequest`] JSON payload
//! - GET (direct) retrieval routes take the same URL as a query parameter,
//!   modeled by [`MediaQuery`]
//! - Failures are serialized as [`ErrorResponse`]
//!
//! A request payload is a single-field JSON object:
//!
//! ```json
//! {
//!   "url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
//! }
//! ```
//!
//! Successful responses carry no JSON at all: the artifact itself is
//! streamed back with its media type and a `Content-Disposition` filename
//! derived from the stored file, never from the request URL.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Body of the POST retrieval endpoints.
#[derive(Debug, Deserialize, Clone)]
pub struct MediaRequest {
    pub url: String,
}

/// Query parameters of the GET (direct) retrieval endpoints. The URL
/// defaults to empty so a missing parameter surfaces as a validation
/// failure instead of a framework rejection.
#[derive(Debug, Deserialize, Clone)]
pub struct MediaQuery {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub components: HashMap<String, String>,
    pub version: String,
}
