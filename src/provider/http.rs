//! HTTP client construction and status mapping.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};

use crate::error::{ExamusError, Result};

/// Connect timeout for the local endpoint. There is no overall timeout: a
/// reply streams for as long as the model keeps generating.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the client used for streaming requests.
pub fn build_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_max_idle_per_host(2)
        .build()?;
    Ok(client)
}

/// Headers for a JSON request expecting an NDJSON reply.
pub fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/x-ndjson"));
    headers
}

/// Map a non-success status and its body to an error.
pub fn status_to_error(status: u16, body: &str) -> ExamusError {
    let message = extract_error_message(body).unwrap_or_else(|| body.trim().to_string());
    ExamusError::api(status, message)
}

/// Ollama reports failures as `{"error": "..."}`.
fn extract_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
}
