// src/http.rs
// Shared HTTP client for all network operations

use serde::Deserialize;
use std::time::Duration;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connect timeout
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Create the shared HTTP client with appropriate defaults.
///
/// This client should be created once at startup and passed to all
/// modules that need HTTP access. Uses connection pooling internally.
pub fn create_shared_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Error body shape shared by the review backend and the catalog API
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Extract the backend's `error` message from a non-OK response.
///
/// Falls back to the given message when the body is not JSON or the
/// `error` field is empty.
pub(crate) async fn backend_error(response: reqwest::Response, fallback: impl Into<String>) -> String {
    let fallback = fallback.into();
    match response.json::<ErrorBody>().await {
        Ok(body) if !body.error.is_empty() => body.error,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_shared_client() {
        let client = create_shared_client();
        drop(client);
    }

    #[test]
    fn test_timeout_values() {
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(30));
        assert_eq!(CONNECT_TIMEOUT, Duration::from_secs(10));
    }

    #[test]
    fn test_error_body_parse() {
        let body: ErrorBody = serde_json::from_str(r#"{"error":"Ogiltig token"}"#).unwrap();
        assert_eq!(body.error, "Ogiltig token");
    }
}
