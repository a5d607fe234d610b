//! API utilities for talking to the dashboard backend
//!
//! Provides the base-URL resolution and a shared GET-JSON helper that turns
//! non-2xx responses into structured [`ApiError`]s.

use serde::de::DeserializeOwned;

use crate::shared::api_error::ApiError;

/// Production backend origin, used when no override is provided at build time.
///
/// The UI is usually hosted on a different domain than the API, so requests
/// must not default to our own origin.
const DEFAULT_BASE: &str = "https://mad-podolsk-karinausadba.amvera.io";

/// Get the base URL for API requests
///
/// Reads the `DASHBOARD_API_BASE` environment variable at build time (useful
/// for local development against a dev backend) and falls back to the
/// production origin.
pub fn api_base() -> &'static str {
    match option_env!("DASHBOARD_API_BASE") {
        Some(base) if !base.is_empty() => base,
        _ => DEFAULT_BASE,
    }
}

/// Build a full API URL from a path
///
/// # Example
/// ```rust
/// # use frontend::shared::api_utils::api_url;
/// let url = api_url("/api/dashboard/months");
/// ```
pub fn api_url(path: &str) -> String {
    if path.starts_with("http") {
        return path.to_string();
    }
    format!("{}{}", api_base(), path)
}

/// Issue a GET request and decode the JSON body.
///
/// Error contract:
/// - transport failure -> [`ApiError::Network`]
/// - non-2xx -> [`ApiError::Http`] with the body text as the message when
///   present, otherwise `"<status> <status text>"`
/// - undecodable body -> [`ApiError::Decode`]
pub async fn request_json<T: DeserializeOwned>(path: &str) -> Result<T, ApiError> {
    let url = api_url(path);

    let response = gloo_net::http::Request::get(&url)
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    if !response.ok() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            format!("{} {}", status, response.status_text())
        } else {
            body
        };
        return Err(ApiError::Http { status, message });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_keeps_absolute_urls() {
        assert_eq!(api_url("http://localhost:8000/x"), "http://localhost:8000/x");
    }

    #[test]
    fn api_url_prefixes_relative_paths() {
        let url = api_url("/api/dashboard/months");
        assert!(url.ends_with("/api/dashboard/months"));
        assert!(url.starts_with("http"));
    }
}
