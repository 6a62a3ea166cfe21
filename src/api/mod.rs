//! Typed client for the remote workout backend.
//!
//! One submodule per backend area (auth, exercise catalog, workouts). Every
//! call is an explicit blocking function returning a `Result`; there are no
//! automatic retries, and a failed request surfaces exactly once to the
//! caller. Error bodies of the form `{"error": "..."}` are surfaced verbatim,
//! with a per-call generic fallback when the field is absent.

pub mod auth;
pub mod exercises;
pub mod workouts;

use serde::Deserialize;

use crate::http_client;

pub(crate) const MAX_RESPONSE_BYTES: usize = 256 * 1024;

/// Errors surfaced by remote calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server reported a failure; the message is its `error` string.
    #[error("{0}")]
    Api(String),
    /// The request could not complete.
    #[error("HTTP error: {0}")]
    Transport(String),
    /// The request completed but the body was not what the contract promises.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// The configured base URL does not parse.
    #[error("Invalid base URL {url}: {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
}

/// Where the backend lives. Cheap to clone and pass by reference to calls.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    /// Validate and normalize a base URL (trailing slashes are stripped).
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let parsed = url::Url::parse(base_url).map_err(|source| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        let mut base = parsed.to_string();
        while base.ends_with('/') {
            base.pop();
        }
        Ok(Self { base_url: base })
    }

    /// Build a config from the persisted settings.
    pub fn from_settings(settings: &crate::settings::AppSettings) -> Result<Self, ApiError> {
        Self::new(&settings.api_base_url)
    }

    /// Full URL for an endpoint path such as `/auth/signin`.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Probe whether the backend is reachable.
///
/// A lightweight HEAD request against the base URL; only a success response
/// counts.
pub fn check_network(config: &ApiConfig) -> bool {
    match http_client::agent().head(&config.base_url).call() {
        Ok(_) => true,
        Err(err) => {
            tracing::debug!("Network status check failed: {err}");
            false
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Map a non-success response to an `ApiError`, surfacing the server's
/// `error` string verbatim when present.
pub(crate) fn status_error(code: u16, response: ureq::Response, fallback: &str) -> ApiError {
    let body = read_body_limited(response).unwrap_or_default();
    let message = parse_error_message(&body).unwrap_or_else(|| fallback.to_string());
    tracing::debug!("API request failed with HTTP {code}: {message}");
    ApiError::Api(message)
}

/// Map a transport-level failure.
pub(crate) fn transport_error(err: &ureq::Transport) -> ApiError {
    ApiError::Transport(err.to_string())
}

/// Read and deserialize a success body, enforcing the response size cap.
pub(crate) fn read_json<T: for<'de> Deserialize<'de>>(
    response: ureq::Response,
) -> Result<T, ApiError> {
    let body = read_body_limited(response).map_err(ApiError::InvalidResponse)?;
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidResponse("Empty response body".to_string()));
    }
    serde_json::from_str(trimmed).map_err(|err| ApiError::InvalidResponse(err.to_string()))
}

fn parse_error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    serde_json::from_str::<ErrorBody>(trimmed)
        .ok()
        .and_then(|parsed| parsed.error)
        .filter(|message| !message.is_empty())
}

fn read_body_limited(response: ureq::Response) -> Result<String, String> {
    let bytes = http_client::read_response_bytes(response, MAX_RESPONSE_BYTES)
        .map_err(|err| err.to_string())?;
    String::from_utf8(bytes).map_err(|err| err.to_string())
}
