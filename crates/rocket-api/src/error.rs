//! HTTP client error types.

use rocket_cart::LookupError;
use thiserror::Error;

/// Errors that can occur when calling the catalog API.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Failed to build the HTTP client.
    #[error("Client error: {0}")]
    ClientError(String),

    /// Failed to send the request or read the response.
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP error response.
    #[error("HTTP {status} for {url}")]
    HttpError { status: u16, url: String },

    /// Failed to parse response body.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Request timeout.
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_builder() {
            FetchError::InvalidUrl(e.to_string())
        } else {
            FetchError::RequestError(e.to_string())
        }
    }
}

impl From<FetchError> for LookupError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::HttpError { status: 404, url } => LookupError::NotFound(url),
            FetchError::HttpError { status, url } => LookupError::Status { status, url },
            FetchError::ParseError(msg) => LookupError::Decode(msg),
            other => LookupError::Transport(other.to_string()),
        }
    }
}
