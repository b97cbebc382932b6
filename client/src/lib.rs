pub mod client;

pub use client::{ApiRoutes, Client, DEFAULT_TIMEOUT};
use thiserror::Error;

/// Error type for client operations.
///
/// Only URL construction errors reach callers directly; everything that can
/// go wrong during a call is normalized into
/// [`aboor_types::VerificationResult::TransportError`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("failed: {0}")]
    Failed(reqwest::StatusCode),
    #[error("unexpected response body: {0}")]
    UnexpectedBody(serde_json::Error),
    #[error("unexpected response")]
    UnexpectedResponse,
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid URL scheme: {0} (expected http or https)")]
    InvalidScheme(String),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
