//! Error types for the objects API client.
//!
//! # Design
//! Every non-success status lands in `RequestFailed` with the status code, the
//! advertised `Allow` header and the raw body. Not-found is not a separate
//! variant: callers that expect a 404 either use `is_not_found` or fetch the
//! raw response instead. `DecodeFailed` is kept apart from `RequestFailed`
//! because it means client and server disagree on the schema.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The server answered with a status other than the one required.
    #[error("request failed with HTTP {status}: {body}")]
    RequestFailed {
        status: u16,
        allow: Option<String>,
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    DecodeFailed(String),

    /// The request payload could not be serialized to JSON.
    #[error("failed to encode request: {0}")]
    EncodeFailed(String),

    /// No response arrived within the configured bound.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Connection-level failure before any status was received.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
