//! Error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the crate
///
/// Covers both sides of the wire: failures raised by a reporter while serving
/// a probe, and failures observed by [`Client`](crate::client::Client) while
/// querying a remote instance. Large variants are boxed to reduce stack size.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Metrics provider failure, displayed verbatim
    #[error("{0}")]
    Metrics(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// The execution context was cancelled
    #[error("context cancelled")]
    Cancelled,

    /// The execution context deadline passed
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// Client base URL did not parse
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(#[source] url::ParseError),

    /// Building the request failed
    #[error("creating request: {0}")]
    Request(#[source] Box<reqwest::Error>),

    /// Connection or protocol failure while executing the request
    #[error("executing request: {0}")]
    Transport(#[source] Box<reqwest::Error>),

    /// The response body could not be read
    #[error("reading response body: {0}")]
    ReadBody(#[source] Box<reqwest::Error>),

    /// The server answered with a status code outside the accepted set
    #[error("unexpected status code {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code returned by the server
        status: u16,
        /// Raw response body text
        body: String,
    },

    /// The response body was not valid JSON for the expected type
    #[error("decoding response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl Error {
    /// Create a metrics provider error carrying `message` verbatim
    pub fn metrics(message: impl Into<String>) -> Self {
        Error::Metrics(message.into())
    }

    /// Whether the error came from context cancellation or an expired deadline
    pub fn is_context(&self) -> bool {
        matches!(self, Error::Cancelled | Error::DeadlineExceeded)
    }

    /// Status code of an [`Error::UnexpectedStatus`], if that is what this is
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Cancelled | Error::DeadlineExceeded => {
                tracing::warn!("Probe aborted: {}", self);
            }
            _ => {
                tracing::error!("Probe failed: {}", self);
            }
        }

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(self.to_string())),
        )
            .into_response()
    }
}

// Manual From implementations for boxed errors
impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}
